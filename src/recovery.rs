//! Cataloging and recovery of deleted entries.

pub mod catalog;
pub mod engine;
