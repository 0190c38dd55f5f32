//!
//! fat_undelete: A library and CLI for recovering deleted entries of FAT32 volumes.
//!
//! This crate provides tools for:
//! - Decoding the boot sector and the File Allocation Table of a FAT32 volume
//! - Walking cluster chains safely over corrupted tables
//! - Listing the deleted entries of the root directory with their long names
//! - Recovering deleted files and directory subtrees to a destination directory
//!
//! Nothing is ever written to the scanned volume.
//!
//! # Re-exports
//! - [`Volume`]: FAT32 volume opened for reading
//! - [`DeletedEntryCatalog`]: Deleted entries of the root directory
//! - [`RecoveryEngine`]: Recovery of cataloged entries

pub mod commands;
pub mod constants;
pub mod filesystem;
pub mod recovery;
pub mod traits;
pub mod utils;

#[cfg(test)]
mod test_image;

/// FAT32 volume (see [`filesystem::volume::Volume`]).
pub use crate::filesystem::volume::Volume;
/// Error type of the crate (see [`filesystem::fat_error::FATError`]).
pub use crate::filesystem::fat_error::FATError;
/// Deleted entries of the root directory (see [`recovery::catalog::DeletedEntryCatalog`]).
pub use crate::recovery::catalog::DeletedEntryCatalog;
/// Recovery of deleted entries (see [`recovery::engine::RecoveryEngine`]).
pub use crate::recovery::engine::RecoveryEngine;
