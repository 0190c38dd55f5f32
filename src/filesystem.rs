//! Read-only access to FAT32 volumes.
//!
//! The boot sector and the FAT are decoded once when the volume is opened. Directories are
//! then scanned record by record along their cluster chains and grouped into entry chains.

pub mod boot_sector;
pub mod dir_entry;
pub mod entry_chain;
pub mod fat_error;
pub mod fat_table;
pub mod volume;
