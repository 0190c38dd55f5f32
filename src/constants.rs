//! On-disk constants of the FAT32 layout.

/// The size of a directory entry in bytes.
pub const DIR_ENTRY_SIZE: usize = 32;

/// The filesystem type label expected in a FAT32 boot sector.
pub const FAT32_SIGNATURE: &[u8; 8] = b"FAT32   ";

/// First byte of the name of a deleted directory entry.
pub const DELETED_MARKER: u8 = 0xE5;
/// First byte of the name of an unused directory slot.
pub const UNUSED_MARKER: u8 = 0x00;

/// Attribute bit for a volume label.
pub const ATTR_VOLUME_ID: u8 = 0x08;
/// Attribute bit for a directory.
pub const ATTR_DIRECTORY: u8 = 0x10;
/// Attribute value for a long file name fragment.
pub const ATTR_LONG_NAME: u8 = 0x0F;

/// Only the low 28 bits of a FAT32 entry are meaningful.
pub const FAT32_ENTRY_MASK: u32 = 0x0FFF_FFFF;
/// FAT value marking a bad cluster.
pub const BAD_CLUSTER: u32 = 0x0FFF_FFF7;
/// Lowest FAT value of the end-of-chain range.
pub const END_OF_CHAIN: u32 = 0x0FFF_FFF8;
/// First cluster number of the data region.
pub const FIRST_DATA_CLUSTER: u32 = 2;
