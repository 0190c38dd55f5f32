//! FAT directory entry structure and parsing.
//!
//! Each directory entry is 32 bytes. It describes a file, a directory, a volume label or
//! holds a fragment of a long file name. Fields are extracted from the raw record at fixed
//! offsets, little-endian.

use getset::Getters;
use std::fmt;

use crate::constants::{
    ATTR_DIRECTORY, ATTR_LONG_NAME, ATTR_VOLUME_ID, DELETED_MARKER, DIR_ENTRY_SIZE, UNUSED_MARKER,
};
use crate::utils::{u16_at, u32_at};

const NAME_LEN: usize = 11;
const ATTR_OFF: usize = 11;
const FST_CLUS_HI_OFF: usize = 20;
const FST_CLUS_LO_OFF: usize = 26;
const FILE_SIZE_OFF: usize = 28;

/// Byte ranges of a long name fragment holding UTF-16LE code units: 5, 6 and 2 units.
const LFN_RANGES: [(usize, usize); 3] = [(1, 11), (14, 26), (28, 32)];
/// Number of UTF-16 code units stored in one long name fragment.
pub const LFN_UNITS: usize = 13;

/// A raw 32-byte FAT directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct DirEntry {
    /// The record as found on disk
    #[get = "pub"]
    raw: [u8; DIR_ENTRY_SIZE],
}

impl DirEntry {
    /// Wraps a 32-byte record.
    pub fn from_bytes(raw: [u8; DIR_ENTRY_SIZE]) -> Self {
        Self { raw }
    }

    /// Builds an entry from the first 32 bytes of `buf`.
    ///
    /// # Panics
    /// - Panics if `buf` is shorter than 32 bytes
    pub fn from_slice(buf: &[u8]) -> Self {
        let mut raw = [0; DIR_ENTRY_SIZE];
        raw.copy_from_slice(&buf[..DIR_ENTRY_SIZE]);
        Self { raw }
    }

    /// The 11-byte name field (8 characters name + 3 characters extension).
    pub fn name(&self) -> &[u8] {
        &self.raw[..NAME_LEN]
    }

    /// The attribute byte.
    pub fn attr(&self) -> u8 {
        self.raw[ATTR_OFF]
    }

    /// Returns the complete first cluster number: `(fst_clus_hi << 16) | fst_clus_lo`.
    pub fn first_cluster(&self) -> u32 {
        ((u16_at(&self.raw, FST_CLUS_HI_OFF) as u32) << 16)
            | u16_at(&self.raw, FST_CLUS_LO_OFF) as u32
    }

    /// Size of the file in bytes (0 for directories).
    pub fn file_size(&self) -> u32 {
        u32_at(&self.raw, FILE_SIZE_OFF)
    }

    pub fn is_unused(&self) -> bool {
        self.raw[0] == UNUSED_MARKER
    }

    pub fn is_deleted(&self) -> bool {
        self.raw[0] == DELETED_MARKER
    }

    pub fn is_long_name(&self) -> bool {
        self.attr() == ATTR_LONG_NAME
    }

    pub fn is_dir(&self) -> bool {
        self.attr() & ATTR_DIRECTORY != 0
    }

    pub fn is_volume_label(&self) -> bool {
        self.attr() & ATTR_VOLUME_ID != 0
    }

    /// A regular file: neither a directory nor a volume label.
    pub fn is_file(&self) -> bool {
        !self.is_dir() && !self.is_volume_label()
    }

    /// Checks whether this is the `.` or `..` entry of a subdirectory.
    pub fn is_dot_entry(&self) -> bool {
        let name = self.name();
        name[0] == b'.' && (name[1] == b' ' || (name[1] == b'.' && name[2] == b' '))
    }

    /// The 13 UTF-16 code units stored in a long name fragment, in order.
    pub fn lfn_units(&self) -> [u16; LFN_UNITS] {
        let mut units = [0; LFN_UNITS];
        let offsets = LFN_RANGES
            .iter()
            .flat_map(|&(start, end)| (start..end).step_by(2));

        for (unit, off) in units.iter_mut().zip(offsets) {
            *unit = u16_at(&self.raw, off);
        }
        units
    }

    /// Builds the 8.3 short name.
    ///
    /// A deleted marker in the first byte becomes `_`. Non printable bytes are dropped and
    /// the base name stops at the first space.
    pub fn short_name(&self) -> String {
        let name = self.name();
        let mut short_name = String::new();

        if self.is_deleted() {
            short_name.push('_');
        } else {
            short_name.push(name[0] as char);
        }

        for &byte in name[1..8].iter().take_while(|&&byte| byte != b' ') {
            if is_printable(byte) {
                short_name.push(byte as char);
            }
        }

        let ext = &name[8..11];
        if ext.iter().any(|&byte| byte != b' ') {
            short_name.push('.');
            for &byte in ext.iter().filter(|&&byte| byte != b' ') {
                if is_printable(byte) {
                    short_name.push(byte as char);
                }
            }
        }

        short_name
    }
}

fn is_printable(byte: u8) -> bool {
    (0x20..0x7F).contains(&byte)
}

impl fmt::Display for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}B", self.short_name(), self.file_size())
    }
}
