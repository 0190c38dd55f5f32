//! Grouping of directory entries into logical entries.
//!
//! A logical entry is made of zero or more long name fragments followed by one main record
//! describing a file or a directory. [`ChainAssembler`] accumulates fragments while records
//! are scanned and emits an [`EntryChain`] each time a main record closes the group.

use std::fmt;

use super::dir_entry::DirEntry;
use super::fat_error::FATError;

/// Long name fragments followed by their main record.
///
/// Only the last element may be something else than a long name fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChain {
    entries: Vec<DirEntry>,
}

impl EntryChain {
    /// Builds a chain from entries assembled by hand.
    ///
    /// Returns `None` if `entries` is empty or if an element other than the last is not a
    /// long name fragment.
    pub fn from_entries(entries: Vec<DirEntry>) -> Option<Self> {
        let (_, fragments) = entries.split_last()?;
        if fragments.iter().all(DirEntry::is_long_name) {
            Some(Self { entries })
        } else {
            None
        }
    }

    /// The main record closing the chain.
    pub fn main_entry(&self) -> &DirEntry {
        // A chain always holds at least its main record.
        &self.entries[self.entries.len() - 1]
    }

    /// The long name fragments, in on-disk order.
    pub fn fragments(&self) -> &[DirEntry] {
        &self.entries[..self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn is_deleted(&self) -> bool {
        self.main_entry().is_deleted()
    }

    pub fn is_dir(&self) -> bool {
        self.main_entry().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.main_entry().is_file()
    }

    /// Decodes the logical name of the entry.
    ///
    /// With long name fragments, the fragment closest to the main record holds the first
    /// characters of the name. Code units 1 to 127 are kept as ASCII, other non-padding units
    /// become `?`. Without fragments, the 8.3 short name is used.
    pub fn name(&self) -> String {
        let fragments = self.fragments();
        if fragments.is_empty() {
            return self.main_entry().short_name();
        }

        let mut name = String::new();
        for fragment in fragments.iter().rev() {
            for unit in fragment.lfn_units() {
                match unit {
                    0x0000 => break,
                    1..=127 => name.push(unit as u8 as char),
                    0xFFFF => {}
                    _ => name.push('?'),
                }
            }
        }
        name
    }
}

impl fmt::Display for EntryChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir() { "directory" } else { "file" };
        write!(f, "{} ({kind})", self.name())
    }
}

/// Accumulator of long name fragments pending a main record.
#[derive(Debug, Default)]
pub struct ChainAssembler {
    pending: Vec<DirEntry>,
}

impl ChainAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next scanned record.
    ///
    /// - A long name fragment is buffered, whatever its first byte.
    /// - An unused slot drops the buffered fragments.
    /// - A directory or a regular file closes the chain, which is returned.
    /// - Anything else (volume label) drops the buffered fragments.
    pub fn push(&mut self, entry: DirEntry) -> Option<EntryChain> {
        if entry.is_long_name() {
            self.pending.push(entry);
            None
        } else if entry.is_unused() {
            self.pending.clear();
            None
        } else if entry.is_dir() || entry.is_file() {
            let mut entries = std::mem::take(&mut self.pending);
            entries.push(entry);
            Some(EntryChain { entries })
        } else {
            self.pending.clear();
            None
        }
    }

    /// Number of buffered fragments.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Iterator adapter turning scanned records into entry chains.
pub struct EntryChains<I> {
    records: I,
    assembler: ChainAssembler,
}

impl<I> EntryChains<I>
where
    I: Iterator<Item = Result<DirEntry, FATError>>,
{
    pub fn new(records: I) -> Self {
        Self {
            records,
            assembler: ChainAssembler::new(),
        }
    }
}

impl<I> Iterator for EntryChains<I>
where
    I: Iterator<Item = Result<DirEntry, FATError>>,
{
    type Item = Result<EntryChain, FATError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.records.next()? {
                Ok(entry) => {
                    if let Some(chain) = self.assembler.push(entry) {
                        return Some(Ok(chain));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
