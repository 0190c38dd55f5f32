//! File Allocation Table and cluster chain traversal.
//!
//! The FAT is loaded once, fully, into memory. Cluster chains are walked lazily over it by
//! [`ClusterChain`], which never indexes outside the table and gives up with
//! [`FATError::CorruptChain`] once it visited more clusters than the volume can hold.

use log::debug;
use std::io::{self, Read, Seek, SeekFrom};

use super::boot_sector::BootSector;
use super::fat_error::FATError;
use crate::constants::{BAD_CLUSTER, END_OF_CHAIN, FAT32_ENTRY_MASK, FIRST_DATA_CLUSTER};
use crate::utils::{read_at, u32_at};

/// Classification of a masked FAT value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterKind {
    /// 0 or 1: a free entry or one of the reserved entries, nothing follows.
    Free,
    /// `0x0FFFFFF8` to `0x0FFFFFFF`.
    EndOfChain,
    /// `0x0FFFFFF7`.
    Bad,
    /// A cluster holding data.
    Data(u32),
}

impl ClusterKind {
    /// Classifies a raw FAT value. The top 4 bits are discarded.
    pub fn classify(value: u32) -> Self {
        match value & FAT32_ENTRY_MASK {
            v if v < FIRST_DATA_CLUSTER => ClusterKind::Free,
            BAD_CLUSTER => ClusterKind::Bad,
            v if v >= END_OF_CHAIN => ClusterKind::EndOfChain,
            v => ClusterKind::Data(v),
        }
    }
}

/// In-memory copy of the first FAT of a volume.
#[derive(Debug, Clone)]
pub struct FatTable {
    entries: Vec<u32>,
    cluster_limit: u32,
}

impl FatTable {
    /// Loads the first FAT described by `boot_sector`.
    ///
    /// The size of the FAT is checked against the length of the source before anything is
    /// allocated.
    ///
    /// # Errors
    /// - `FATError::IOError` if the FAT cannot be read entirely
    /// - `FATError::InvalidGeometry` if the FAT does not fit in memory on this target
    pub fn load<T: Read + Seek>(
        reader: &mut T,
        boot_sector: &BootSector,
    ) -> Result<FatTable, FATError> {
        let fat_offset = boot_sector.fat_offset();
        let fat_byte_len = boot_sector.fat_byte_len();

        let source_len = reader.seek(SeekFrom::End(0))?;
        if fat_offset.saturating_add(fat_byte_len) > source_len {
            return Err(FATError::IOError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "FAT of {fat_byte_len} bytes at offset {fat_offset} exceeds the {source_len}-byte source"
                ),
            )));
        }

        let fat_len = usize::try_from(fat_byte_len).map_err(|_| {
            FATError::InvalidGeometry(format!("FAT of {fat_byte_len} bytes is too large"))
        })?;
        let buf = read_at(reader, fat_offset, fat_len)?;

        let entries: Vec<u32> = (0..fat_len / 4).map(|i| u32_at(&buf, i * 4)).collect();
        debug!(
            "Loaded {} FAT entries from offset {fat_offset}",
            entries.len()
        );

        Ok(Self::from_entries(entries, boot_sector.cluster_count()))
    }

    /// Builds a table from raw entries.
    ///
    /// `cluster_limit` bounds the number of clusters any walk over this table may visit.
    pub fn from_entries(entries: Vec<u32>, cluster_limit: u32) -> Self {
        Self {
            entries,
            cluster_limit,
        }
    }

    /// Number of entries, reserved ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of clusters a walk may visit.
    pub fn cluster_limit(&self) -> u32 {
        self.cluster_limit
    }

    /// Returns the masked FAT value of `cluster`, or `None` if the table has no such entry.
    pub fn entry(&self, cluster: u32) -> Option<u32> {
        self.entries
            .get(cluster as usize)
            .map(|value| value & FAT32_ENTRY_MASK)
    }

    /// Walks the cluster chain starting at `start`.
    ///
    /// The returned iterator is lazy and can be cloned to restart from the same point.
    pub fn walk(&self, start: u32) -> ClusterChain<'_> {
        ClusterChain {
            fat: self,
            next: Some(start & FAT32_ENTRY_MASK),
            visited: 0,
        }
    }
}

/// Lazy sequence of the data clusters of a chain.
///
/// Yields `Err(FATError::CorruptChain)` once, then stops, if the chain points outside the
/// table or is longer than the volume.
#[derive(Debug, Clone)]
pub struct ClusterChain<'a> {
    fat: &'a FatTable,
    next: Option<u32>,
    visited: u32,
}

impl ClusterChain<'_> {
    fn fail(&mut self, msg: String) -> Option<Result<u32, FATError>> {
        self.next = None;
        Some(Err(FATError::CorruptChain(msg)))
    }
}

impl Iterator for ClusterChain<'_> {
    type Item = Result<u32, FATError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.next?;
            let kind = ClusterKind::classify(current);

            if matches!(kind, ClusterKind::Free | ClusterKind::EndOfChain) {
                self.next = None;
                return None;
            }

            if self.visited >= self.fat.cluster_limit {
                let limit = self.fat.cluster_limit;
                return self.fail(format!(
                    "more than {limit} clusters visited, the chain loops"
                ));
            }
            self.visited += 1;

            match kind {
                ClusterKind::Data(cluster) => match self.fat.entry(cluster) {
                    Some(next) => {
                        self.next = Some(next);
                        return Some(Ok(cluster));
                    }
                    None => {
                        let len = self.fat.len();
                        return self.fail(format!(
                            "cluster {cluster} lies outside the FAT ({len} entries)"
                        ));
                    }
                },
                _ => {
                    debug!("Skipping bad cluster marker 0x{current:08X}");
                    self.next = self.fat.entry(current);
                }
            }
        }
    }
}
