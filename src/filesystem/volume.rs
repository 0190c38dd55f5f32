//! FAT32 volume access.
//!
//! This module implements the core functions to read a FAT32 volume:
//! - Opening the source and loading the boot sector and the FAT
//! - Reading clusters of the data region
//! - Scanning the directory entries stored along a cluster chain
//! - Displaying the volume layout

use log::{debug, info};
use std::cell::RefCell;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use super::boot_sector::BootSector;
use super::dir_entry::DirEntry;
use super::entry_chain::EntryChains;
use super::fat_error::FATError;
use super::fat_table::{ClusterChain, FatTable};
use crate::constants::DIR_ENTRY_SIZE;
use crate::traits::LayoutDisplay;
use crate::utils::read_at;

/// A FAT32 volume opened for reading.
///
/// The source stays open for the lifetime of the volume. Reads go through a `RefCell` so
/// that scans and recoveries only need a shared reference.
pub struct Volume<R: Read + Seek> {
    source: RefCell<R>,
    boot_sector: BootSector,
    fat: FatTable,
}

impl Volume<File> {
    /// Opens a block device or disk image.
    ///
    /// # Errors
    /// - `FATError::OpenFailed` if the file cannot be opened
    /// - See [`Volume::from_reader`] for the other errors
    pub fn open(path: &Path) -> Result<Self, FATError> {
        let file = File::open(path).map_err(|source| FATError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Opened {}", path.display());

        Self::from_reader(file)
    }
}

impl<R: Read + Seek> Volume<R> {
    /// Reads the boot sector, checks it describes a FAT32 volume and loads the FAT.
    ///
    /// # Errors
    /// - `FATError::IOError` on a short read of the boot sector or the FAT
    /// - `FATError::InvalidGeometry` if the boot sector geometry is unusable
    /// - `FATError::NotFat32` if the filesystem type label is not `"FAT32   "`
    pub fn from_reader(mut source: R) -> Result<Self, FATError> {
        let boot_sector = BootSector::from_reader(&mut source)?;
        boot_sector.validate_signature()?;
        let fat = FatTable::load(&mut source, &boot_sector)?;

        info!(
            "FAT32 volume: {} bytes per cluster, root directory at cluster {}",
            boot_sector.cluster_size(),
            boot_sector.root_clus()
        );

        Ok(Self {
            source: RefCell::new(source),
            boot_sector,
            fat,
        })
    }

    pub fn boot_sector(&self) -> &BootSector {
        &self.boot_sector
    }

    pub fn fat(&self) -> &FatTable {
        &self.fat
    }

    /// First cluster of the root directory.
    pub fn root_cluster(&self) -> u32 {
        *self.boot_sector.root_clus()
    }

    /// Size of a cluster in bytes.
    pub fn cluster_size(&self) -> usize {
        self.boot_sector.cluster_size() as usize
    }

    /// Byte offset of `cluster` from the start of the volume.
    pub fn byte_offset_of_cluster(&self, cluster: u32) -> Result<u64, FATError> {
        self.boot_sector.cluster_offset(cluster)
    }

    /// Walks the cluster chain starting at `start`.
    pub fn walk(&self, start: u32) -> ClusterChain<'_> {
        self.fat.walk(start)
    }

    /// Reads the whole content of a cluster.
    ///
    /// # Errors
    /// - `FATError::InvalidCluster` for clusters 0 and 1
    /// - `FATError::IOError` if the cluster cannot be read entirely
    pub fn read_cluster(&self, cluster: u32) -> Result<Vec<u8>, FATError> {
        let offset = self.byte_offset_of_cluster(cluster)?;
        debug!("Reading cluster {cluster} at offset {offset}");

        let mut source = self.source.borrow_mut();
        Ok(read_at(&mut *source, offset, self.cluster_size())?)
    }

    /// Reads every 32-byte record of a cluster, unused slots included.
    pub fn read_entries_of_cluster(&self, cluster: u32) -> Result<Vec<DirEntry>, FATError> {
        let buf = self.read_cluster(cluster)?;
        Ok(buf
            .chunks_exact(DIR_ENTRY_SIZE)
            .map(DirEntry::from_slice)
            .collect())
    }

    /// Lazily scans the records of the directory whose chain starts at `start`.
    pub fn scan_chain(&self, start: u32) -> DirScan<'_, R> {
        DirScan {
            volume: self,
            clusters: self.walk(start),
            current: Vec::new().into_iter(),
        }
    }

    /// Lazily scans the directory at `start` and groups its records into entry chains.
    pub fn entry_chains(&self, start: u32) -> EntryChains<DirScan<'_, R>> {
        EntryChains::new(self.scan_chain(start))
    }

    /// Starting sector of the data region.
    fn data_start(&self) -> u64 {
        self.boot_sector.first_data_sector()
    }

    /// Ending sector of the data region.
    fn data_end(&self) -> u64 {
        (*self.boot_sector.tot_sec_32() as u64).max(self.data_start())
    }
}

/// Records of a directory, in on-disk order, across its whole cluster chain.
pub struct DirScan<'a, R: Read + Seek> {
    volume: &'a Volume<R>,
    clusters: ClusterChain<'a>,
    current: std::vec::IntoIter<DirEntry>,
}

impl<R: Read + Seek> Iterator for DirScan<'_, R> {
    type Item = Result<DirEntry, FATError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(Ok(entry));
            }

            let cluster = match self.clusters.next()? {
                Ok(cluster) => cluster,
                Err(err) => return Some(Err(err)),
            };
            match self.volume.read_entries_of_cluster(cluster) {
                Ok(entries) => self.current = entries.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<R: Read + Seek> LayoutDisplay for Volume<R> {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error> {
        let mut out = String::from("");
        let indent = " ".repeat(indent.into());
        let bs = &self.boot_sector;
        let fat_start = *bs.rsvd_sec_cnt() as u64;

        writeln!(out, "{}┌{:─^55}┐", indent, " FAT32 Volume Layout ")?;
        writeln!(
            out,
            "{}├{:^12}┬{:^12}┬{:^12}┬{:^16}┤",
            indent, "Region", "Start", "End", "Description"
        )?;
        writeln!(
            out,
            "{}├{:─<12}┼{:─<12}┼{:─<12}┼{:─<16}┤",
            indent, "", "", "", ""
        )?;
        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent, "Reserved", 0, fat_start, "Boot + Reserved"
        )?;
        for i in 0..*bs.num_fat() as u64 {
            let fat_i_start = fat_start + i * *bs.fat_sz_32() as u64;
            writeln!(
                out,
                "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
                indent,
                format!("FAT #{i}"),
                fat_i_start,
                fat_i_start + *bs.fat_sz_32() as u64,
                "FAT Tables"
            )?;
        }
        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent,
            "Data",
            self.data_start(),
            self.data_end(),
            "Cluster Data"
        )?;
        writeln!(
            out,
            "{}└{:─<12}┴{:─<12}┴{:─<12}┴{:─<16}┘",
            indent, "", "", "", ""
        )?;

        Ok(out)
    }
}
