//! FAT32 boot sector.
//!
//! This module implements:
//! - Decoding of the boot sector found at byte 0 of the volume
//! - Validation of the FAT32 filesystem type label
//! - The geometry computations every other component relies on

use binread::{BinRead, BinReaderExt};
use getset::Getters;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use super::fat_error::FATError;
use crate::constants::{FAT32_SIGNATURE, FIRST_DATA_CLUSTER};

/// Boot sector of a FAT32 volume, up to and including the filesystem type label.
///
/// Fields are decoded one by one, little-endian, in declaration order. The boot code
/// following the label is not needed for recovery and is never read.
#[derive(BinRead, Debug, Clone, Getters)]
#[br(little)]
pub struct BootSector {
    /// Jump instruction to boot code
    jmp: [u8; 3],
    /// OEM identifier (e.g., "MSWIN4.1")
    oem_name: [u8; 8],
    /// Number of bytes per sector
    #[get = "pub"]
    bytes_per_sec: u16,
    /// Number of sectors per cluster
    #[get = "pub"]
    sec_per_clus: u8,
    /// Number of reserved sectors from start of volume
    #[get = "pub"]
    rsvd_sec_cnt: u16,
    /// Number of FAT copies
    #[get = "pub"]
    num_fat: u8,
    /// Maximum number of root directory entries (0 for FAT32)
    root_ent_cnt: u16,
    /// Total sectors for volumes < 32MB (0 for FAT32)
    tot_sec_16: u16,
    /// Media descriptor (0xF8 for fixed disk)
    media: u8,
    /// Sectors per FAT for FAT12/FAT16 (0 for FAT32)
    fat_sz_16: u16,
    /// Sectors per track
    sec_per_trk: u16,
    /// Number of heads
    num_heads: u16,
    /// Number of hidden sectors preceding the partition
    hidd_sec: u32,
    /// Total sectors of the volume
    #[get = "pub"]
    tot_sec_32: u32,
    /// Sectors per FAT
    #[get = "pub"]
    fat_sz_32: u32,
    /// FAT flags (mirroring, active FAT)
    ext_flags: u16,
    /// Filesystem version
    fs_ver: u16,
    /// First cluster of root directory
    #[get = "pub"]
    root_clus: u32,
    /// Sector number of FSINFO structure
    fs_info: u16,
    /// Sector number of backup boot sector
    bk_boot_sec: u16,
    /// Reserved for future expansion
    reserved: [u8; 12],
    /// Drive number
    drv_num: u8,
    /// Reserved (used by Windows NT)
    reserved_1: u8,
    /// Extended boot signature (0x29)
    boot_sig: u8,
    /// Volume serial number
    vol_id: u32,
    /// Volume label
    vol_lab: [u8; 11],
    /// Filesystem type label ("FAT32   ")
    #[get = "pub"]
    fil_sys_type: [u8; 8],
}

impl BootSector {
    /// Decodes the boot sector located at byte 0 of `reader`.
    ///
    /// # Errors
    /// - `FATError::IOError` if the source is shorter than the boot sector
    /// - `FATError::InvalidGeometry` if the bytes per sector or sectors per cluster are 0
    pub fn from_reader<T: Read + Seek>(reader: &mut T) -> Result<BootSector, FATError> {
        reader.seek(SeekFrom::Start(0))?;
        let boot_sector: BootSector = reader.read_le()?;

        if boot_sector.bytes_per_sec == 0 || boot_sector.sec_per_clus == 0 {
            return Err(FATError::InvalidGeometry(format!(
                "{} bytes per sector, {} sectors per cluster",
                boot_sector.bytes_per_sec, boot_sector.sec_per_clus
            )));
        }

        Ok(boot_sector)
    }

    /// Returns true iff the filesystem type label is exactly `"FAT32   "`.
    pub fn is_fat32(&self) -> bool {
        &self.fil_sys_type == FAT32_SIGNATURE
    }

    /// Checks the filesystem type label.
    ///
    /// # Errors
    /// - `FATError::NotFat32` if the label is not exactly `"FAT32   "`
    pub fn validate_signature(&self) -> Result<(), FATError> {
        if self.is_fat32() {
            Ok(())
        } else {
            Err(FATError::NotFat32(
                String::from_utf8_lossy(&self.fil_sys_type).into_owned(),
            ))
        }
    }

    /// Size of a cluster in bytes.
    pub fn cluster_size(&self) -> u32 {
        self.bytes_per_sec as u32 * self.sec_per_clus as u32
    }

    /// Byte offset of the first FAT.
    pub fn fat_offset(&self) -> u64 {
        self.rsvd_sec_cnt as u64 * self.bytes_per_sec as u64
    }

    /// Length in bytes of one FAT.
    pub fn fat_byte_len(&self) -> u64 {
        self.fat_sz_32 as u64 * self.bytes_per_sec as u64
    }

    /// First sector of the data region.
    pub fn first_data_sector(&self) -> u64 {
        self.rsvd_sec_cnt as u64 + self.num_fat as u64 * self.fat_sz_32 as u64
    }

    /// Upper bound on the number of clusters a chain of this volume can span.
    pub fn cluster_count(&self) -> u32 {
        self.tot_sec_32 / self.sec_per_clus as u32
    }

    /// Byte offset of a data cluster.
    ///
    /// # Errors
    /// - `FATError::InvalidCluster` for the reserved clusters 0 and 1
    pub fn cluster_offset(&self, cluster: u32) -> Result<u64, FATError> {
        if cluster < FIRST_DATA_CLUSTER {
            return Err(FATError::InvalidCluster(cluster));
        }

        let sector = self.first_data_sector()
            + (cluster - FIRST_DATA_CLUSTER) as u64 * self.sec_per_clus as u64;
        Ok(sector * self.bytes_per_sec as u64)
    }
}

impl fmt::Display for BootSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut offset = 0;

        macro_rules! field {
            ($name:expr, $val:expr, $size:expr) => {{
                writeln!(f, "  {:<20} 0x{:>04X}: {}", $name, offset, $val)?;
                offset += $size;
            }};
        }

        writeln!(f, "Boot sector:")?;

        field!("jmp", format!("{:02X?}", self.jmp), 3);
        field!("oem_name", String::from_utf8_lossy(&self.oem_name), 8);
        field!("bytes_per_sec", self.bytes_per_sec, 2);
        field!("sec_per_clus", self.sec_per_clus, 1);
        field!("rsvd_sec_cnt", self.rsvd_sec_cnt, 2);
        field!("num_fat", self.num_fat, 1);
        field!("root_ent_cnt", self.root_ent_cnt, 2);
        field!("tot_sec_16", self.tot_sec_16, 2);
        field!("media", format!("0x{:X}", self.media), 1);
        field!("fat_sz_16", self.fat_sz_16, 2);
        field!("sec_per_trk", self.sec_per_trk, 2);
        field!("num_heads", self.num_heads, 2);
        field!("hidd_sec", self.hidd_sec, 4);
        field!("tot_sec_32", self.tot_sec_32, 4);
        field!("fat_sz_32", self.fat_sz_32, 4);
        field!("ext_flags", self.ext_flags, 2);
        field!("fs_ver", self.fs_ver, 2);
        field!("root_clus", self.root_clus, 4);
        field!("fs_info", self.fs_info, 2);
        field!("bk_boot_sec", self.bk_boot_sec, 2);
        field!("reserved", format!("{:02X?}", &self.reserved[..]), 12);
        field!("drv_num", format!("0x{:X}", self.drv_num), 1);
        field!("reserved_1", self.reserved_1, 1);
        field!("boot_sig", format!("0x{:X}", self.boot_sig), 1);
        field!("vol_id", format!("0x{:X}", self.vol_id), 4);
        field!("vol_lab", String::from_utf8_lossy(&self.vol_lab), 11);
        field!(
            "fil_sys_type",
            String::from_utf8_lossy(&self.fil_sys_type),
            8
        );
        writeln!(f, "  {:<20} 0x{:>04X}", "(end of label)", offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_image::ImageBuilder;
    use std::io::Cursor;

    #[test]
    fn decodes_fields_at_their_offsets() {
        let mut image = ImageBuilder::new().build();
        let bs = BootSector::from_reader(&mut image).unwrap();

        assert_eq!(*bs.bytes_per_sec(), 512);
        assert_eq!(*bs.sec_per_clus(), 1);
        assert_eq!(*bs.rsvd_sec_cnt(), 32);
        assert_eq!(*bs.num_fat(), 2);
        assert_eq!(*bs.fat_sz_32(), 1);
        assert_eq!(*bs.root_clus(), 2);
        assert_eq!(*bs.tot_sec_32(), ImageBuilder::TOTAL_SECTORS);
        assert_eq!(bs.fat_offset(), 32 * 512);
        assert_eq!(bs.first_data_sector(), 34);
        assert_eq!(bs.cluster_offset(2).unwrap(), 34 * 512);
        assert_eq!(bs.cluster_offset(5).unwrap(), 37 * 512);
        assert!(bs.is_fat32());
    }

    #[test]
    fn signature_must_match_exactly() {
        for label in [b"FAT16   ", b"FAT32\0\0\0", b"fat32   ", b" FAT32  "] {
            let mut image = ImageBuilder::new().fs_type(label).build();
            let bs = BootSector::from_reader(&mut image).unwrap();
            assert!(!bs.is_fat32());
            assert!(matches!(bs.validate_signature(), Err(FATError::NotFat32(_))));
        }

        let mut image = ImageBuilder::new().fs_type(b"FAT32   ").build();
        let bs = BootSector::from_reader(&mut image).unwrap();
        assert!(bs.validate_signature().is_ok());
    }

    #[test]
    fn truncated_boot_sector_is_an_io_error() {
        let mut image = Cursor::new(vec![0u8; 40]);
        assert!(matches!(
            BootSector::from_reader(&mut image),
            Err(FATError::IOError(_))
        ));
    }

    #[test]
    fn zero_sectors_per_cluster_is_rejected() {
        let mut image = Cursor::new(vec![0u8; 512]);
        assert!(matches!(
            BootSector::from_reader(&mut image),
            Err(FATError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn display_prints_fields_at_their_offsets() {
        let mut image = ImageBuilder::new().build();
        let dump = BootSector::from_reader(&mut image).unwrap().to_string();

        let line = |field: &str| {
            dump.lines()
                .find(|line| line.trim_start().starts_with(field))
                .unwrap_or_else(|| panic!("no {field} line in {dump}"))
                .to_string()
        };
        assert!(line("bytes_per_sec").ends_with("0x000B: 512"));
        assert!(line("num_fat").ends_with("0x0010: 2"));
        assert!(line("tot_sec_32").ends_with(&format!("0x0020: {}", ImageBuilder::TOTAL_SECTORS)));
        assert!(line("root_clus").ends_with("0x002C: 2"));
        assert!(line("fil_sys_type").ends_with("0x0052: FAT32   "));
        assert!(line("(end of label)").ends_with("0x005A"));
    }

    #[test]
    fn reserved_clusters_have_no_offset() {
        let mut image = ImageBuilder::new().build();
        let bs = BootSector::from_reader(&mut image).unwrap();
        assert!(matches!(bs.cluster_offset(1), Err(FATError::InvalidCluster(1))));
    }
}
