//! Synthetic FAT32 images for the unit tests.
//!
//! Geometry: 512 bytes per sector, 1 sector per cluster, 32 reserved sectors, 2 FATs of one
//! sector each (128 entries) and 64 data clusters. Cluster 2 holds the root directory.

use std::io::Cursor;

const BYTES_PER_SEC: usize = 512;
const RSVD_SEC_CNT: usize = 32;
const NUM_FAT: usize = 2;
const FAT_SZ: usize = 1;

pub(crate) struct ImageBuilder {
    fs_type: [u8; 8],
    fat_sz_field: u32,
    fat: Vec<u32>,
    image: Vec<u8>,
}

impl ImageBuilder {
    pub(crate) const DATA_CLUSTERS: u32 = 64;
    pub(crate) const TOTAL_SECTORS: u32 =
        (RSVD_SEC_CNT + NUM_FAT * FAT_SZ) as u32 + Self::DATA_CLUSTERS;

    pub(crate) fn new() -> Self {
        let mut fat = vec![0; FAT_SZ * BYTES_PER_SEC / 4];
        fat[0] = 0x0FFF_FFF8;
        fat[1] = 0xFFFF_FFFF;
        fat[2] = 0x0FFF_FFFF;

        Self {
            fs_type: *b"FAT32   ",
            fat_sz_field: FAT_SZ as u32,
            fat,
            image: vec![0; Self::TOTAL_SECTORS as usize * BYTES_PER_SEC],
        }
    }

    pub(crate) fn fs_type(&mut self, label: &[u8; 8]) -> &mut Self {
        self.fs_type = *label;
        self
    }

    /// Overrides the sectors-per-FAT field only; the layout of the image is unchanged.
    pub(crate) fn fat_size_field(&mut self, sectors: u32) -> &mut Self {
        self.fat_sz_field = sectors;
        self
    }

    pub(crate) fn set_fat(&mut self, cluster: u32, value: u32) -> &mut Self {
        self.fat[cluster as usize] = value;
        self
    }

    pub(crate) fn write_cluster(&mut self, cluster: u32, data: &[u8]) -> &mut Self {
        let off = Self::cluster_offset(cluster);
        self.image[off..off + data.len()].copy_from_slice(data);
        self
    }

    pub(crate) fn put_entry(&mut self, cluster: u32, slot: usize, raw: [u8; 32]) -> &mut Self {
        let off = Self::cluster_offset(cluster) + slot * 32;
        self.image[off..off + 32].copy_from_slice(&raw);
        self
    }

    pub(crate) fn build(&self) -> Cursor<Vec<u8>> {
        let mut image = self.image.clone();

        image[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
        image[3..11].copy_from_slice(b"MSWIN4.1");
        image[11..13].copy_from_slice(&(BYTES_PER_SEC as u16).to_le_bytes());
        image[13] = 1;
        image[14..16].copy_from_slice(&(RSVD_SEC_CNT as u16).to_le_bytes());
        image[16] = NUM_FAT as u8;
        image[21] = 0xF8;
        image[32..36].copy_from_slice(&Self::TOTAL_SECTORS.to_le_bytes());
        image[36..40].copy_from_slice(&self.fat_sz_field.to_le_bytes());
        image[44..48].copy_from_slice(&2u32.to_le_bytes());
        image[66] = 0x29;
        image[71..82].copy_from_slice(b"NO NAME    ");
        image[82..90].copy_from_slice(&self.fs_type);
        image[510..512].copy_from_slice(&[0x55, 0xAA]);

        for copy in 0..NUM_FAT {
            let start = (RSVD_SEC_CNT + copy * FAT_SZ) * BYTES_PER_SEC;
            for (i, value) in self.fat.iter().enumerate() {
                image[start + i * 4..start + i * 4 + 4].copy_from_slice(&value.to_le_bytes());
            }
        }

        Cursor::new(image)
    }

    fn cluster_offset(cluster: u32) -> usize {
        (RSVD_SEC_CNT + NUM_FAT * FAT_SZ + cluster as usize - 2) * BYTES_PER_SEC
    }
}

/// A main directory record.
pub(crate) fn short_entry(name: &[u8; 11], attr: u8, cluster: u32, size: u32) -> [u8; 32] {
    let mut raw = [0; 32];
    raw[..11].copy_from_slice(name);
    raw[11] = attr;
    raw[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
    raw[26..28].copy_from_slice(&(cluster as u16).to_le_bytes());
    raw[28..32].copy_from_slice(&size.to_le_bytes());
    raw
}

/// A long name fragment holding up to 13 characters of `part`.
pub(crate) fn lfn_entry(seq: u8, part: &str) -> [u8; 32] {
    let mut units: Vec<u16> = part.encode_utf16().collect();
    assert!(units.len() <= 13);
    if units.len() < 13 {
        units.push(0x0000);
    }
    units.resize(13, 0xFFFF);

    let mut raw = [0; 32];
    raw[0] = seq;
    raw[11] = 0x0F;
    let offsets = (1..11).step_by(2).chain((14..26).step_by(2)).chain((28..32).step_by(2));
    for (unit, off) in units.iter().zip(offsets) {
        raw[off..off + 2].copy_from_slice(&unit.to_le_bytes());
    }
    raw
}

/// The long name fragments of `name`, in on-disk order (last part first).
pub(crate) fn lfn_entries(name: &str) -> Vec<[u8; 32]> {
    let chars: Vec<char> = name.chars().collect();
    let parts: Vec<String> = chars.chunks(13).map(|c| c.iter().collect()).collect();
    let count = parts.len();

    parts
        .iter()
        .enumerate()
        .rev()
        .map(|(i, part)| {
            let mut seq = i as u8 + 1;
            if i + 1 == count {
                seq |= 0x40;
            }
            lfn_entry(seq, part)
        })
        .collect()
}
