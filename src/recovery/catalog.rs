//! Catalog of the deleted entries of the root directory.

use log::debug;
use std::fmt;
use std::io::{Read, Seek};

use crate::filesystem::entry_chain::EntryChain;
use crate::filesystem::fat_error::FATError;
use crate::filesystem::volume::Volume;

/// Deleted entries of the root directory, in on-disk order.
///
/// Entries are addressed by a 1-based display index. The catalog is a snapshot: after a
/// recovery wrote to the scanned volume it must be rebuilt by the caller.
#[derive(Debug, Default)]
pub struct DeletedEntryCatalog {
    chains: Vec<EntryChain>,
}

impl DeletedEntryCatalog {
    /// Scans the root directory of `volume` and keeps its deleted entries.
    pub fn build<R: Read + Seek>(volume: &Volume<R>) -> Result<Self, FATError> {
        let mut catalog = Self::default();
        catalog.rebuild(volume)?;
        Ok(catalog)
    }

    /// Clears the catalog and scans the root directory again.
    ///
    /// On error the catalog is left empty.
    pub fn rebuild<R: Read + Seek>(&mut self, volume: &Volume<R>) -> Result<(), FATError> {
        self.chains.clear();

        for chain in volume.entry_chains(volume.root_cluster()) {
            let chain = chain.inspect_err(|_| self.chains.clear())?;
            if chain.is_deleted() {
                debug!("Deleted entry #{}: {chain}", self.chains.len() + 1);
                self.chains.push(chain);
            }
        }

        Ok(())
    }

    /// Returns the entry at the 1-based `index`.
    ///
    /// # Errors
    /// - `FATError::IndexOutOfRange` if no entry has this index
    pub fn get(&self, index: usize) -> Result<EntryChain, FATError> {
        index
            .checked_sub(1)
            .and_then(|i| self.chains.get(i))
            .cloned()
            .ok_or(FATError::IndexOutOfRange {
                index,
                len: self.chains.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryChain> {
        self.chains.iter()
    }
}

impl fmt::Display for DeletedEntryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chains.is_empty() {
            return writeln!(f, "No deleted entry found");
        }

        writeln!(f, "Deleted entries:")?;
        for (i, chain) in self.chains.iter().enumerate() {
            writeln!(f, "{}. {chain}", i + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DELETED_MARKER;
    use crate::test_image::{ImageBuilder, lfn_entries, short_entry};

    fn deleted(mut raw: [u8; 32]) -> [u8; 32] {
        raw[0] = DELETED_MARKER;
        raw
    }

    fn sample_volume() -> Volume<std::io::Cursor<Vec<u8>>> {
        let long = lfn_entries("deleted long name.txt");
        let mut builder = ImageBuilder::new();
        builder
            .put_entry(2, 0, short_entry(b"MYVOLUME   ", 0x08, 0, 0))
            .put_entry(2, 1, short_entry(b"LIVE    TXT", 0x20, 3, 10))
            .put_entry(2, 2, deleted(short_entry(b"GONE    TXT", 0x20, 4, 10)))
            .put_entry(2, 3, deleted(long[0]))
            .put_entry(2, 4, deleted(long[1]))
            .put_entry(2, 5, deleted(short_entry(b"DELETE~1TXT", 0x20, 5, 10)))
            .put_entry(2, 6, deleted(short_entry(b"OLDDIR     ", 0x10, 6, 0)));
        Volume::from_reader(builder.build()).unwrap()
    }

    #[test]
    fn keeps_only_deleted_entries_in_order() {
        let volume = sample_volume();
        let catalog = DeletedEntryCatalog::build(&volume).unwrap();

        assert_eq!(catalog.len(), 3);
        let names: Vec<String> = catalog.iter().map(EntryChain::name).collect();
        assert_eq!(names, vec!["_ONE.TXT", "deleted long name.txt", "_LDDIR"]);

        for chain in catalog.iter() {
            assert_eq!(chain.main_entry().name()[0], DELETED_MARKER);
            assert!(!chain.main_entry().is_long_name());
        }
    }

    #[test]
    fn display_is_numbered_from_one() {
        let volume = sample_volume();
        let catalog = DeletedEntryCatalog::build(&volume).unwrap();

        assert_eq!(
            catalog.to_string(),
            "Deleted entries:\n\
             1. _ONE.TXT (file)\n\
             2. deleted long name.txt (file)\n\
             3. _LDDIR (directory)\n"
        );
    }

    #[test]
    fn get_uses_one_based_indices() {
        let volume = sample_volume();
        let catalog = DeletedEntryCatalog::build(&volume).unwrap();

        assert_eq!(catalog.get(1).unwrap().name(), "_ONE.TXT");
        assert_eq!(catalog.get(3).unwrap().name(), "_LDDIR");
        assert!(matches!(
            catalog.get(0),
            Err(FATError::IndexOutOfRange { index: 0, len: 3 })
        ));
        assert!(matches!(
            catalog.get(4),
            Err(FATError::IndexOutOfRange { index: 4, len: 3 })
        ));
    }

    #[test]
    fn rebuild_replaces_previous_content() {
        let volume = sample_volume();
        let mut catalog = DeletedEntryCatalog::build(&volume).unwrap();
        catalog.rebuild(&volume).unwrap();
        assert_eq!(catalog.len(), 3);

        let empty = Volume::from_reader(ImageBuilder::new().build()).unwrap();
        catalog.rebuild(&empty).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.to_string(), "No deleted entry found\n");
    }
}
