//! Recovery of deleted files and directory subtrees.
//!
//! File content is rebuilt by following the cluster chain of the entry. On most real volumes
//! the chain of a deleted file has been zeroed: only the first cluster is reliable and the
//! rest of the content is best effort.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use crate::filesystem::entry_chain::{ChainAssembler, EntryChain};
use crate::filesystem::fat_error::FATError;
use crate::filesystem::volume::Volume;

/// Default bound on the nesting of recovered directories.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Writes deleted entries of a volume to a destination directory.
///
/// Nothing is ever written back to the volume. If the destination lives on the scanned
/// volume, the writes may overwrite data not recovered yet.
pub struct RecoveryEngine<'a, R: Read + Seek> {
    volume: &'a Volume<R>,
    max_depth: usize,
}

impl<'a, R: Read + Seek> RecoveryEngine<'a, R> {
    pub fn new(volume: &'a Volume<R>) -> Self {
        Self {
            volume,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets how deep directories may nest before the recovery gives up.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Recovers a file or a directory into `dest_dir` and returns the created path.
    ///
    /// # Errors
    /// - `FATError::UnsupportedEntryType` if the main record is neither a file nor a directory
    /// - See [`RecoveryEngine::recover_file`] and [`RecoveryEngine::recover_directory`]
    pub fn recover(&self, chain: EntryChain, dest_dir: &Path) -> Result<PathBuf, FATError> {
        self.recover_at(chain, dest_dir, &mut DirectoryWalk::default())
    }

    /// Recovers the content of a file.
    ///
    /// The cluster chain is followed until the declared size is reached or the chain ends;
    /// the bytes of the last cluster past the declared size are dropped.
    ///
    /// # Errors
    /// - `FATError::CorruptChain` if the chain loops or leaves the FAT
    /// - `FATError::IOError` if a cluster cannot be read or the file cannot be written
    /// - `FATError::VerificationFailed` if the written file has an unexpected length
    pub fn recover_file(&self, chain: &EntryChain, dest_dir: &Path) -> Result<PathBuf, FATError> {
        let entry = chain.main_entry();
        let size = entry.file_size() as usize;
        let mut data = Vec::new();
        let mut remaining = size;

        for cluster in self.volume.walk(entry.first_cluster()) {
            if remaining == 0 {
                break;
            }
            let buf = self.volume.read_cluster(cluster?)?;
            let len = remaining.min(buf.len());
            data.extend_from_slice(&buf[..len]);
            remaining -= len;
        }

        if remaining > 0 {
            warn!(
                "Cluster chain of {} ended early: {} of {} bytes recovered",
                chain.name(),
                data.len(),
                size
            );
        }

        let path = dest_dir.join(output_name(chain));
        fs::write(&path, &data)?;

        let written = fs::metadata(&path)?.len();
        if written != data.len() as u64 {
            return Err(FATError::VerificationFailed {
                path,
                expected: data.len() as u64,
                written,
            });
        }

        info!("Recovered {} ({} bytes)", path.display(), written);
        Ok(path)
    }

    /// Recreates a directory and recovers its current, non-deleted children into it.
    ///
    /// # Errors
    /// - `FATError::DirectoryCreateFailed` if the directory exists or cannot be created
    /// - Any error of a child recovery; children recovered before it are kept
    pub fn recover_directory(
        &self,
        chain: &EntryChain,
        dest_dir: &Path,
    ) -> Result<PathBuf, FATError> {
        self.recover_directory_at(chain, dest_dir, &mut DirectoryWalk::default())
    }

    fn recover_at(
        &self,
        chain: EntryChain,
        dest_dir: &Path,
        walk: &mut DirectoryWalk,
    ) -> Result<PathBuf, FATError> {
        if chain.is_dir() {
            self.recover_directory_at(&chain, dest_dir, walk)
        } else if chain.is_file() {
            self.recover_file(&chain, dest_dir)
        } else {
            Err(FATError::UnsupportedEntryType(chain.main_entry().attr()))
        }
    }

    fn recover_directory_at(
        &self,
        chain: &EntryChain,
        dest_dir: &Path,
        walk: &mut DirectoryWalk,
    ) -> Result<PathBuf, FATError> {
        if walk.depth >= self.max_depth {
            return Err(FATError::CorruptChain(format!(
                "directories nested deeper than {} levels",
                self.max_depth
            )));
        }

        let path = dest_dir.join(output_name(chain));
        fs::create_dir(&path).map_err(|source| FATError::DirectoryCreateFailed {
            path: path.clone(),
            source,
        })?;
        info!("Created directory {}", path.display());

        let start = chain.main_entry().first_cluster();
        walk.visited.insert(start);
        let children = self.children(start)?;

        walk.depth += 1;
        for child in children {
            let child_start = child.main_entry().first_cluster();
            if child.is_dir() && walk.visited.contains(&child_start) {
                warn!(
                    "Skipping {}: directory at cluster {} was already recovered",
                    child.name(),
                    child_start
                );
                continue;
            }
            if let Err(err) = self.recover_at(child, &path, walk) {
                walk.depth -= 1;
                return Err(err);
            }
        }
        walk.depth -= 1;

        Ok(path)
    }

    /// The non-deleted entries of the directory starting at `start`, `.` and `..` excluded.
    fn children(&self, start: u32) -> Result<Vec<EntryChain>, FATError> {
        let mut assembler = ChainAssembler::new();
        let mut children = vec![];

        for entry in self.volume.scan_chain(start) {
            let entry = entry?;
            if entry.is_dot_entry() {
                continue;
            }
            if let Some(chain) = assembler.push(entry) {
                if chain.is_deleted() {
                    debug!("Ignoring deleted child {chain}");
                } else {
                    children.push(chain);
                }
            }
        }

        Ok(children)
    }
}

/// State shared by one recovery call across the directories it descends into.
#[derive(Debug, Default)]
struct DirectoryWalk {
    /// Start clusters of the directories recovered so far.
    visited: HashSet<u32>,
    /// Nesting of the directory being recovered.
    depth: usize,
}

/// Name of the chain usable as a single path component.
fn output_name(chain: &EntryChain) -> String {
    let name = chain.name();
    let sanitized = match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => name.replace(['/', '\\'], "_"),
    };

    if sanitized != name {
        warn!("Recovering {name:?} as {sanitized:?}");
    }
    sanitized
}
