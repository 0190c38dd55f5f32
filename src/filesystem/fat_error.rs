//! Error types for reading FAT32 volumes and recovering deleted entries.
//!
//! Every operation of the crate reports failures through [`FATError`]. None of them is
//! retried: errors propagate synchronously up to the caller, which decides how to report them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a volume or recovering an entry.
#[derive(Error, Debug)]
pub enum FATError {
    /// The source could not be opened for random-access binary reading.
    #[error("Failed to open `{}`: {source}", .path.display())]
    OpenFailed { path: PathBuf, source: io::Error },

    /// The filesystem type label of the boot sector is not `"FAT32   "`.
    #[error("Not a FAT32 volume: filesystem type label is `{0}`")]
    NotFat32(String),

    /// The boot sector describes a geometry no offset can be computed from.
    #[error("Invalid volume geometry: {0}")]
    InvalidGeometry(String),

    /// Any failed or short read/seek on the volume, or failed write at the destination.
    #[error("IO Error: `{0}`")]
    IOError(io::Error),

    /// A cluster chain cycles, points outside the FAT or exceeds the volume capacity.
    #[error("Corrupt cluster chain: {0}")]
    CorruptChain(String),

    /// Cluster 0 and 1 are reserved and have no data.
    #[error("Invalid cluster number: `{0}`")]
    InvalidCluster(u32),

    /// The catalog has no entry at the requested display index.
    #[error("Index {index} is out of range: {len} deleted entries are available")]
    IndexOutOfRange { index: usize, len: usize },

    /// Only files and directories can be recovered.
    #[error("Unsupported entry type: attributes 0x{0:02X}")]
    UnsupportedEntryType(u8),

    /// The destination directory already exists or could not be created.
    #[error("Failed to create directory `{}`: {source}", .path.display())]
    DirectoryCreateFailed { path: PathBuf, source: io::Error },

    /// The recovered file on disk does not have the expected length.
    #[error("Verification of `{}` failed: expected {expected} bytes, found {written}", .path.display())]
    VerificationFailed {
        path: PathBuf,
        expected: u64,
        written: u64,
    },

    /// Parsing error occured during structure initialization
    #[error("BinRead Error: `{0}`")]
    BinReadError(binread::Error),
}

/// Converts standard I/O errors into FATError.
impl From<io::Error> for FATError {
    fn from(err: io::Error) -> Self {
        FATError::IOError(err)
    }
}

/// Converts BinRead errors into FATError.
///
/// A short read while decoding is reported as an I/O error.
impl From<binread::Error> for FATError {
    fn from(err: binread::Error) -> Self {
        match err {
            binread::Error::Io(err) => FATError::IOError(err),
            err => FATError::BinReadError(err),
        }
    }
}
