//! Error types for FAT12 volume decoding.
//!
//! Every failure of the BPB, FAT, directory and cluster-chain decoders is reported through
//! [`FATError`]. Nothing is retried and nothing degrades into a partial result.

use std::io;
use thiserror::Error;

/// Errors that can occur while decoding a FAT12 volume.
#[derive(Error, Debug)]
pub enum FATError {
    /// A fixed-size region could not be fully read from the image.
    #[error("Truncated read: `{length}` bytes expected at offset 0x{offset:X}")]
    TruncatedRead { offset: u64, length: usize },

    /// The boot sector signature must be 0xAA55 (bytes 0x55 0xAA on disk).
    #[error("Invalid BPB signature: `0x{0:04X}`. Expected signature: 0xAA55")]
    InvalidSignature(u16),

    /// A FAT lookup computed a byte index outside of the loaded table.
    #[error(
        "FAT entry of cluster `{cluster}` is out of range: byte {byte_index} of a {fat_len}-byte table"
    )]
    OutOfRange {
        cluster: u16,
        byte_index: usize,
        fat_len: usize,
    },

    /// The requested file name is not in the root directory.
    #[error("File not found: `{0}`")]
    NotFound(String),

    /// A cluster chain reached a cluster number which cannot hold data.
    #[error("Invalid cluster number `{0}` in cluster chain")]
    InvalidCluster(u16),

    /// A cluster chain is longer than the FAT itself, so it must loop.
    #[error("Cluster chain starting at `{0}` loops")]
    ChainLoop(u16),

    /// The first three bytes of a FAT volume must contain a valid x86 jump instruction.
    #[error("Invalid jump instruction `{0}`")]
    InvalidJmp(String),

    /// Bytes per sector must be 512, 1024, 2048 or 4096.
    #[error("Invalid count of bytes per sector: `{0}`. Legal values: 512, 1024, 2048 or 4096")]
    InvalidBytesPerSec(u16),

    /// Sectors per cluster must be a power of 2 up to 128.
    #[error(
        "Invalid number of sector per cluster: `{0}`. Legal values: 1, 2, 4, 8, 16, 32, 64, 128"
    )]
    InvalidSecPerClus(u8),

    /// At least the boot sector is reserved.
    #[error("Invalid count of reserved sectors: `{0}`. Any value greater than 0 is valid.")]
    InvalidRsvdSecCnt(u16),

    #[error("Invalid number of FATs on this volume: `{0}`.")]
    InvalidNumFat(u8),

    /// A FAT12 root directory is a fixed region and can't be empty.
    #[error(
        "Invalid count of directory entries in the root directory: `{0}`. It should be greater than 0 for a FAT12 volume."
    )]
    InvalidRootEntCnt(u16),

    #[error("Invalid total count of sectors on the volume: `{0}`")]
    InvalidTotSec(String),

    #[error("Invalid FAT size: `{0}`")]
    InvalidFatSz(String),

    /// The detected FAT type is not supported (only FAT12 is supported).
    #[error("Unsupported FAT type: `{0}`")]
    UnsupportedFATType(String),

    /// Underlying I/O errors other than short reads.
    #[error("IO Error: `{0}`")]
    IOError(io::Error),

    /// Parsing error occured during structure initialization
    #[error("BinRead Error: `{0}`")]
    BinReadError(binread::Error),
}

impl FATError {
    /// Maps an I/O error raised while reading `length` bytes at `offset`.
    ///
    /// A short read becomes [`FATError::TruncatedRead`], anything else is wrapped as is.
    pub fn from_read(err: io::Error, offset: u64, length: usize) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => FATError::TruncatedRead { offset, length },
            _ => FATError::IOError(err),
        }
    }
}

/// Converts standard I/O errors into FATError.
impl From<io::Error> for FATError {
    fn from(err: io::Error) -> Self {
        FATError::IOError(err)
    }
}

/// Converts BinRead errors into FATError.
impl From<binread::Error> for FATError {
    fn from(err: binread::Error) -> Self {
        FATError::BinReadError(err)
    }
}
