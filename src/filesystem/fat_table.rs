//! FAT12 allocation table.
//!
//! A FAT12 table is a dense array of 12-bit entries: two entries share three bytes.
//! Entry `n` holds the cluster following cluster `n` in its chain, or a marker.

use getset::Getters;
use log::debug;
use std::fmt;

use super::bpb::Bpb;
use super::fat_error::FATError;
use crate::traits::VolumeReader;
use crate::utils;

/// Values at or above this threshold end a cluster chain.
///
/// Slightly below the standard end-of-chain range (0xFF8..=0xFFF), so reserved values and
/// the bad cluster marker also stop a walk.
pub const CHAIN_END: u16 = 0xFF6;

/// Marker of a bad cluster.
pub const BAD_CLUSTER: u16 = 0xFF7;

/// The first FAT copy of a volume, loaded once and never modified.
#[derive(Debug, Clone, Getters)]
pub struct FatTable {
    /// Raw bytes of the table
    #[get = "pub"]
    buf: Vec<u8>,
}

/// Meaning of a raw FAT12 entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatEntry {
    /// The cluster is free
    Free,
    /// Reserved value (1 or 0xFF0..=0xFF6)
    Reserved(u16),
    /// The cluster is marked as bad
    Bad,
    /// Last cluster of a chain
    EndOfChain(u16),
    /// Next cluster of the chain
    Next(u16),
}

impl FatEntry {
    pub fn classify(value: u16) -> Self {
        match value {
            0 => FatEntry::Free,
            1 | 0xFF0..=0xFF6 => FatEntry::Reserved(value),
            BAD_CLUSTER => FatEntry::Bad,
            0xFF8.. => FatEntry::EndOfChain(value),
            next => FatEntry::Next(next),
        }
    }
}

impl fmt::Display for FatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatEntry::Free => write!(f, "free"),
            FatEntry::Reserved(value) => write!(f, "reserved (0x{value:03X})"),
            FatEntry::Bad => write!(f, "bad"),
            FatEntry::EndOfChain(value) => write!(f, "end (0x{value:03X})"),
            FatEntry::Next(next) => write!(f, "{next}"),
        }
    }
}

/// Returns `true` if `value` ends a cluster chain: 0 or at least [`CHAIN_END`].
pub fn is_chain_end(value: u16) -> bool {
    value == 0 || value >= CHAIN_END
}

impl FatTable {
    /// Reads the first FAT of the volume starting at `volume_offset`.
    ///
    /// # Errors
    /// - `FATError::TruncatedRead` if the image ends before the table does
    pub fn from<R: VolumeReader + ?Sized>(
        reader: &mut R,
        bpb: &Bpb,
        volume_offset: u64,
    ) -> Result<Self, FATError> {
        let offset = volume_offset + bpb.fat_offset();
        let buf = utils::read_region(reader, offset, bpb.fat_byte_size())?;

        debug!("Loaded {}-byte FAT from offset 0x{offset:X}", buf.len());

        Ok(Self::from_bytes(buf))
    }

    pub fn from_bytes(buf: Vec<u8>) -> Self {
        FatTable { buf }
    }

    /// Returns the 12-bit entry of `cluster`.
    ///
    /// The entry starts at byte `cluster * 12 / 8`. An even cluster uses that byte and the low
    /// nibble of the next one, an odd cluster uses the high nibble of that byte and the whole
    /// next one.
    ///
    /// # Errors
    /// - `FATError::OutOfRange` if the two bytes are not both inside the table
    pub fn entry_of(&self, cluster: u16) -> Result<u16, FATError> {
        let byte_index = usize::from(cluster) * 12 / 8;

        if byte_index + 1 >= self.buf.len() {
            return Err(FATError::OutOfRange {
                cluster,
                byte_index,
                fat_len: self.buf.len(),
            });
        }

        let lo = u16::from(self.buf[byte_index]);
        let hi = u16::from(self.buf[byte_index + 1]);

        if cluster % 2 == 0 {
            Ok(lo | (hi & 0x0F) << 8)
        } else {
            Ok(lo >> 4 | hi << 4)
        }
    }

    /// Number of entries that fit entirely in the table.
    pub fn entry_count(&self) -> usize {
        // Entry n needs bytes n * 3 / 2 and n * 3 / 2 + 1.
        (self.buf.len() * 2 / 3).min(usize::from(u16::MAX) + 1)
    }

    /// Iterates over the raw value of every entry, in cluster order.
    pub fn entries(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.entry_count()).map_while(|cluster| {
            u16::try_from(cluster)
                .ok()
                .and_then(|cluster| self.entry_of(cluster).ok())
        })
    }
}
