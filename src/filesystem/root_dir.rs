//! FAT12 root directory.
//!
//! On FAT12 the root directory is a fixed region placed right after the FATs, holding
//! `root_ent_cnt` entries of 32 bytes.

use log::debug;

use super::bpb::Bpb;
use super::dir_entry::{DIR_ENTRY_SIZE, DirEntry};
use super::fat_error::FATError;
use crate::traits::VolumeReader;
use crate::utils;

/// Every slot of the root directory, in on-disk order.
#[derive(Debug, Clone)]
pub struct RootDir {
    entries: Vec<DirEntry>,
}

impl RootDir {
    /// Reads the root directory of the volume starting at `volume_offset`.
    ///
    /// # Errors
    /// - `FATError::TruncatedRead` if the image ends before the root directory does
    pub fn from<R: VolumeReader + ?Sized>(
        reader: &mut R,
        bpb: &Bpb,
        volume_offset: u64,
    ) -> Result<Self, FATError> {
        let offset = volume_offset + bpb.root_dir_offset();
        let buf = utils::read_region(reader, offset, bpb.root_dir_byte_size())?;

        debug!(
            "Loaded {} root directory entries from offset 0x{offset:X}",
            bpb.root_ent_cnt()
        );

        Self::from_bytes(&buf, usize::from(*bpb.root_ent_cnt()))
    }

    /// Decodes `count` consecutive entries from `buf`.
    ///
    /// # Errors
    /// - `FATError::TruncatedRead` if `buf` holds fewer than `count` entries
    pub fn from_bytes(buf: &[u8], count: usize) -> Result<Self, FATError> {
        if buf.len() < count * DIR_ENTRY_SIZE {
            return Err(FATError::TruncatedRead {
                offset: 0,
                length: count * DIR_ENTRY_SIZE,
            });
        }

        let entries = buf
            .chunks_exact(DIR_ENTRY_SIZE)
            .take(count)
            .map(DirEntry::from_slice)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RootDir { entries })
    }

    /// All slots, used or not.
    pub fn slots(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Iterates over the used entries, in on-disk order.
    ///
    /// A slot whose first name byte is 0x00 is skipped, the scan goes on with the next slot.
    /// FAT normally stops at the first such slot; entries found past it are reported in the log.
    pub fn entries(&self) -> impl Iterator<Item = &DirEntry> {
        let end_marker = self.entries.iter().position(DirEntry::is_unused);

        self.entries
            .iter()
            .enumerate()
            .filter_map(move |(idx, entry)| {
                if entry.is_unused() {
                    return None;
                }
                if let Some(end) = end_marker.filter(|end| idx > *end) {
                    debug!(
                        "Entry #{idx} \"{}\" follows the end marker in slot #{end}",
                        entry.full_name()
                    );
                }
                Some(entry)
            })
    }

    /// Finds the used entry whose 8.3 name is exactly `name` (case-sensitive).
    ///
    /// # Errors
    /// - `FATError::NotFound` if no entry has that name
    pub fn find(&self, name: &str) -> Result<&DirEntry, FATError> {
        self.entries()
            .find(|entry| entry.full_name() == name)
            .ok_or_else(|| FATError::NotFound(name.to_string()))
    }
}
