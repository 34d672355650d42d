//! FAT12 volume session.
//!
//! This module implements the entry point of the library:
//! - Loading the BPB, the first FAT and the root directory once
//! - Listing and finding root directory entries
//! - Extracting files by following their cluster chain
//! - Displaying the volume layout

use getset::Getters;
use log::info;
use std::fmt::Write as FmtWrite;

use super::bpb::Bpb;
use super::cluster_chain::{self, ClusterChain, ClusterStream, ExtractMode};
use super::dir_entry::DirEntry;
use super::fat_error::FATError;
use super::fat_table::FatTable;
use super::root_dir::RootDir;
use crate::traits::{LayoutDisplay, VolumeReader};

/// Decoded metadata of a FAT12 volume.
///
/// The session is built once and never changes. It does not own the image: operations
/// which read file data borrow the reader for their whole duration.
#[derive(Debug, Getters)]
pub struct VolumeSession {
    /// Boot parameters of the volume
    #[get = "pub"]
    bpb: Bpb,
    /// First copy of the allocation table
    #[get = "pub"]
    fat: FatTable,
    /// Root directory slots
    #[get = "pub"]
    root_dir: RootDir,
    /// Byte offset of the volume in the image
    #[get = "pub"]
    volume_offset: u64,
}

impl VolumeSession {
    /// Decodes the FAT12 volume starting at `volume_offset` in the image.
    ///
    /// # Parameters
    /// - `reader`: The image containing the volume
    /// - `volume_offset`: The byte offset of the volume, 0 for an unpartitioned image
    /// - `validate`: Whether to perform the FAT12 geometry checks on the Bpb
    ///
    /// # Errors
    /// - `FATError::TruncatedRead` if the image ends before the BPB, the FAT or the root directory
    /// - `FATError::InvalidSignature` if the boot signature is not 0xAA55
    /// - Various `FATError` variants if validation fails and `validate` is true
    pub fn open<R: VolumeReader + ?Sized>(
        reader: &mut R,
        volume_offset: u64,
        validate: bool,
    ) -> Result<Self, FATError> {
        let bpb = Bpb::from(reader, volume_offset, validate)?;
        let fat = FatTable::from(reader, &bpb, volume_offset)?;
        let root_dir = RootDir::from(reader, &bpb, volume_offset)?;

        info!(
            "Opened {} volume at offset 0x{volume_offset:X}: {} clusters of {} bytes",
            bpb.fat_type(),
            bpb.cluster_count(),
            bpb.cluster_size()
        );

        Ok(VolumeSession {
            bpb,
            fat,
            root_dir,
            volume_offset,
        })
    }

    /// Iterates over the used root directory entries, in on-disk order.
    pub fn entries(&self) -> impl Iterator<Item = &DirEntry> {
        self.root_dir.entries()
    }

    /// Finds the root directory entry named `name` (exact, case-sensitive 8.3 name).
    ///
    /// # Errors
    /// - `FATError::NotFound` if no entry has that name
    pub fn find(&self, name: &str) -> Result<&DirEntry, FATError> {
        self.root_dir.find(name)
    }

    /// Byte address of `cluster` in the image.
    pub fn cluster_address(&self, cluster: u16) -> Result<u64, FATError> {
        cluster_chain::cluster_address(&self.bpb, self.volume_offset, cluster)
    }

    /// The cluster numbers of `entry`'s data.
    pub fn chain(&self, entry: &DirEntry) -> ClusterChain<'_> {
        ClusterChain::new(&self.fat, entry.cluster())
    }

    /// Opens a lazy stream over the content of the file named `name`.
    ///
    /// # Errors
    /// - `FATError::NotFound` if no entry has that name
    pub fn open_file<'a, R: VolumeReader + ?Sized>(
        &'a self,
        reader: &'a mut R,
        name: &str,
        mode: ExtractMode,
    ) -> Result<ClusterStream<'a, R>, FATError> {
        let entry = self.find(name)?;
        Ok(self.open_entry(reader, entry, mode))
    }

    /// Opens a lazy stream over the content of `entry`.
    pub fn open_entry<'a, R: VolumeReader + ?Sized>(
        &'a self,
        reader: &'a mut R,
        entry: &DirEntry,
        mode: ExtractMode,
    ) -> ClusterStream<'a, R> {
        ClusterStream::new(
            &self.bpb,
            &self.fat,
            self.volume_offset,
            reader,
            entry.cluster(),
            *entry.file_size(),
            mode,
        )
    }

    /// Reads the whole content of the file named `name`.
    ///
    /// # Errors
    /// - `FATError::NotFound` if no entry has that name
    /// - The first failure met while walking the cluster chain
    pub fn read_file<R: VolumeReader + ?Sized>(
        &self,
        reader: &mut R,
        name: &str,
        mode: ExtractMode,
    ) -> Result<Vec<u8>, FATError> {
        self.open_file(reader, name, mode)?.read_to_end()
    }

    fn fat_start(&self) -> u64 {
        self.volume_offset + self.bpb.fat_offset()
    }

    fn root_start(&self) -> u64 {
        self.volume_offset + self.bpb.root_dir_offset()
    }

    fn data_start(&self) -> u64 {
        self.volume_offset + self.bpb.data_region_start()
    }

    fn data_end(&self) -> u64 {
        self.data_start() + u64::from(self.bpb.cluster_count()) * self.bpb.cluster_size() as u64
    }
}

/// Implements the LayoutDisplay trait for VolumeSession
///
/// Offsets are in bytes from the start of the image.
impl LayoutDisplay for VolumeSession {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error> {
        let mut out = String::from("");
        let indent = " ".repeat(indent.into());

        writeln!(out, "{}┌{:─^55}┐", indent, " FAT12 Volume Layout ")?;
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
            indent,
            "Reserved",
            self.volume_offset,
            self.fat_start(),
            "Boot + Reserved"
        )?;
        let fat_size = self.bpb.fat_byte_size() as u64;
        for i in 0..*self.bpb.num_fat() {
            let fat_i_start = self.fat_start() + u64::from(i) * fat_size;
            writeln!(
                out,
                "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
                indent,
                format!("FAT #{i}"),
                fat_i_start,
                fat_i_start + fat_size,
                "FAT Tables"
            )?;
        }
        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent,
            "Root Dir",
            self.root_start(),
            self.data_start(),
            "Root Directory"
        )?;
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
