//! FAT12 Bpb structure.
//!
//! This module implements:
//! - BIOS Parameter Block (Bpb) parsing, field by field, from the first sector of the volume
//! - Boot signature check and optional FAT12 geometry validation
//! - The address arithmetic of the volume regions (FAT, root directory, data)

use binread::{BinRead, BinReaderExt};
use getset::Getters;
use log::debug;
use std::fmt;
use std::io;

use super::dir_entry::DIR_ENTRY_SIZE;
use super::fat_error::FATError;
use super::fat_type::FATType;
use crate::traits::VolumeReader;
use crate::utils;

/// Size in bytes of the boot sector holding the Bpb.
pub const BPB_SIZE: usize = 512;

/// Boot sector signature, stored on disk as 0x55 0xAA.
pub const BOOT_SIGNATURE: u16 = 0xAA55;

/// BIOS Parameter Block structure for FAT12 filesystems.
///
/// The Bpb contains essential information about the filesystem layout and properties.
/// The layout is the DOS 4.0 extended Bpb shared by FAT12 and FAT16 volumes.
#[derive(BinRead, Debug, Getters)]
#[br(little)]
pub struct Bpb {
    /// Jump instruction to boot code (must be 0xEB ?? 0x90 or 0xE9 ?? ??)
    #[get = "pub"]
    jmp: [u8; 3],
    /// OEM identifier (e.g., "MSDOS5.0")
    #[get = "pub"]
    oem_name: [u8; 8],
    /// Number of bytes per sector (512, 1024, 2048, or 4096)
    #[get = "pub"]
    bytes_per_sec: u16,
    /// Number of sectors per cluster (power of 2: 1, 2, 4, 8, 16, 32, 64, or 128)
    #[get = "pub"]
    sec_per_clus: u8,
    /// Number of reserved sectors from start of volume
    #[get = "pub"]
    rsvd_sec_cnt: u16,
    /// Number of FAT copies (typically 2 for redundancy)
    #[get = "pub"]
    num_fat: u8,
    /// Number of entries of the fixed-size root directory
    #[get = "pub"]
    root_ent_cnt: u16,
    /// Total sectors for volumes < 32MB
    #[get = "pub"]
    tot_sec_16: u16,
    /// Media descriptor (0xF0 for a 1.44MB floppy)
    #[get = "pub"]
    media: u8,
    /// Sectors per FAT
    #[get = "pub"]
    fat_sz_16: u16,
    /// Sectors per track
    #[get = "pub"]
    sec_per_trk: u16,
    /// Number of heads
    #[get = "pub"]
    num_heads: u16,
    /// Number of hidden sectors preceding the partition
    #[get = "pub"]
    hidd_sec: u32,
    /// Total sectors when `tot_sec_16` is 0
    #[get = "pub"]
    tot_sec_32: u32,
    /// Drive number (0x00 for a floppy)
    #[get = "pub"]
    drv_num: u8,
    /// Reserved (used by Windows NT)
    #[get = "pub"]
    reserved_1: u8,
    /// Extended boot signature (0x29)
    #[get = "pub"]
    ext_boot_sig: u8,
    /// Volume serial number
    #[get = "pub"]
    vol_id: u32,
    /// Volume label (11 bytes)
    #[get = "pub"]
    vol_lab: [u8; 11],
    /// Filesystem type label ("FAT12   ")
    #[get = "pub"]
    fil_sys_type: [u8; 8],

    /// Boot code
    #[br(count = 448)]
    #[get = "pub"]
    boot_code: Vec<u8>,
    /// Boot sector signature (0xAA55)
    #[get = "pub"]
    sig: u16,
}

impl Bpb {
    /// Reads and optionally validates the Bpb of the volume starting at `volume_offset`.
    ///
    /// # Parameters
    /// - `reader`: The image containing the filesystem
    /// - `volume_offset`: The byte offset of the volume in the image
    /// - `validate`: Whether to perform the FAT12 geometry checks on the Bpb
    ///
    /// # Errors
    /// - `FATError::TruncatedRead` if fewer than 512 bytes are available
    /// - `FATError::InvalidSignature` if the signature is not 0xAA55, even when `validate` is false
    /// - Various `FATError` variants if validation fails and `validate` is true
    pub fn from<R: VolumeReader + ?Sized>(
        reader: &mut R,
        volume_offset: u64,
        validate: bool,
    ) -> Result<Bpb, FATError> {
        let buf = utils::read_region(reader, volume_offset, BPB_SIZE)?;
        let bpb = Self::from_bytes(&buf)?;

        if validate { bpb.validate() } else { Ok(bpb) }
    }

    /// Decodes a Bpb from the first 512 bytes of `buf` and checks its signature.
    ///
    /// # Errors
    /// - `FATError::TruncatedRead` if `buf` is shorter than 512 bytes
    /// - `FATError::InvalidSignature` if the signature is not 0xAA55
    pub fn from_bytes(buf: &[u8]) -> Result<Bpb, FATError> {
        if buf.len() < BPB_SIZE {
            return Err(FATError::TruncatedRead {
                offset: 0,
                length: BPB_SIZE,
            });
        }

        let mut reader = io::Cursor::new(&buf[..BPB_SIZE]);
        let bpb: Bpb = reader.read_le()?;

        if bpb.sig != BOOT_SIGNATURE {
            return Err(FATError::InvalidSignature(bpb.sig));
        }

        debug!(
            "Bpb: {} B/sector, {} sectors/cluster, {} reserved, {} FATs of {} sectors, {} root entries",
            bpb.bytes_per_sec,
            bpb.sec_per_clus,
            bpb.rsvd_sec_cnt,
            bpb.num_fat,
            bpb.fat_sz_16,
            bpb.root_ent_cnt
        );

        Ok(bpb)
    }

    /// Size in bytes of a cluster.
    pub fn cluster_size(&self) -> usize {
        usize::from(self.sec_per_clus) * usize::from(self.bytes_per_sec)
    }

    /// Byte offset of the first FAT, relative to the start of the volume.
    pub fn fat_offset(&self) -> u64 {
        u64::from(self.rsvd_sec_cnt) * u64::from(self.bytes_per_sec)
    }

    /// Size in bytes of one FAT copy.
    pub fn fat_byte_size(&self) -> usize {
        usize::from(self.fat_sz_16) * usize::from(self.bytes_per_sec)
    }

    /// Byte offset of the root directory, relative to the start of the volume.
    pub fn root_dir_offset(&self) -> u64 {
        (u64::from(self.rsvd_sec_cnt) + u64::from(self.num_fat) * u64::from(self.fat_sz_16))
            * u64::from(self.bytes_per_sec)
    }

    /// Size in bytes of the root directory.
    pub fn root_dir_byte_size(&self) -> usize {
        usize::from(self.root_ent_cnt) * DIR_ENTRY_SIZE
    }

    /// Byte offset of cluster 2, relative to the start of the volume.
    ///
    /// The data region starts right after the last root directory entry.
    pub fn data_region_start(&self) -> u64 {
        self.root_dir_offset() + self.root_dir_byte_size() as u64
    }

    /// Total count of sectors on the volume.
    pub fn tot_sec(&self) -> u32 {
        if self.tot_sec_16 == 0 {
            self.tot_sec_32
        } else {
            self.tot_sec_16.into()
        }
    }

    /// Determines the number of clusters in the data section.
    ///
    /// # Returns
    /// - The number of data clusters, 0 if the geometry is degenerate.
    pub fn cluster_count(&self) -> u32 {
        let bytes_per_sec = u32::from(self.bytes_per_sec);
        let sec_per_clus = u32::from(self.sec_per_clus);
        if bytes_per_sec == 0 || sec_per_clus == 0 {
            return 0;
        }

        let root_dir_sectors = (u32::from(self.root_ent_cnt) * DIR_ENTRY_SIZE as u32)
            .div_ceil(bytes_per_sec);
        let meta_sec = u32::from(self.rsvd_sec_cnt)
            + u32::from(self.num_fat) * u32::from(self.fat_sz_16)
            + root_dir_sectors;

        self.tot_sec().saturating_sub(meta_sec) / sec_per_clus
    }

    /// Determines the FAT type based on the number of clusters in the filesystem.
    pub fn fat_type(&self) -> FATType {
        FATType::from_cluster_count(self.cluster_count())
    }

    /// Validates the Bpb structure according to the FAT12 requirements.
    ///
    /// # Errors
    /// - `FATError::InvalidJmp`: If the jump instruction is invalid
    /// - `FATError::InvalidBytesPerSec`: If bytes per sector is not a valid value
    /// - `FATError::InvalidSecPerClus`: If sectors per cluster is not a valid value
    /// - `FATError::InvalidRsvdSecCnt`: If reserved sector count is 0
    /// - `FATError::InvalidNumFat`: If number of FATs is 0
    /// - `FATError::InvalidRootEntCnt`: If the root directory has no entry
    /// - `FATError::InvalidFatSz`: If the FAT size is 0
    /// - `FATError::InvalidTotSec`: If the volume has no sector
    /// - `FATError::UnsupportedFATType`: If filesystem is not FAT12
    fn validate(self) -> Result<Self, FATError> {
        if !((self.jmp[0] == 0xEB && self.jmp[2] == 0x90) || self.jmp[0] == 0xE9) {
            return Err(FATError::InvalidJmp(format!(
                "0x{:02X}{:02X}{:02X}",
                self.jmp[0], self.jmp[1], self.jmp[2],
            )));
        }

        const VALID_BYTES_PER_SEC: [u16; 4] = [512, 1024, 2048, 4096];
        if !VALID_BYTES_PER_SEC.contains(&self.bytes_per_sec) {
            return Err(FATError::InvalidBytesPerSec(self.bytes_per_sec));
        }

        const VALID_SEC_PER_CLUS: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];
        if !VALID_SEC_PER_CLUS.contains(&self.sec_per_clus) {
            return Err(FATError::InvalidSecPerClus(self.sec_per_clus));
        }

        if self.rsvd_sec_cnt == 0 {
            return Err(FATError::InvalidRsvdSecCnt(self.rsvd_sec_cnt));
        }

        if self.num_fat == 0 {
            return Err(FATError::InvalidNumFat(self.num_fat));
        }

        if self.root_ent_cnt == 0 {
            return Err(FATError::InvalidRootEntCnt(self.root_ent_cnt));
        }

        if self.fat_sz_16 == 0 {
            return Err(FATError::InvalidFatSz(String::from(
                "BPB_FATSz16 should be greater than 0 for a FAT12 volume.",
            )));
        }

        if self.tot_sec() == 0 {
            return Err(FATError::InvalidTotSec(String::from(
                "BPB_TotSec16 or BPB_TotSec32 should be greater than 0.",
            )));
        }

        let fat_type = self.fat_type();
        if fat_type != FATType::FAT12 {
            return Err(FATError::UnsupportedFATType(fat_type.to_string()));
        }

        Ok(self)
    }
}

/// Implements the Display trait for Bpb
impl fmt::Display for Bpb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut offset = 0;

        macro_rules! field {
            ($name:expr, $val:expr, $size:expr) => {{
                writeln!(f, "  {:<20} 0x{:>04X}: {}", $name, offset, $val)?;
                offset += $size;
            }};
        }

        writeln!(f, "BIOS Parameter Block (Bpb):")?;

        field!("jmp", format!("{:02X?}", self.jmp), 3);
        field!("oem_name", String::from_utf8_lossy(&self.oem_name), 8);
        field!("bytes_per_sec", self.bytes_per_sec, 2);
        field!("sec_per_clus", self.sec_per_clus, 1);
        field!("rsvd_sec_cnt", self.rsvd_sec_cnt, 2);
        field!("num_fat", self.num_fat, 1);
        field!("root_ent_cnt", self.root_ent_cnt, 2);
        field!("tot_sec_16", self.tot_sec_16, 2);
        field!("media", format!("0x{:02X}", self.media), 1);
        field!("fat_sz_16", self.fat_sz_16, 2);
        field!("sec_per_trk", self.sec_per_trk, 2);
        field!("num_heads", self.num_heads, 2);
        field!("hidd_sec", self.hidd_sec, 4);
        field!("tot_sec_32", self.tot_sec_32, 4);
        field!("drv_num", format!("0x{:02X}", self.drv_num), 1);
        field!("reserved_1", format!("0x{:02X}", self.reserved_1), 1);
        field!("ext_boot_sig", format!("0x{:02X}", self.ext_boot_sig), 1);
        field!("vol_id", format!("0x{:08X}", self.vol_id), 4);
        field!("vol_lab", String::from_utf8_lossy(&self.vol_lab), 11);
        field!(
            "fil_sys_type",
            String::from_utf8_lossy(&self.fil_sys_type),
            8
        );

        writeln!(
            f,
            "\nBoot Code 0x{:04X} ({} bytes):",
            offset,
            self.boot_code.len()
        )?;
        for (i, chunk) in self.boot_code.chunks(16).enumerate() {
            write!(f, "  0x{:04X}: ", offset + i * 16)?;
            for byte in chunk {
                write!(f, "{byte:02X} ")?;
            }
            writeln!(f)?;
        }
        offset += self.boot_code.len();

        writeln!(f, "\nSignature 0x{:04X}: 0x{:04X}", offset, self.sig)?;

        Ok(())
    }
}
