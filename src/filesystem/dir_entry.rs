//! FAT directory entry structure and parsing.
//!
//! This module implements the FAT directory entry structure which contains metadata
//! about files stored in the root directory. Each directory entry is 32 bytes
//! and contains information such as filename, attributes, timestamps, and cluster allocation.

use binread::{BinRead, BinReaderExt};
use getset::Getters;
use std::fmt;
use std::io;

use super::fat_error::FATError;
use crate::utils::trim_trailing_spaces;

/// Size in bytes of a directory entry.
pub const DIR_ENTRY_SIZE: usize = 32;

pub const ATTR_READ_ONLY: u8 = 0x01;
pub const ATTR_HIDDEN: u8 = 0x02;
pub const ATTR_SYSTEM: u8 = 0x04;
pub const ATTR_VOLUME_ID: u8 = 0x08;
pub const ATTR_DIRECTORY: u8 = 0x10;
pub const ATTR_ARCHIVE: u8 = 0x20;

/// FAT directory entry structure.
///
/// Each directory entry is exactly 32 bytes and contains metadata about a file or directory.
///
/// # Notes
/// - The name and extension use the legacy 8.3 format with space padding
/// - On FAT12 the start cluster fits in `fst_clus_lo`, `fst_clus_hi` is ignored
#[derive(BinRead, Debug, Clone, Getters)]
#[br(little)]
pub struct DirEntry {
    /// Base name, space padded
    #[get = "pub"]
    name: [u8; 8],
    /// Extension, space padded
    #[get = "pub"]
    ext: [u8; 3],
    /// File attributes byte
    #[get = "pub"]
    attr: u8,
    /// NT reserved (unused)
    _n_t_res: u8,
    /// Creation time in 10ms units (unused)
    _crt_time_tenth: u8,
    /// Creation time
    #[get = "pub"]
    crt_time: u16,
    /// Creation date
    #[get = "pub"]
    crt_date: u16,
    /// Last access date
    #[get = "pub"]
    lst_acc_date: u16,
    /// High 16 bits of first cluster number (FAT32 only)
    _fst_clus_hi: u16,
    /// Last write time
    #[get = "pub"]
    wrt_time: u16,
    /// Last write date
    #[get = "pub"]
    wrt_date: u16,
    /// First cluster of the file
    #[get = "pub"]
    fst_clus_lo: u16,
    /// File size in bytes (0 for directories)
    #[get = "pub"]
    file_size: u32,
}

/// A time of day decoded from a packed 16-bit FAT time.
///
/// Bits 11-15 hold the hours, bits 5-10 the minutes and bits 0-4 the seconds divided by 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl FatTime {
    /// Minutes are read from the full 6-bit field, older tools masked only 4 bits of it.
    pub fn from_packed(time: u16) -> Self {
        FatTime {
            hours: ((time >> 11) & 0x1F) as u8,
            minutes: ((time >> 5) & 0x3F) as u8,
            seconds: ((time & 0x1F) * 2) as u8,
        }
    }
}

impl fmt::Display for FatTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// A calendar date decoded from a packed 16-bit FAT date.
///
/// Bits 0-4 hold the day, bits 5-8 the month and bits 9-15 the years since 1980.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatDate {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl FatDate {
    pub fn from_packed(date: u16) -> Self {
        FatDate {
            day: (date & 0x1F) as u8,
            month: ((date >> 5) & 0x0F) as u8,
            year: ((date >> 9) & 0x7F) + 1980,
        }
    }
}

impl fmt::Display for FatDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl DirEntry {
    /// Creates a directory entry from the first 32 bytes of a byte slice.
    ///
    /// # Errors
    /// - `FATError::TruncatedRead` if the slice holds fewer than 32 bytes
    pub fn from_slice(buf: &[u8]) -> Result<Self, FATError> {
        if buf.len() < DIR_ENTRY_SIZE {
            return Err(FATError::TruncatedRead {
                offset: 0,
                length: DIR_ENTRY_SIZE,
            });
        }

        let mut reader = io::Cursor::new(&buf[..DIR_ENTRY_SIZE]);
        reader.read_le().map_err(FATError::from)
    }

    /// Whether this slot was never used (first name byte is 0x00).
    pub fn is_unused(&self) -> bool {
        self.name[0] == 0x00
    }

    /// Returns the 8.3 name of the entry as stored: `NAME.EXT`, or `NAME` if the extension is blank.
    ///
    /// Trailing spaces are trimmed from the name and the extension independently. The case
    /// is kept as is and bytes which are not valid UTF-8 are replaced.
    pub fn full_name(&self) -> String {
        let name = String::from_utf8_lossy(trim_trailing_spaces(&self.name));
        let ext = trim_trailing_spaces(&self.ext);

        if ext.is_empty() {
            name.into_owned()
        } else {
            format!("{}.{}", name, String::from_utf8_lossy(ext))
        }
    }

    /// Returns the first cluster of the file.
    pub fn cluster(&self) -> u16 {
        self.fst_clus_lo
    }

    pub fn creation_time(&self) -> FatTime {
        FatTime::from_packed(self.crt_time)
    }

    pub fn creation_date(&self) -> FatDate {
        FatDate::from_packed(self.crt_date)
    }

    pub fn write_time(&self) -> FatTime {
        FatTime::from_packed(self.wrt_time)
    }

    pub fn write_date(&self) -> FatDate {
        FatDate::from_packed(self.wrt_date)
    }

    pub fn access_date(&self) -> FatDate {
        FatDate::from_packed(self.lst_acc_date)
    }

    pub fn is_read_only(&self) -> bool {
        self.attr & ATTR_READ_ONLY != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.attr & ATTR_HIDDEN != 0
    }

    pub fn is_system(&self) -> bool {
        self.attr & ATTR_SYSTEM != 0
    }

    pub fn is_volume_label(&self) -> bool {
        self.attr & ATTR_VOLUME_ID != 0
    }

    /// Checks if the directory attribute bit (0x10) is set in the attributes field
    pub fn is_dir(&self) -> bool {
        self.attr & ATTR_DIRECTORY != 0
    }

    pub fn is_archive(&self) -> bool {
        self.attr & ATTR_ARCHIVE != 0
    }

    /// Attribute flags as a fixed-width string, e.g. `R-S--A`.
    fn attr_flags(&self) -> String {
        [
            (ATTR_READ_ONLY, 'R'),
            (ATTR_HIDDEN, 'H'),
            (ATTR_SYSTEM, 'S'),
            (ATTR_VOLUME_ID, 'V'),
            (ATTR_DIRECTORY, 'D'),
            (ATTR_ARCHIVE, 'A'),
        ]
        .iter()
        .map(|(mask, c)| if self.attr & mask != 0 { *c } else { '-' })
        .collect()
    }
}

impl fmt::Display for DirEntry {
    /// Formats the directory entry for display.
    ///
    /// The plain form only shows the name. The alternate form (`{:#}`) adds the size,
    /// the creation timestamp, the attributes and the first cluster.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(
                f,
                "{:<12} {:>10} B {} {} {} #{}",
                self.full_name(),
                self.file_size,
                self.creation_time(),
                self.creation_date(),
                self.attr_flags(),
                self.fst_clus_lo
            )
        } else {
            write!(f, "{}", self.full_name())
        }
    }
}
