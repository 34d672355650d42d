use log::trace;

use crate::filesystem::fat_error::FATError;
use crate::traits::VolumeReader;

/// Reads a fixed-size region of the image.
///
/// # Arguments
///
/// - `reader`: The image to read from.
/// - `offset`: The byte offset of the region.
/// - `length`: The size in bytes of the region.
///
/// # Errors
///
/// Returns `FATError::TruncatedRead` if the image ends before the region does,
/// `FATError::IOError` for any other I/O failure.
pub fn read_region<R: VolumeReader + ?Sized>(
    reader: &mut R,
    offset: u64,
    length: usize,
) -> Result<Vec<u8>, FATError> {
    trace!("Reading {length} bytes at offset 0x{offset:X}");

    reader
        .read_at(offset, length)
        .map_err(|err| FATError::from_read(err, offset, length))
}

/// Returns `bytes` without its trailing ASCII spaces.
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| *b != b' ')
        .map_or(0, |last| last + 1);

    &bytes[..end]
}
