//! Declaration of traits reused across the code.

use std::io::{self, Read, Seek, SeekFrom};

/// Implementation of the LayoutDisplay trait.
/// It is used to display the layout of a given structure such as a volume.
pub trait LayoutDisplay {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error>;
}

/// Random-access, read-only view over a disk image.
///
/// The FAT12 decoders only ever go through this interface, they never write to the image.
pub trait VolumeReader {
    /// Reads exactly `length` bytes starting at the byte `offset`.
    ///
    /// # Errors
    /// - Returns an `io::Error` of kind `UnexpectedEof` if fewer than `length` bytes are available.
    fn read_at(&mut self, offset: u64, length: usize) -> io::Result<Vec<u8>>;
}

impl<T: Read + Seek> VolumeReader for T {
    fn read_at(&mut self, offset: u64, length: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();

        self.seek(SeekFrom::Start(offset))?;
        // The buffer only grows with the bytes the image actually holds.
        self.by_ref().take(length as u64).read_to_end(&mut buf)?;

        if buf.len() < length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} of {length} bytes available at offset {offset}", buf.len()),
            ));
        }

        Ok(buf)
    }
}
