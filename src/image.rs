//! Bounds-checked access to a raw filesystem image.
//!
//! Every decoder in the crate goes through [`Image`]; nothing indexes the
//! backing buffer directly, so a bad offset computed from on-disk data turns
//! into a [`FileSystemError`] instead of a panic.

use crate::error::{FileSystemError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// A fixed-size little-endian record that can be decoded from the image.
pub trait OnDisk: Sized {
    /// Size of the record in bytes.
    const SIZE: usize;

    /// Decodes the record from exactly `SIZE` bytes.
    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Read-only filesystem image.
///
/// The backing storage can be anything that is `AsRef<[u8]>`: an owned
/// `Vec<u8>`, a `memmap2::Mmap` supplied by the caller, a static slice.
#[derive(Debug, Clone)]
pub struct Image<B = Vec<u8>> {
    bytes: B,
}

impl<B: AsRef<[u8]>> Image<B> {
    pub fn new(bytes: B) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.bytes.as_ref().len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.as_ref().is_empty()
    }

    /// Returns exactly `length` bytes starting at `offset`.
    pub fn read_exact(&self, offset: u64, length: u64) -> Result<&[u8]> {
        let image_len = self.len();
        let end = match offset.checked_add(length) {
            Some(end) if end <= image_len => end,
            _ => {
                return Err(FileSystemError::OutOfBounds {
                    offset,
                    length,
                    image_len,
                });
            }
        };

        // `end <= image_len`, which already fits in usize.
        Ok(&self.bytes.as_ref()[offset as usize..end as usize])
    }

    /// Copies `length` bytes at `offset` out of the image.
    pub fn read_vec(&self, offset: u64, length: u64) -> Result<Vec<u8>> {
        self.read_exact(offset, length).map(<[u8]>::to_vec)
    }

    /// Decodes a fixed-size record at `offset`.
    pub fn read_struct<T: OnDisk>(&self, offset: u64) -> Result<T> {
        let image_len = self.len();
        if offset >= image_len {
            return Err(FileSystemError::OutOfBounds {
                offset,
                length: T::SIZE as u64,
                image_len,
            });
        }

        let available = image_len - offset;
        if available < T::SIZE as u64 {
            return Err(FileSystemError::Truncated {
                offset,
                needed: T::SIZE,
                available,
            });
        }

        T::decode(self.read_exact(offset, T::SIZE as u64)?)
    }
}

/// Positioned little-endian field reads over one record's bytes.
pub(crate) struct FieldReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    fn truncated(&self, pos: u64, needed: usize) -> FileSystemError {
        let len = self.cursor.get_ref().len() as u64;
        FileSystemError::Truncated {
            offset: pos,
            needed,
            available: len.saturating_sub(pos),
        }
    }

    pub(crate) fn u8_at(&mut self, pos: u64) -> Result<u8> {
        self.cursor.set_position(pos);
        self.cursor.read_u8().map_err(|_| self.truncated(pos, 1))
    }

    pub(crate) fn u16_at(&mut self, pos: u64) -> Result<u16> {
        self.cursor.set_position(pos);
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.truncated(pos, 2))
    }

    pub(crate) fn u32_at(&mut self, pos: u64) -> Result<u32> {
        self.cursor.set_position(pos);
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| self.truncated(pos, 4))
    }

    pub(crate) fn bytes_at<const N: usize>(&mut self, pos: u64) -> Result<[u8; N]> {
        let start = pos as usize;
        self.cursor
            .get_ref()
            .get(start..start.saturating_add(N))
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| self.truncated(pos, N))
    }
}
