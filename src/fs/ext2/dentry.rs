//! Self-describing ext2 directory records.

use crate::error::{FileSystemError, Result};
use crate::fs::FileType;
use crate::fs::dentry::DirectoryEntry;
use crate::image::{FieldReader, Image, OnDisk};

/// inode (4) + rec_len (2) + name_len (1) + file_type (1)
pub const DIR_ENTRY_HEADER_LEN: usize = 8;

/// Fixed header in front of every ext2 directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ext2DirEntryHeader {
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    pub file_type: u8,
}

impl OnDisk for Ext2DirEntryHeader {
    const SIZE: usize = DIR_ENTRY_HEADER_LEN;

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        Ok(Self {
            inode: r.u32_at(0)?,
            rec_len: r.u16_at(4)?,
            name_len: r.u8_at(6)?,
            file_type: r.u8_at(7)?,
        })
    }
}

/// Decodes the record at `offset` of the block at `block_address`.
///
/// Exactly `name_len` name bytes are copied; whatever follows them up to
/// `rec_len` is padding.
pub fn decode_entry<B: AsRef<[u8]>>(
    image: &Image<B>,
    block_address: u64,
    block_size: u32,
    offset: u64,
) -> Result<(DirectoryEntry, u64)> {
    let record_address = block_address + offset;
    if offset + DIR_ENTRY_HEADER_LEN as u64 > u64::from(block_size) {
        return Err(FileSystemError::corrupt_dir(
            record_address,
            "record header runs past the block",
        ));
    }
    let header: Ext2DirEntryHeader = image.read_struct(record_address)?;
    let rec_len = u64::from(header.rec_len);

    if rec_len == 0 {
        return Err(FileSystemError::corrupt_dir(
            record_address,
            "record length is zero",
        ));
    }
    let needed = DIR_ENTRY_HEADER_LEN as u64 + u64::from(header.name_len);
    if rec_len < needed {
        return Err(FileSystemError::corrupt_dir(
            record_address,
            format!("record length {rec_len} cannot hold a {needed}-byte entry"),
        ));
    }
    if offset + rec_len > u64::from(block_size) {
        return Err(FileSystemError::corrupt_dir(
            record_address,
            format!("record length {rec_len} runs past the {block_size}-byte block"),
        ));
    }

    let name = image.read_vec(
        record_address + DIR_ENTRY_HEADER_LEN as u64,
        u64::from(header.name_len),
    )?;
    let file_type = match header.file_type {
        0 => None,
        raw => Some(FileType::from_ext2_entry(raw)),
    };

    let entry = DirectoryEntry {
        inode: header.inode,
        rec_len: header.rec_len,
        name,
        file_type,
    };
    Ok((entry, offset + rec_len))
}
