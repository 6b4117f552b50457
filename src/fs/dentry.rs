//! Directory entries and the two on-disk record shapes.

use super::{FileType, InodeNumber, ext2, minix};
use crate::error::Result;
use crate::image::Image;
use std::borrow::Cow;

/// One name → inode mapping decoded out of a directory block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub inode: InodeNumber,
    /// Distance from this record to the next one.
    pub rec_len: u16,
    /// Name bytes exactly as stored, without padding.
    pub name: Vec<u8>,
    /// Type hint stored in the entry itself (ext2 with the filetype feature).
    pub file_type: Option<FileType>,
}

impl DirectoryEntry {
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn is_dot_or_dotdot(&self) -> bool {
        self.name == b"." || self.name == b".."
    }
}

/// How records are laid out inside a directory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirScheme {
    /// Each record carries its own length (ext2).
    SelfDescribing,
    /// Every record occupies `2 + name_len` bytes (minix).
    FixedSlot { name_len: u32 },
}

impl DirScheme {
    /// Slot size of a fixed-slot layout.
    pub fn slot_size(&self) -> Option<u32> {
        match self {
            DirScheme::SelfDescribing => None,
            DirScheme::FixedSlot { name_len } => Some(minix::DIR_INODE_FIELD_LEN + name_len),
        }
    }
}

/// Decodes the record at `offset` inside the block at `block_address` and
/// returns it with the offset of the following record.
pub fn decode_entry<B: AsRef<[u8]>>(
    image: &Image<B>,
    scheme: DirScheme,
    block_address: u64,
    block_size: u32,
    offset: u64,
) -> Result<(DirectoryEntry, u64)> {
    match scheme {
        DirScheme::SelfDescribing => {
            ext2::dentry::decode_entry(image, block_address, block_size, offset)
        }
        DirScheme::FixedSlot { name_len } => {
            minix::dentry::decode_entry(image, block_address, name_len, offset)
        }
    }
}
