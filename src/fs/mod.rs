//! On-disk layouts and the generic machinery shared by them.
//!
//! `ext2` and `minix` hold the bit-exact record decoders. The modules at this
//! level work on the decoded values: geometry, inode addressing, directory
//! enumeration and path resolution.

use crate::image::{FieldReader, Image};

pub mod dentry;
pub mod dir;
pub mod ext2;
pub mod geometry;
pub mod inode;
pub mod minix;
pub mod path;
pub mod superblock;

/// Inode numbers as stored on disk. Both formats fit in 32 bits.
pub type InodeNumber = u32;

/// Size of the unit every on-disk address in this crate is expressed in.
pub const BASE_BLOCK_SIZE: u32 = 1024;

/// The on-disk layout an image is interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Block groups, self-describing directory records.
    Ext2,
    /// One inode table, fixed-slot directory records.
    Minix,
}

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Format::Ext2 => "ext2",
            Format::Minix => "minix",
        }
    }

    /// Inode number of the root directory.
    pub fn root_inode(&self) -> InodeNumber {
        match self {
            Format::Ext2 => ext2::ROOT_INODE,
            Format::Minix => minix::ROOT_INODE,
        }
    }

    /// Reports which supported signature sits in the superblock slot.
    ///
    /// Only the magic is checked; the superblock may still fail to decode.
    pub fn probe<B: AsRef<[u8]>>(image: &Image<B>) -> Option<Format> {
        let record = image
            .read_exact(superblock::SUPERBLOCK_OFFSET, ext2::SUPERBLOCK_MAGIC_END)
            .ok()?;
        let mut fields = FieldReader::new(record);

        if fields.u16_at(ext2::MAGIC_OFFSET).ok()? == ext2::EXT2_SUPER_MAGIC {
            return Some(Format::Ext2);
        }
        let minix_magic = fields.u16_at(minix::MAGIC_OFFSET).ok()?;
        minix::MinixVersion::from_magic(minix_magic).map(|_| Format::Minix)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of object an inode or directory entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    Symlink,
    Unknown,
}

const S_IFMT: u16 = 0xF000;

impl FileType {
    /// Classifies the type bits of an inode mode.
    pub fn from_mode(mode: u16) -> Self {
        match mode & S_IFMT {
            0x1000 => FileType::Fifo,
            0x2000 => FileType::CharDevice,
            0x4000 => FileType::Directory,
            0x6000 => FileType::BlockDevice,
            0x8000 => FileType::Regular,
            0xA000 => FileType::Symlink,
            0xC000 => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    /// Classifies the type byte stored in an ext2 directory entry.
    pub fn from_ext2_entry(file_type: u8) -> Self {
        match file_type {
            1 => FileType::Regular,
            2 => FileType::Directory,
            3 => FileType::CharDevice,
            4 => FileType::BlockDevice,
            5 => FileType::Fifo,
            6 => FileType::Socket,
            7 => FileType::Symlink,
            _ => FileType::Unknown,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileType::Regular => "regular file",
            FileType::Directory => "directory",
            FileType::CharDevice => "character device",
            FileType::BlockDevice => "block device",
            FileType::Fifo => "named pipe",
            FileType::Socket => "socket",
            FileType::Symlink => "symbolic link",
            FileType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
