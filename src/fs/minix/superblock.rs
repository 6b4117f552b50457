use super::MAGIC_OFFSET;
use crate::error::{FileSystemError, Result};
use crate::image::{FieldReader, OnDisk};

/// Size of the minix v1/v2 superblock record
pub const SUPERBLOCK_SIZE: usize = 24;

pub const MINIX_SUPER_MAGIC: u16 = 0x137F;
pub const MINIX_SUPER_MAGIC2: u16 = 0x138F;
pub const MINIX2_SUPER_MAGIC: u16 = 0x2468;
pub const MINIX2_SUPER_MAGIC2: u16 = 0x2478;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinixVersion {
    /// 32-byte inodes with 16-bit zone pointers
    V1,
    /// 64-byte inodes with 32-bit zone pointers
    V2,
}

impl MinixVersion {
    /// Version and directory name length encoded by a magic.
    pub fn from_magic(magic: u16) -> Option<(Self, u32)> {
        match magic {
            MINIX_SUPER_MAGIC => Some((MinixVersion::V1, 14)),
            MINIX_SUPER_MAGIC2 => Some((MinixVersion::V1, 30)),
            MINIX2_SUPER_MAGIC => Some((MinixVersion::V2, 14)),
            MINIX2_SUPER_MAGIC2 => Some((MinixVersion::V2, 30)),
            _ => None,
        }
    }

    pub fn inode_size(&self) -> u32 {
        match self {
            MinixVersion::V1 => super::inode::V1_INODE_SIZE as u32,
            MinixVersion::V2 => super::inode::V2_INODE_SIZE as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinixSuperblock {
    pub ninodes: u16,
    /// Zone count on v1
    pub nzones: u16,
    pub imap_blocks: u16,
    pub zmap_blocks: u16,
    pub first_data_zone: u16,
    pub log_zone_size: u16,
    pub max_size: u32,
    pub magic: u16,
    pub state: u16,
    /// Zone count on v2
    pub zones: u32,
    pub version: MinixVersion,
    /// Directory entry name field length
    pub name_len: u32,
}

impl OnDisk for MinixSuperblock {
    const SIZE: usize = SUPERBLOCK_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);

        let magic = r.u16_at(MAGIC_OFFSET)?;
        let (version, name_len) =
            MinixVersion::from_magic(magic).ok_or(FileSystemError::BadMagic {
                expected: "a minix v1/v2 signature",
                found: magic,
            })?;

        Ok(Self {
            ninodes: r.u16_at(0)?,
            nzones: r.u16_at(2)?,
            imap_blocks: r.u16_at(4)?,
            zmap_blocks: r.u16_at(6)?,
            first_data_zone: r.u16_at(8)?,
            log_zone_size: r.u16_at(10)?,
            max_size: r.u32_at(12)?,
            magic,
            state: r.u16_at(18)?,
            zones: r.u32_at(20)?,
            version,
            name_len,
        })
    }
}

impl MinixSuperblock {
    pub fn zone_count(&self) -> u32 {
        match self.version {
            MinixVersion::V1 => u32::from(self.nzones),
            MinixVersion::V2 => self.zones,
        }
    }
}
