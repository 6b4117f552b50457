use super::{EXT2_SUPER_MAGIC, MAGIC_OFFSET};
use crate::error::{FileSystemError, Result};
use crate::image::{FieldReader, OnDisk};

/// Size of the ext2 superblock record
pub const SUPERBLOCK_SIZE: usize = 1024;

/// `s_feature_ro_compat`: backups only in groups 0, 1 and powers of 3, 5, 7.
pub const RO_COMPAT_SPARSE_SUPER: u32 = 0x0001;

/// `s_feature_incompat`: directory entries carry a file type byte.
pub const INCOMPAT_FILETYPE: u32 = 0x0002;

/// First non-reserved inode on revision 0 filesystems.
const GOOD_OLD_FIRST_INO: u32 = 11;

/// Operating system that created the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreatorOs {
    Linux,
    Hurd,
    Masix,
    FreeBsd,
    Lites,
    Unknown(u32),
}

impl CreatorOs {
    pub fn from_raw(value: u32) -> Self {
        match value {
            0 => CreatorOs::Linux,
            1 => CreatorOs::Hurd,
            2 => CreatorOs::Masix,
            3 => CreatorOs::FreeBsd,
            4 => CreatorOs::Lites,
            other => CreatorOs::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CreatorOs::Linux => "Linux",
            CreatorOs::Hurd => "GNU HURD",
            CreatorOs::Masix => "MASIX",
            CreatorOs::FreeBsd => "FreeBSD",
            CreatorOs::Lites => "Lites",
            CreatorOs::Unknown(_) => "unknown os",
        }
    }
}

impl std::fmt::Display for CreatorOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// ext2 superblock, revision 0 fields plus the dynamic revision header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ext2Superblock {
    /// Total inode count
    pub inodes_count: u32,
    /// Total block count
    pub blocks_count: u32,
    /// Blocks reserved for the superuser
    pub r_blocks_count: u32,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    /// Block holding the superblock (1 on 1 KiB-block images, else 0)
    pub first_data_block: u32,
    /// Block size is `1024 << log_block_size`
    pub log_block_size: u32,
    pub log_frag_size: u32,
    pub blocks_per_group: u32,
    pub frags_per_group: u32,
    pub inodes_per_group: u32,
    /// Last mount time
    pub mtime: u32,
    /// Last write time
    pub wtime: u32,
    pub mnt_count: u16,
    pub max_mnt_count: u16,
    /// Magic signature
    pub magic: u16,
    pub state: u16,
    pub errors: u16,
    pub minor_rev_level: u16,
    pub lastcheck: u32,
    pub checkinterval: u32,
    pub creator_os: u32,
    pub rev_level: u32,
    pub def_resuid: u16,
    pub def_resgid: u16,
    /// First non-reserved inode (revision 1)
    pub first_ino: u32,
    /// Inode record size (revision 1)
    pub inode_size: u16,
    /// Group holding this superblock copy
    pub block_group_nr: u16,
    pub feature_compat: u32,
    pub feature_incompat: u32,
    pub feature_ro_compat: u32,
    pub uuid: [u8; 16],
    pub volume_name: [u8; 16],
}

impl OnDisk for Ext2Superblock {
    const SIZE: usize = SUPERBLOCK_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);

        let magic = r.u16_at(MAGIC_OFFSET)?;
        if magic != EXT2_SUPER_MAGIC {
            return Err(FileSystemError::BadMagic {
                expected: "0xEF53",
                found: magic,
            });
        }

        Ok(Self {
            inodes_count: r.u32_at(0)?,
            blocks_count: r.u32_at(4)?,
            r_blocks_count: r.u32_at(8)?,
            free_blocks_count: r.u32_at(12)?,
            free_inodes_count: r.u32_at(16)?,
            first_data_block: r.u32_at(20)?,
            log_block_size: r.u32_at(24)?,
            log_frag_size: r.u32_at(28)?,
            blocks_per_group: r.u32_at(32)?,
            frags_per_group: r.u32_at(36)?,
            inodes_per_group: r.u32_at(40)?,
            mtime: r.u32_at(44)?,
            wtime: r.u32_at(48)?,
            mnt_count: r.u16_at(52)?,
            max_mnt_count: r.u16_at(54)?,
            magic,
            state: r.u16_at(58)?,
            errors: r.u16_at(60)?,
            minor_rev_level: r.u16_at(62)?,
            lastcheck: r.u32_at(64)?,
            checkinterval: r.u32_at(68)?,
            creator_os: r.u32_at(72)?,
            rev_level: r.u32_at(76)?,
            def_resuid: r.u16_at(80)?,
            def_resgid: r.u16_at(82)?,
            first_ino: r.u32_at(84)?,
            inode_size: r.u16_at(88)?,
            block_group_nr: r.u16_at(90)?,
            feature_compat: r.u32_at(92)?,
            feature_incompat: r.u32_at(96)?,
            feature_ro_compat: r.u32_at(100)?,
            uuid: r.bytes_at::<16>(104)?,
            volume_name: r.bytes_at::<16>(120)?,
        })
    }
}

impl Ext2Superblock {
    pub fn creator(&self) -> CreatorOs {
        CreatorOs::from_raw(self.creator_os)
    }

    /// Fragment size in bytes; a negative exponent shifts right.
    pub fn fragment_size(&self) -> u32 {
        let log = self.log_frag_size as i32;
        if log >= 0 {
            1024u32.checked_shl(log as u32).unwrap_or(0)
        } else {
            1024u32.checked_shr(log.unsigned_abs()).unwrap_or(0)
        }
    }

    pub fn first_inode(&self) -> u32 {
        if self.rev_level == 0 {
            GOOD_OLD_FIRST_INO
        } else {
            self.first_ino
        }
    }

    pub fn volume_label(&self) -> String {
        let end = self
            .volume_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.volume_name.len());
        String::from_utf8_lossy(&self.volume_name[..end]).into_owned()
    }

    pub fn has_sparse_super(&self) -> bool {
        self.rev_level > 0 && self.feature_ro_compat & RO_COMPAT_SPARSE_SUPER != 0
    }

    pub fn has_entry_file_type(&self) -> bool {
        self.rev_level > 0 && self.feature_incompat & INCOMPAT_FILETYPE != 0
    }

    /// Whether `group` carries a superblock and descriptor table backup.
    pub fn has_backup(&self, group: u32) -> bool {
        if !self.has_sparse_super() || group <= 1 {
            return true;
        }
        [3u32, 5, 7].iter().any(|&base| is_power_of(group, base))
    }
}

fn is_power_of(mut n: u32, base: u32) -> bool {
    if n == 0 {
        return false;
    }
    while n % base == 0 {
        n /= base;
    }
    n == 1
}
