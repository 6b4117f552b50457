//! Address arithmetic derived from a decoded superblock.

use super::dentry::DirScheme;
use super::ext2::{Ext2Superblock, GROUP_DESCRIPTOR_SIZE};
use super::minix::MinixSuperblock;
use super::{BASE_BLOCK_SIZE, Format, InodeNumber};
use crate::error::{FileSystemError, Result};

/// Largest ext2 block size exponent (64 KiB blocks).
const MAX_LOG_BLOCK_SIZE: u32 = 6;

/// ext2 revision 0 has no inode size field.
const EXT2_GOOD_OLD_INODE_SIZE: u32 = 128;

/// How inode numbers map onto inode table slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InodeIndexing {
    /// Inode `n` lives in slot `n - 1`; inode 0 is reserved. minix tables,
    /// and ext2 images written by a stock mke2fs.
    OneBased,
    /// The table is addressed by the raw inode id: inode `n` lives in slot `n`.
    #[default]
    ZeroBased,
}

impl InodeIndexing {
    /// Table index of `number`.
    pub fn index(&self, number: InodeNumber) -> Result<u32> {
        match self {
            InodeIndexing::OneBased => number
                .checked_sub(1)
                .ok_or(FileSystemError::InvalidInode(number)),
            InodeIndexing::ZeroBased => Ok(number),
        }
    }

    /// Smallest inode number this scheme accepts.
    pub fn first(&self) -> InodeNumber {
        match self {
            InodeIndexing::OneBased => 1,
            InodeIndexing::ZeroBased => 0,
        }
    }
}

/// Sizes and table locations of one image.
///
/// Minix has no block groups; it is described as a single group spanning the
/// whole zone map, with a fixed inode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub format: Format,
    /// Bytes per block (ext2) or zone (minix).
    pub block_size: u32,
    pub blocks_count: u32,
    pub inodes_count: u32,
    pub first_data_block: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    pub group_count: u32,
    /// Stride between inode table slots.
    pub inode_size: u32,
    /// Byte address of the inode table, when it does not depend on the group.
    pub inode_table_base: Option<u64>,
    pub dir_scheme: DirScheme,
}

impl Geometry {
    pub fn from_ext2(sb: &Ext2Superblock) -> Result<Self> {
        if sb.log_block_size > MAX_LOG_BLOCK_SIZE {
            return Err(FileSystemError::InvalidGeometry(format!(
                "block size exponent {} is too large",
                sb.log_block_size
            )));
        }
        let block_size = BASE_BLOCK_SIZE << sb.log_block_size;

        if sb.blocks_per_group == 0 {
            return Err(FileSystemError::InvalidGeometry(
                "blocks per group is zero".to_string(),
            ));
        }
        if sb.inodes_per_group == 0 {
            return Err(FileSystemError::InvalidGeometry(
                "inodes per group is zero".to_string(),
            ));
        }

        let data_blocks = sb.blocks_count.checked_sub(sb.first_data_block).ok_or_else(|| {
            FileSystemError::InvalidGeometry(format!(
                "first data block {} lies past block count {}",
                sb.first_data_block, sb.blocks_count
            ))
        })?;
        let group_count = data_blocks.div_ceil(sb.blocks_per_group);
        if group_count == 0 {
            return Err(FileSystemError::InvalidGeometry(
                "filesystem has no block groups".to_string(),
            ));
        }

        let inode_size = if sb.rev_level == 0 {
            EXT2_GOOD_OLD_INODE_SIZE
        } else {
            u32::from(sb.inode_size)
        };
        if inode_size < EXT2_GOOD_OLD_INODE_SIZE
            || !inode_size.is_power_of_two()
            || inode_size > block_size
        {
            return Err(FileSystemError::InvalidGeometry(format!(
                "inode size {inode_size} is not usable with {block_size}-byte blocks"
            )));
        }

        Ok(Self {
            format: Format::Ext2,
            block_size,
            blocks_count: sb.blocks_count,
            inodes_count: sb.inodes_count,
            first_data_block: sb.first_data_block,
            blocks_per_group: sb.blocks_per_group,
            inodes_per_group: sb.inodes_per_group,
            group_count,
            inode_size,
            inode_table_base: None,
            dir_scheme: DirScheme::SelfDescribing,
        })
    }

    pub fn from_minix(sb: &MinixSuperblock) -> Result<Self> {
        if sb.log_zone_size != 0 {
            return Err(FileSystemError::InvalidGeometry(format!(
                "zone size exponent {} is not supported, zones are {} bytes",
                sb.log_zone_size, BASE_BLOCK_SIZE
            )));
        }
        if sb.ninodes == 0 {
            return Err(FileSystemError::InvalidGeometry(
                "inode count is zero".to_string(),
            ));
        }
        let zones = sb.zone_count();
        if zones == 0 {
            return Err(FileSystemError::InvalidGeometry(
                "zone count is zero".to_string(),
            ));
        }

        // Boot block, superblock, inode map, zone map, then the inode table.
        let table_block = 2 + u64::from(sb.imap_blocks) + u64::from(sb.zmap_blocks);

        Ok(Self {
            format: Format::Minix,
            block_size: BASE_BLOCK_SIZE,
            blocks_count: zones,
            inodes_count: u32::from(sb.ninodes),
            first_data_block: u32::from(sb.first_data_zone),
            blocks_per_group: zones,
            inodes_per_group: u32::from(sb.ninodes),
            group_count: 1,
            inode_size: sb.version.inode_size(),
            inode_table_base: Some(table_block * u64::from(BASE_BLOCK_SIZE)),
            dir_scheme: DirScheme::FixedSlot {
                name_len: sb.name_len,
            },
        })
    }

    /// Byte address of block (or zone) `id`.
    #[inline]
    pub fn block_address(&self, id: u32) -> u64 {
        u64::from(id) * u64::from(self.block_size)
    }

    /// Byte address of the primary group descriptor table, the block right
    /// after the one holding the superblock.
    pub fn descriptor_table_offset(&self) -> u64 {
        self.block_address(self.first_data_block + 1)
    }

    /// Byte address of the descriptor table replica stored in `group`.
    ///
    /// On 1 KiB-block images this is
    /// `blocks_per_group * block_size * group + 2 * block_size`.
    pub fn backup_descriptor_table_offset(&self, group: u32) -> Result<u64> {
        self.check_group(group)?;
        let group_start = u64::from(group) * u64::from(self.blocks_per_group)
            + u64::from(self.first_data_block);
        Ok((group_start + 1) * u64::from(self.block_size))
    }

    /// Byte offset of `group`'s descriptor inside a table at `table_offset`.
    pub fn descriptor_offset(&self, table_offset: u64, group: u32) -> u64 {
        table_offset + u64::from(group) * GROUP_DESCRIPTOR_SIZE as u64
    }

    /// Splits an inode number into its group and the table-local number
    /// under the same indexing scheme.
    pub fn locate_inode(
        &self,
        number: InodeNumber,
        indexing: InodeIndexing,
    ) -> Result<(u32, InodeNumber)> {
        let last = match indexing {
            InodeIndexing::OneBased => self.inodes_count,
            InodeIndexing::ZeroBased => self.inodes_count.saturating_sub(1),
        };
        if number > last {
            return Err(FileSystemError::InvalidInode(number));
        }

        let index = indexing.index(number)?;
        let group = index / self.inodes_per_group;
        let local = index % self.inodes_per_group + indexing.first();
        if group >= self.group_count {
            return Err(FileSystemError::InvalidInode(number));
        }
        Ok((group, local))
    }

    pub(crate) fn check_group(&self, group: u32) -> Result<()> {
        if group >= self.group_count {
            return Err(FileSystemError::InvalidGroup {
                index: group,
                count: self.group_count,
            });
        }
        Ok(())
    }
}
