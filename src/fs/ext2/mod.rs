//! ext2 on-disk records.

pub mod dentry;
pub mod group;
pub mod inode;
pub mod superblock;

pub use dentry::{DIR_ENTRY_HEADER_LEN, Ext2DirEntryHeader};
pub use group::{GROUP_DESCRIPTOR_SIZE, GroupDescriptor};
pub use inode::Ext2InodeRecord;
pub use superblock::{CreatorOs, Ext2Superblock};

use super::InodeNumber;

/// ext2 superblock magic number
pub const EXT2_SUPER_MAGIC: u16 = 0xEF53;

/// Offset of the magic inside the superblock record
pub(crate) const MAGIC_OFFSET: u64 = 56;

/// Bytes of the superblock needed to see both supported magics.
pub(crate) const SUPERBLOCK_MAGIC_END: u64 = MAGIC_OFFSET + 2;

/// Inode of the root directory
pub const ROOT_INODE: InodeNumber = 2;
