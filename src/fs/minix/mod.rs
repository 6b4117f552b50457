//! minix v1/v2 on-disk records.

pub mod dentry;
pub mod inode;
pub mod superblock;

pub use dentry::DIR_INODE_FIELD_LEN;
pub use inode::{MinixV1InodeRecord, MinixV2InodeRecord};
pub use superblock::{MinixSuperblock, MinixVersion};

use super::InodeNumber;

/// Offset of the magic inside the superblock record
pub(crate) const MAGIC_OFFSET: u64 = 16;

/// Inode of the root directory
pub const ROOT_INODE: InodeNumber = 1;
