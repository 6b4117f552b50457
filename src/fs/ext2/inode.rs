use crate::error::Result;
use crate::fs::inode::{Inode, InodeRecord};
use crate::fs::{FileType, InodeNumber};
use crate::image::{FieldReader, OnDisk};

/// Size of the revision 0 inode; larger slots keep these fields first.
pub const INODE_RECORD_SIZE: usize = 128;

/// 12 direct, one indirect, one double and one triple indirect pointer.
pub const N_BLOCKS: usize = 15;

/// ext2 inode as laid out in the inode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ext2InodeRecord {
    pub mode: u16,
    pub uid: u16,
    /// Low 32 bits of the size
    pub size: u32,
    pub atime: u32,
    pub ctime: u32,
    pub mtime: u32,
    pub dtime: u32,
    pub gid: u16,
    pub links_count: u16,
    /// 512-byte sectors in use
    pub sectors: u32,
    pub flags: u32,
    pub block: [u32; N_BLOCKS],
    pub generation: u32,
    pub file_acl: u32,
    /// High 32 bits of a regular file's size (`i_dir_acl` on directories)
    pub size_high: u32,
}

impl OnDisk for Ext2InodeRecord {
    const SIZE: usize = INODE_RECORD_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);

        let mut block = [0u32; N_BLOCKS];
        for (i, slot) in block.iter_mut().enumerate() {
            *slot = r.u32_at(40 + 4 * i as u64)?;
        }

        Ok(Self {
            mode: r.u16_at(0)?,
            uid: r.u16_at(2)?,
            size: r.u32_at(4)?,
            atime: r.u32_at(8)?,
            ctime: r.u32_at(12)?,
            mtime: r.u32_at(16)?,
            dtime: r.u32_at(20)?,
            gid: r.u16_at(24)?,
            links_count: r.u16_at(26)?,
            sectors: r.u32_at(28)?,
            flags: r.u32_at(32)?,
            block,
            generation: r.u32_at(100)?,
            file_acl: r.u32_at(104)?,
            size_high: r.u32_at(108)?,
        })
    }
}

impl InodeRecord for Ext2InodeRecord {
    fn into_inode(self, number: InodeNumber) -> Inode {
        let size = if FileType::from_mode(self.mode) == FileType::Regular {
            u64::from(self.size) | (u64::from(self.size_high) << 32)
        } else {
            u64::from(self.size)
        };

        Inode {
            number,
            mode: self.mode,
            links_count: self.links_count,
            uid: self.uid,
            gid: self.gid,
            size,
            atime: self.atime,
            mtime: self.mtime,
            ctime: self.ctime,
            dtime: self.dtime,
            blocks: self.block.to_vec(),
        }
    }
}
