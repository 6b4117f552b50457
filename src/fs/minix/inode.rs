use crate::error::Result;
use crate::fs::InodeNumber;
use crate::fs::inode::{Inode, InodeRecord};
use crate::image::{FieldReader, OnDisk};

pub const V1_INODE_SIZE: usize = 32;
pub const V2_INODE_SIZE: usize = 64;

const V1_ZONES: usize = 9;
const V2_ZONES: usize = 10;

/// minix v1 inode: one timestamp, 8-bit gid and link count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinixV1InodeRecord {
    pub mode: u16,
    pub uid: u16,
    pub size: u32,
    pub time: u32,
    pub gid: u8,
    pub nlinks: u8,
    pub zone: [u16; V1_ZONES],
}

impl OnDisk for MinixV1InodeRecord {
    const SIZE: usize = V1_INODE_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let mut zone = [0u16; V1_ZONES];
        for (i, slot) in zone.iter_mut().enumerate() {
            *slot = r.u16_at(14 + 2 * i as u64)?;
        }

        Ok(Self {
            mode: r.u16_at(0)?,
            uid: r.u16_at(2)?,
            size: r.u32_at(4)?,
            time: r.u32_at(8)?,
            gid: r.u8_at(12)?,
            nlinks: r.u8_at(13)?,
            zone,
        })
    }
}

impl InodeRecord for MinixV1InodeRecord {
    fn into_inode(self, number: InodeNumber) -> Inode {
        Inode {
            number,
            mode: self.mode,
            links_count: u16::from(self.nlinks),
            uid: self.uid,
            gid: u16::from(self.gid),
            size: u64::from(self.size),
            atime: self.time,
            mtime: self.time,
            ctime: self.time,
            dtime: 0,
            blocks: self.zone.iter().map(|&z| u32::from(z)).collect(),
        }
    }
}

/// minix v2 inode with separate access, modify and change times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinixV2InodeRecord {
    pub mode: u16,
    pub nlinks: u16,
    pub uid: u16,
    pub gid: u16,
    pub size: u32,
    pub atime: u32,
    pub mtime: u32,
    pub ctime: u32,
    pub zone: [u32; V2_ZONES],
}

impl OnDisk for MinixV2InodeRecord {
    const SIZE: usize = V2_INODE_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let mut zone = [0u32; V2_ZONES];
        for (i, slot) in zone.iter_mut().enumerate() {
            *slot = r.u32_at(24 + 4 * i as u64)?;
        }

        Ok(Self {
            mode: r.u16_at(0)?,
            nlinks: r.u16_at(2)?,
            uid: r.u16_at(4)?,
            gid: r.u16_at(6)?,
            size: r.u32_at(8)?,
            atime: r.u32_at(12)?,
            mtime: r.u32_at(16)?,
            ctime: r.u32_at(20)?,
            zone,
        })
    }
}

impl InodeRecord for MinixV2InodeRecord {
    fn into_inode(self, number: InodeNumber) -> Inode {
        Inode {
            number,
            mode: self.mode,
            links_count: self.nlinks,
            uid: self.uid,
            gid: self.gid,
            size: u64::from(self.size),
            atime: self.atime,
            mtime: self.mtime,
            ctime: self.ctime,
            dtime: 0,
            blocks: self.zone.to_vec(),
        }
    }
}
