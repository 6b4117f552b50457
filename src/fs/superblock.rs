use super::ext2::Ext2Superblock;
use super::geometry::Geometry;
use super::minix::MinixSuperblock;
use super::Format;
use crate::error::Result;
use crate::image::Image;

/// Both supported formats keep their superblock 1024 bytes into the image,
/// behind the boot block.
pub const SUPERBLOCK_OFFSET: u64 = 1024;

/// A decoded superblock of either format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Superblock {
    Ext2(Ext2Superblock),
    Minix(MinixSuperblock),
}

/// Reads and validates the superblock of `format`.
pub fn decode_superblock<B: AsRef<[u8]>>(image: &Image<B>, format: Format) -> Result<Superblock> {
    match format {
        Format::Ext2 => image.read_struct(SUPERBLOCK_OFFSET).map(Superblock::Ext2),
        Format::Minix => image.read_struct(SUPERBLOCK_OFFSET).map(Superblock::Minix),
    }
}

impl Superblock {
    pub fn format(&self) -> Format {
        match self {
            Superblock::Ext2(_) => Format::Ext2,
            Superblock::Minix(_) => Format::Minix,
        }
    }

    pub fn geometry(&self) -> Result<Geometry> {
        match self {
            Superblock::Ext2(sb) => Geometry::from_ext2(sb),
            Superblock::Minix(sb) => Geometry::from_minix(sb),
        }
    }

    pub fn inodes_count(&self) -> u32 {
        match self {
            Superblock::Ext2(sb) => sb.inodes_count,
            Superblock::Minix(sb) => u32::from(sb.ninodes),
        }
    }

    /// Blocks on ext2, zones on minix.
    pub fn blocks_count(&self) -> u32 {
        match self {
            Superblock::Ext2(sb) => sb.blocks_count,
            Superblock::Minix(sb) => sb.zone_count(),
        }
    }

    pub fn as_ext2(&self) -> Option<&Ext2Superblock> {
        match self {
            Superblock::Ext2(sb) => Some(sb),
            Superblock::Minix(_) => None,
        }
    }

    pub fn as_minix(&self) -> Option<&MinixSuperblock> {
        match self {
            Superblock::Minix(sb) => Some(sb),
            Superblock::Ext2(_) => None,
        }
    }
}
