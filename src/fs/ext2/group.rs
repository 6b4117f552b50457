//! Block group descriptors.

use crate::error::Result;
use crate::fs::geometry::Geometry;
use crate::image::{FieldReader, Image, OnDisk};
use tracing::{debug, warn};

/// Size of one on-disk group descriptor
pub const GROUP_DESCRIPTOR_SIZE: usize = 32;

/// Per-group bitmap and inode table locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupDescriptor {
    /// Block number of the block bitmap
    pub block_bitmap: u32,
    /// Block number of the inode bitmap
    pub inode_bitmap: u32,
    /// First block of the inode table
    pub inode_table: u32,
    pub free_blocks_count: u16,
    pub free_inodes_count: u16,
    pub used_dirs_count: u16,
}

impl OnDisk for GroupDescriptor {
    const SIZE: usize = GROUP_DESCRIPTOR_SIZE;

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        Ok(Self {
            block_bitmap: r.u32_at(0)?,
            inode_bitmap: r.u32_at(4)?,
            inode_table: r.u32_at(8)?,
            free_blocks_count: r.u16_at(12)?,
            free_inodes_count: r.u16_at(14)?,
            used_dirs_count: r.u16_at(16)?,
        })
    }
}

impl GroupDescriptor {
    /// A group can only be used when all three table addresses are set.
    pub fn is_usable(&self) -> bool {
        self.block_bitmap != 0 && self.inode_bitmap != 0 && self.inode_table != 0
    }

    pub fn block_bitmap_address(&self, geometry: &Geometry) -> u64 {
        geometry.block_address(self.block_bitmap)
    }

    pub fn inode_bitmap_address(&self, geometry: &Geometry) -> u64 {
        geometry.block_address(self.inode_bitmap)
    }

    pub fn inode_table_address(&self, geometry: &Geometry) -> u64 {
        geometry.block_address(self.inode_table)
    }

    /// First byte past this group's inode table.
    pub fn inode_table_end(&self, geometry: &Geometry) -> u64 {
        self.inode_table_address(geometry)
            + u64::from(geometry.inodes_per_group) * u64::from(geometry.inode_size)
    }
}

/// Reads `geometry.group_count` consecutive descriptors starting at
/// `base_offset`.
pub fn decode_group_descriptors<B: AsRef<[u8]>>(
    image: &Image<B>,
    geometry: &Geometry,
    base_offset: u64,
) -> Result<Vec<GroupDescriptor>> {
    let fits = image.len() / GROUP_DESCRIPTOR_SIZE as u64;
    let mut groups = Vec::with_capacity(u64::from(geometry.group_count).min(fits) as usize);

    for index in 0..geometry.group_count {
        let descriptor: GroupDescriptor =
            image.read_struct(geometry.descriptor_offset(base_offset, index))?;
        if !descriptor.is_usable() {
            warn!(group = index, "block group has no bitmap or inode table, skipping");
        }
        groups.push(descriptor);
    }

    debug!(
        count = groups.len(),
        usable = groups.iter().filter(|g| g.is_usable()).count(),
        base_offset,
        "decoded group descriptors"
    );
    Ok(groups)
}

/// Reads the descriptor table replica stored in `group`.
pub fn read_backup_table<B: AsRef<[u8]>>(
    image: &Image<B>,
    geometry: &Geometry,
    group: u32,
) -> Result<Vec<GroupDescriptor>> {
    let offset = geometry.backup_descriptor_table_offset(group)?;
    decode_group_descriptors(image, geometry, offset)
}

/// Reads `group`'s own descriptor from the table replica stored in `group`.
///
/// For group 0 this is the primary copy. Whether a backup is trusted over the
/// primary is left to the caller.
pub fn read_backup_descriptor<B: AsRef<[u8]>>(
    image: &Image<B>,
    geometry: &Geometry,
    group: u32,
) -> Result<GroupDescriptor> {
    let table = geometry.backup_descriptor_table_offset(group)?;
    image.read_struct(geometry.descriptor_offset(table, group))
}
