//! The public façade over one opened image.

use crate::error::{FileSystemError, Result};
use crate::fs::dentry::DirectoryEntry;
use crate::fs::dir::DirEntries;
use crate::fs::ext2::{Ext2InodeRecord, GroupDescriptor, group};
use crate::fs::geometry::{Geometry, InodeIndexing};
use crate::fs::inode::{Inode, read_inode};
use crate::fs::minix::{MinixV1InodeRecord, MinixV2InodeRecord, MinixVersion};
use crate::fs::path::{DEFAULT_MAX_DEPTH, DirectoryTree, resolve, split_path};
use crate::fs::superblock::{Superblock, decode_superblock};
use crate::fs::{FileType, Format, InodeNumber};
use crate::image::Image;
use tracing::debug;

/// How an image is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub format: Format,
    /// Inode table addressing for ext2, by raw inode id unless set otherwise.
    /// minix is always one-based.
    pub inode_indexing: InodeIndexing,
    /// Most path components a lookup or walk descends through.
    pub max_depth: usize,
}

impl ViewOptions {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            inode_indexing: InodeIndexing::ZeroBased,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_inode_indexing(mut self, indexing: InodeIndexing) -> Self {
        self.inode_indexing = indexing;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn effective_indexing(&self) -> InodeIndexing {
        match self.format {
            Format::Ext2 => self.inode_indexing,
            Format::Minix => InodeIndexing::OneBased,
        }
    }
}

/// One entry reached by [`FilesystemView::walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path below the starting directory, with a leading `/`. Absolute when
    /// the walk starts at the root.
    pub path: String,
    pub entry: DirectoryEntry,
    /// Type from the target inode's mode.
    pub file_type: FileType,
    /// 1 for entries of the starting directory.
    pub depth: usize,
}

/// Read-only view of a filesystem image.
///
/// Decodes the superblock, geometry and (for ext2) the primary group
/// descriptor table once at open time. Everything else is decoded from the
/// image on each call; nothing is cached.
#[derive(Debug)]
pub struct FilesystemView<B = Vec<u8>> {
    image: Image<B>,
    superblock: Superblock,
    geometry: Geometry,
    groups: Vec<GroupDescriptor>,
    options: ViewOptions,
}

impl<B: AsRef<[u8]>> FilesystemView<B> {
    pub fn open(image: Image<B>, format: Format) -> Result<Self> {
        Self::open_with(image, ViewOptions::new(format))
    }

    pub fn open_with(image: Image<B>, options: ViewOptions) -> Result<Self> {
        let superblock = decode_superblock(&image, options.format)?;
        let geometry = superblock.geometry()?;

        let groups = match options.format {
            Format::Ext2 => group::decode_group_descriptors(
                &image,
                &geometry,
                geometry.descriptor_table_offset(),
            )?,
            Format::Minix => Vec::new(),
        };

        debug!(
            format = %options.format,
            block_size = geometry.block_size,
            inodes = geometry.inodes_count,
            blocks = geometry.blocks_count,
            groups = geometry.group_count,
            image_len = image.len(),
            "opened filesystem image"
        );

        Ok(Self {
            image,
            superblock,
            geometry,
            groups,
            options,
        })
    }

    pub fn image(&self) -> &Image<B> {
        &self.image
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn format(&self) -> Format {
        self.options.format
    }

    pub fn root_inode(&self) -> InodeNumber {
        self.options.format.root_inode()
    }

    /// Primary group descriptor table. Empty for minix.
    pub fn group_descriptors(&self) -> &[GroupDescriptor] {
        &self.groups
    }

    /// Groups whose bitmaps and inode table are all set, with their index.
    pub fn usable_groups(&self) -> impl Iterator<Item = (u32, &GroupDescriptor)> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_usable())
            .map(|(i, g)| (i as u32, g))
    }

    /// Backup copy of `group`'s descriptor, read from the replica in `group`.
    pub fn read_backup_descriptor(&self, group: u32) -> Result<GroupDescriptor> {
        self.require_ext2()?;
        group::read_backup_descriptor(&self.image, &self.geometry, group)
    }

    /// Whole descriptor table replica stored in `group`.
    pub fn read_backup_table(&self, group: u32) -> Result<Vec<GroupDescriptor>> {
        self.require_ext2()?;
        group::read_backup_table(&self.image, &self.geometry, group)
    }

    pub fn read_inode(&self, number: InodeNumber) -> Result<Inode> {
        let indexing = self.options.effective_indexing();
        match &self.superblock {
            Superblock::Ext2(_) => {
                let (group, local) = self.geometry.locate_inode(number, indexing)?;
                let descriptor = self
                    .groups
                    .get(group as usize)
                    .ok_or(FileSystemError::InvalidInode(number))?;
                if !descriptor.is_usable() {
                    return Err(FileSystemError::UnusableGroup(group));
                }

                let base = descriptor.inode_table_address(&self.geometry);
                let mut inode = read_inode::<Ext2InodeRecord, _>(
                    &self.image,
                    base,
                    local,
                    self.geometry.inode_size,
                    indexing,
                )?;
                inode.number = number;
                Ok(inode)
            }
            Superblock::Minix(sb) => {
                if number > self.geometry.inodes_count {
                    return Err(FileSystemError::InvalidInode(number));
                }
                let base = self
                    .geometry
                    .inode_table_base
                    .ok_or_else(|| FileSystemError::InvalidGeometry("no inode table".into()))?;
                let size = self.geometry.inode_size;
                match sb.version {
                    MinixVersion::V1 => read_inode::<MinixV1InodeRecord, _>(
                        &self.image,
                        base,
                        number,
                        size,
                        indexing,
                    ),
                    MinixVersion::V2 => read_inode::<MinixV2InodeRecord, _>(
                        &self.image,
                        base,
                        number,
                        size,
                        indexing,
                    ),
                }
            }
        }
    }

    /// Lazy entries of directory `number`.
    pub fn entries(&self, number: InodeNumber) -> Result<DirEntries<'_, B>> {
        let dir = self.read_inode(number)?;
        self.entries_of(&dir)
    }

    pub fn list_directory(&self, number: InodeNumber) -> Result<Vec<DirectoryEntry>> {
        self.entries(number)?.collect()
    }

    /// Resolves `path` from the root directory.
    pub fn resolve_path(&self, path: &str) -> Result<InodeNumber> {
        debug!(path, "resolving path");
        resolve(
            self,
            self.root_inode(),
            &split_path(path),
            self.options.max_depth,
        )
    }

    /// Contents of a file stored in a single block or zone.
    pub fn read_file_data(&self, number: InodeNumber) -> Result<Vec<u8>> {
        let inode = self.read_inode(number)?;
        if inode.size == 0 {
            return Ok(Vec::new());
        }
        if inode.size > u64::from(self.geometry.block_size) {
            return Err(FileSystemError::MultiBlockFile {
                inode: number,
                size: inode.size,
                block_size: self.geometry.block_size,
            });
        }

        let block = inode.first_block().ok_or_else(|| FileSystemError::CorruptInode {
            inode: number,
            reason: format!("{} bytes but no data block", inode.size),
        })?;
        self.image.read_vec(self.geometry.block_address(block), inode.size)
    }

    /// Every entry below directory `start`, depth first, without `.` and `..`.
    pub fn walk(&self, start: InodeNumber) -> Result<Vec<WalkEntry>> {
        let dir = self.read_inode(start)?;
        let mut out = Vec::new();
        self.walk_into(&dir, "", 1, &mut out)?;
        Ok(out)
    }

    fn walk_into(
        &self,
        dir: &Inode,
        prefix: &str,
        depth: usize,
        out: &mut Vec<WalkEntry>,
    ) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(FileSystemError::TooDeep {
                limit: self.options.max_depth,
            });
        }

        for entry in self.entries_of(dir)? {
            let entry = entry?;
            if entry.is_dot_or_dotdot() {
                continue;
            }

            let child = self.read_inode(entry.inode)?;
            let path = format!("{prefix}/{}", entry.name_lossy());
            let file_type = child.file_type();
            out.push(WalkEntry {
                path: path.clone(),
                entry,
                file_type,
                depth,
            });

            if child.is_dir() {
                self.walk_into(&child, &path, depth + 1, out)?;
            }
        }
        Ok(())
    }

    fn entries_of(&self, dir: &Inode) -> Result<DirEntries<'_, B>> {
        if !dir.is_dir() {
            return Err(FileSystemError::NotADirectory(format!(
                "inode {}",
                dir.number
            )));
        }
        let block = dir.first_block().ok_or_else(|| FileSystemError::CorruptInode {
            inode: dir.number,
            reason: "directory has no data block".to_string(),
        })?;

        Ok(DirEntries::new(
            &self.image,
            self.geometry.dir_scheme,
            self.geometry.block_address(block),
            self.geometry.block_size,
            dir.size,
        ))
    }

    fn require_ext2(&self) -> Result<()> {
        match self.options.format {
            Format::Ext2 => Ok(()),
            Format::Minix => Err(FileSystemError::InvalidGeometry(
                "minix has no block group descriptors".to_string(),
            )),
        }
    }
}

impl<B: AsRef<[u8]>> DirectoryTree for FilesystemView<B> {
    fn inode(&self, number: InodeNumber) -> Result<Inode> {
        self.read_inode(number)
    }

    fn find_entry(&self, dir: &Inode, name: &[u8]) -> Result<Option<DirectoryEntry>> {
        for entry in self.entries_of(dir)? {
            let entry = entry?;
            if entry.name == name {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}
