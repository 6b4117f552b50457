//! Format-independent inode values and inode table addressing.

use super::geometry::InodeIndexing;
use super::{FileType, InodeNumber};
use crate::error::Result;
use crate::image::{Image, OnDisk};
use tracing::trace;

/// Metadata of one filesystem object, copied out of the inode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub number: InodeNumber,
    pub mode: u16,
    pub links_count: u16,
    pub uid: u16,
    pub gid: u16,
    pub size: u64,
    pub atime: u32,
    pub mtime: u32,
    pub ctime: u32,
    /// Deletion time; always 0 on minix.
    pub dtime: u32,
    /// Data block or zone pointers in on-disk order, direct ones first.
    pub blocks: Vec<u32>,
}

impl Inode {
    pub fn file_type(&self) -> FileType {
        FileType::from_mode(self.mode)
    }

    pub fn is_dir(&self) -> bool {
        self.file_type().is_dir()
    }

    /// Permission bits without the type.
    pub fn permissions(&self) -> u16 {
        self.mode & 0o7777
    }

    /// The only data pointer this crate follows. `None` when unset.
    pub fn first_block(&self) -> Option<u32> {
        self.blocks.first().copied().filter(|&b| b != 0)
    }
}

/// An on-disk inode layout that converts into an [`Inode`].
pub trait InodeRecord: OnDisk {
    fn into_inode(self, number: InodeNumber) -> Inode;
}

/// Byte address of `number`'s slot in a table starting at `table_base`.
pub fn inode_offset(
    table_base: u64,
    number: InodeNumber,
    record_size: u32,
    indexing: InodeIndexing,
) -> Result<u64> {
    let index = indexing.index(number)?;
    Ok(table_base + u64::from(index) * u64::from(record_size))
}

/// Reads inode `number` from the table at `table_base`.
///
/// `record_size` is the slot stride, which may exceed `R::SIZE` when the
/// format reserves space past the decoded fields.
pub fn read_inode<R: InodeRecord, B: AsRef<[u8]>>(
    image: &Image<B>,
    table_base: u64,
    number: InodeNumber,
    record_size: u32,
    indexing: InodeIndexing,
) -> Result<Inode> {
    let offset = inode_offset(table_base, number, record_size, indexing)?;
    trace!(inode = number, offset, "reading inode");
    let record: R = image.read_struct(offset)?;
    Ok(record.into_inode(number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileSystemError;
    use crate::image::FieldReader;

    struct Marker {
        mode: u16,
        tag: u8,
    }

    impl OnDisk for Marker {
        const SIZE: usize = 4;

        fn decode(bytes: &[u8]) -> Result<Self> {
            let mut r = FieldReader::new(bytes);
            Ok(Self {
                mode: r.u16_at(0)?,
                tag: r.u8_at(3)?,
            })
        }
    }

    impl InodeRecord for Marker {
        fn into_inode(self, number: InodeNumber) -> Inode {
            Inode {
                number,
                mode: self.mode,
                links_count: 1,
                uid: 0,
                gid: 0,
                size: u64::from(self.tag),
                atime: 0,
                mtime: 0,
                ctime: 0,
                dtime: 0,
                blocks: vec![u32::from(self.tag)],
            }
        }
    }

    #[test]
    fn test_inode_offset() {
        assert_eq!(
            inode_offset(4096, 1, 128, InodeIndexing::OneBased).unwrap(),
            4096
        );
        assert_eq!(
            inode_offset(4096, 3, 128, InodeIndexing::OneBased).unwrap(),
            4096 + 256
        );
        assert_eq!(
            inode_offset(4096, 3, 128, InodeIndexing::ZeroBased).unwrap(),
            4096 + 384
        );
        assert_eq!(
            inode_offset(4096, 0, 128, InodeIndexing::OneBased),
            Err(FileSystemError::InvalidInode(0))
        );
    }

    #[test]
    fn test_read_inode_hits_exact_slot() {
        let base = 64u64;
        let size = 16u32;
        let mut raw = vec![0u8; 256];
        for i in 1..=8u8 {
            let slot = base as usize + usize::from(i - 1) * size as usize;
            raw[slot + 3] = i;
        }
        let image = Image::new(raw);

        for i in 1..=8u32 {
            let inode =
                read_inode::<Marker, _>(&image, base, i, size, InodeIndexing::OneBased).unwrap();
            assert_eq!(inode.number, i);
            assert_eq!(inode.size, u64::from(i));
        }
    }

    #[test]
    fn test_inode_helpers() {
        let inode = Marker { mode: 0o040755, tag: 0 }.into_inode(2);
        assert!(inode.is_dir());
        assert_eq!(inode.permissions(), 0o755);
        assert_eq!(inode.first_block(), None);

        let inode = Marker { mode: 0o100644, tag: 9 }.into_inode(12);
        assert_eq!(inode.file_type(), FileType::Regular);
        assert_eq!(inode.first_block(), Some(9));
    }
}
