//! Lazy enumeration of one directory block.

use super::dentry::{DirScheme, DirectoryEntry, decode_entry};
use crate::error::Result;
use crate::image::Image;
use std::iter::FusedIterator;
use tracing::trace;

/// Entries of a directory's first data block, in on-disk order.
///
/// Never reads past `block_size` bytes from the block start. Stops at the
/// end of the block, when a fixed-slot directory's expected count runs out,
/// or at a fixed-slot entry with inode 0. Self-describing records with inode
/// 0 are unused space and are stepped over. After an error the iterator is
/// exhausted.
#[derive(Debug)]
pub struct DirEntries<'a, B> {
    image: &'a Image<B>,
    scheme: DirScheme,
    block_address: u64,
    block_size: u32,
    offset: u64,
    remaining_slots: u64,
    done: bool,
}

impl<'a, B: AsRef<[u8]>> DirEntries<'a, B> {
    /// `dir_size` is the directory inode's size; fixed-slot directories hold
    /// `min(dir_size, block_size) / slot_size` entries.
    ///
    /// Self-describing records whose inode is 0 are not yielded: their
    /// `rec_len` still advances the walk, so the yielded records cover the
    /// block only when there are no unused records. Deleted entries are
    /// folded into the previous record's `rec_len` by ext2, so a live
    /// directory normally has at most one such record, at the block start.
    pub fn new(
        image: &'a Image<B>,
        scheme: DirScheme,
        block_address: u64,
        block_size: u32,
        dir_size: u64,
    ) -> Self {
        let remaining_slots = match scheme.slot_size() {
            Some(slot) => dir_size.min(u64::from(block_size)) / u64::from(slot),
            None => 0,
        };
        Self {
            image,
            scheme,
            block_address,
            block_size,
            offset: 0,
            remaining_slots,
            done: false,
        }
    }

    fn decode_next(&mut self) -> Option<Result<DirectoryEntry>> {
        loop {
            match self.scheme {
                DirScheme::SelfDescribing => {
                    if self.offset >= u64::from(self.block_size) {
                        return None;
                    }
                }
                DirScheme::FixedSlot { .. } => {
                    if self.remaining_slots == 0 {
                        return None;
                    }
                    self.remaining_slots -= 1;
                }
            }

            let (entry, next) = match decode_entry(
                self.image,
                self.scheme,
                self.block_address,
                self.block_size,
                self.offset,
            ) {
                Ok(decoded) => decoded,
                Err(e) => return Some(Err(e)),
            };

            if entry.inode == 0 {
                match self.scheme {
                    DirScheme::FixedSlot { .. } => return None,
                    DirScheme::SelfDescribing => {
                        trace!(offset = self.offset, "skipping unused directory record");
                        self.offset = next;
                        continue;
                    }
                }
            }

            trace!(
                offset = self.offset,
                inode = entry.inode,
                name = %entry.name_lossy(),
                "directory entry"
            );
            self.offset = next;
            return Some(Ok(entry));
        }
    }
}

impl<B: AsRef<[u8]>> Iterator for DirEntries<'_, B> {
    type Item = Result<DirectoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.decode_next();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<B: AsRef<[u8]>> FusedIterator for DirEntries<'_, B> {}
