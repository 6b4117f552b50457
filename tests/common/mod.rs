//! Builders for small synthetic ext2 and minix images.
#![allow(dead_code)]

use fsview::InodeIndexing;
use std::collections::BTreeMap;

pub const BLOCK: usize = 1024;
pub const IMAGE_BLOCKS: usize = 64;
pub const INODES: u32 = 32;

/// Inode table of the built ext2 image starts at this block.
pub const EXT2_INODE_TABLE_BLOCK: usize = 5;
pub const EXT2_INODE_SIZE: usize = 128;

pub enum Node {
    Dir(Vec<(String, Node)>),
    File(Vec<u8>),
}

impl Node {
    fn is_dir(&self) -> bool {
        matches!(self, Node::Dir(_))
    }
}

pub fn dir(children: Vec<(&str, Node)>) -> Node {
    Node::Dir(
        children
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect(),
    )
}

pub fn file(data: &[u8]) -> Node {
    Node::File(data.to_vec())
}

/// The layout the path tests expect.
pub fn sample_tree() -> Node {
    dir(vec![
        (
            "dir_a",
            dir(vec![(
                "dir_b",
                dir(vec![("foobar.txt", file(b"hello from foobar\n"))]),
            )]),
        ),
        ("dir_A", dir(vec![("dir_B", dir(vec![]))])),
        ("test.txt", file(b"test\n")),
        ("dir", dir(vec![])),
    ])
}

pub struct BuiltImage {
    pub bytes: Vec<u8>,
    /// Absolute path → inode number.
    pub inodes: BTreeMap<String, u32>,
    /// Absolute path → data block (or zone).
    pub blocks: BTreeMap<String, u32>,
    /// Byte address of the inode table.
    pub inode_table: usize,
    pub inode_size: usize,
    /// Slot layout the inode table was written with.
    pub indexing: InodeIndexing,
}

impl BuiltImage {
    pub fn ino(&self, path: &str) -> u32 {
        self.inodes[path]
    }

    pub fn block_offset(&self, path: &str) -> usize {
        self.blocks[path] as usize * BLOCK
    }

    /// Byte offset of an inode's record under the image's own indexing.
    pub fn inode_offset(&self, ino: u32) -> usize {
        let slot = self.indexing.index(ino).unwrap();
        self.inode_table + slot as usize * self.inode_size
    }
}

enum Kind {
    Dir(Vec<(String, u32, bool)>),
    File(Vec<u8>),
}

struct Flat {
    path: String,
    ino: u32,
    block: u32,
    kind: Kind,
}

fn flatten(
    node: &Node,
    path: String,
    ino: u32,
    parent: u32,
    next_ino: &mut u32,
    next_block: &mut u32,
    out: &mut Vec<Flat>,
) {
    let block = *next_block;
    *next_block += 1;

    match node {
        Node::File(data) => out.push(Flat {
            path,
            ino,
            block,
            kind: Kind::File(data.clone()),
        }),
        Node::Dir(children) => {
            let mut entries = vec![(".".to_string(), ino, true), ("..".to_string(), parent, true)];
            let mut pending = Vec::new();
            for (name, child) in children {
                let child_ino = *next_ino;
                *next_ino += 1;
                entries.push((name.clone(), child_ino, child.is_dir()));
                pending.push((name, child, child_ino));
            }
            out.push(Flat {
                path: path.clone(),
                ino,
                block,
                kind: Kind::Dir(entries),
            });
            for (name, child, child_ino) in pending {
                let child_path = if path == "/" {
                    format!("/{name}")
                } else {
                    format!("{path}/{name}")
                };
                flatten(child, child_path, child_ino, ino, next_ino, next_block, out);
            }
        }
    }
}

pub fn put_u8(raw: &mut [u8], at: usize, v: u8) {
    raw[at] = v;
}

pub fn put_u16(raw: &mut [u8], at: usize, v: u16) {
    raw[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

pub fn put_u32(raw: &mut [u8], at: usize, v: u32) {
    raw[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

fn index(flat: &[Flat]) -> (BTreeMap<String, u32>, BTreeMap<String, u32>) {
    let inodes = flat.iter().map(|f| (f.path.clone(), f.ino)).collect();
    let blocks = flat.iter().map(|f| (f.path.clone(), f.block)).collect();
    (inodes, blocks)
}

/// ext2 image whose inode table is addressed by raw inode id.
pub fn build_ext2(root: &Node) -> BuiltImage {
    build_ext2_with(root, InodeIndexing::ZeroBased)
}

/// One-group ext2 image with 1 KiB blocks: superblock in block 1, descriptor
/// table in block 2, bitmaps in 3 and 4, inode table in 5..9, data from 9.
/// Inodes are placed in the table according to `indexing`.
pub fn build_ext2_with(root: &Node, indexing: InodeIndexing) -> BuiltImage {
    let mut raw = vec![0u8; IMAGE_BLOCKS * BLOCK];
    let mut flat = Vec::new();
    let (mut next_ino, mut next_block) = (11, 9);
    flatten(root, "/".to_string(), 2, 2, &mut next_ino, &mut next_block, &mut flat);
    assert!(next_ino <= INODES && next_block as usize <= IMAGE_BLOCKS);

    let sb = BLOCK;
    put_u32(&mut raw, sb, INODES);
    put_u32(&mut raw, sb + 4, IMAGE_BLOCKS as u32);
    put_u32(&mut raw, sb + 12, IMAGE_BLOCKS as u32 - next_block);
    put_u32(&mut raw, sb + 16, INODES + 1 - next_ino);
    put_u32(&mut raw, sb + 20, 1);
    put_u32(&mut raw, sb + 32, 8192);
    put_u32(&mut raw, sb + 36, 8192);
    put_u32(&mut raw, sb + 40, INODES);
    put_u16(&mut raw, sb + 56, 0xEF53);
    put_u16(&mut raw, sb + 58, 1);
    put_u32(&mut raw, sb + 76, 1);
    put_u32(&mut raw, sb + 84, 11);
    put_u16(&mut raw, sb + 88, EXT2_INODE_SIZE as u16);
    put_u32(&mut raw, sb + 96, 0x0002);
    raw[sb + 120..sb + 126].copy_from_slice(b"sample");

    let dirs = flat.iter().filter(|f| matches!(f.kind, Kind::Dir(_))).count();
    let gdt = 2 * BLOCK;
    put_u32(&mut raw, gdt, 3);
    put_u32(&mut raw, gdt + 4, 4);
    put_u32(&mut raw, gdt + 8, EXT2_INODE_TABLE_BLOCK as u32);
    put_u16(&mut raw, gdt + 12, (IMAGE_BLOCKS as u32 - next_block) as u16);
    put_u16(&mut raw, gdt + 14, (INODES + 1 - next_ino) as u16);
    put_u16(&mut raw, gdt + 16, dirs as u16);

    let table = EXT2_INODE_TABLE_BLOCK * BLOCK;
    for f in &flat {
        let at = table + indexing.index(f.ino).unwrap() as usize * EXT2_INODE_SIZE;
        let block_at = f.block as usize * BLOCK;
        match &f.kind {
            Kind::Dir(entries) => {
                put_u16(&mut raw, at, 0o040755);
                put_u32(&mut raw, at + 4, BLOCK as u32);
                put_u16(&mut raw, at + 26, 2);

                let mut off = 0;
                for (i, (name, ino, is_dir)) in entries.iter().enumerate() {
                    let rec_len = if i + 1 == entries.len() {
                        BLOCK - off
                    } else {
                        align4(8 + name.len())
                    };
                    put_u32(&mut raw, block_at + off, *ino);
                    put_u16(&mut raw, block_at + off + 4, rec_len as u16);
                    put_u8(&mut raw, block_at + off + 6, name.len() as u8);
                    put_u8(&mut raw, block_at + off + 7, if *is_dir { 2 } else { 1 });
                    raw[block_at + off + 8..block_at + off + 8 + name.len()]
                        .copy_from_slice(name.as_bytes());
                    off += rec_len;
                }
            }
            Kind::File(data) => {
                put_u16(&mut raw, at, 0o100644);
                put_u32(&mut raw, at + 4, data.len() as u32);
                put_u16(&mut raw, at + 26, 1);
                raw[block_at..block_at + data.len()].copy_from_slice(data);
            }
        }
        put_u32(&mut raw, at + 8, 1_000);
        put_u32(&mut raw, at + 12, 2_000);
        put_u32(&mut raw, at + 16, 3_000);
        put_u32(&mut raw, at + 40, f.block);
    }

    let (inodes, blocks) = index(&flat);
    BuiltImage {
        bytes: raw,
        inodes,
        blocks,
        inode_table: table,
        inode_size: EXT2_INODE_SIZE,
        indexing,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinixFlavor {
    V1,
    V2,
}

/// minix image: superblock in block 1, one inode map and one zone map block,
/// the inode table, then data zones.
pub fn build_minix(root: &Node, flavor: MinixFlavor, name_len: usize) -> BuiltImage {
    let inode_size = match flavor {
        MinixFlavor::V1 => 32,
        MinixFlavor::V2 => 64,
    };
    let table_blocks = (INODES as usize * inode_size).div_ceil(BLOCK);
    let first_data_zone = 4 + table_blocks;

    let mut raw = vec![0u8; IMAGE_BLOCKS * BLOCK];
    let mut flat = Vec::new();
    let (mut next_ino, mut next_block) = (2, first_data_zone as u32);
    flatten(root, "/".to_string(), 1, 1, &mut next_ino, &mut next_block, &mut flat);
    assert!(next_ino <= INODES + 1 && next_block as usize <= IMAGE_BLOCKS);

    let magic = match (flavor, name_len) {
        (MinixFlavor::V1, 14) => 0x137F,
        (MinixFlavor::V1, 30) => 0x138F,
        (MinixFlavor::V2, 14) => 0x2468,
        (MinixFlavor::V2, 30) => 0x2478,
        _ => panic!("unsupported minix name length {name_len}"),
    };

    let sb = BLOCK;
    put_u16(&mut raw, sb, INODES as u16);
    put_u16(&mut raw, sb + 2, IMAGE_BLOCKS as u16);
    put_u16(&mut raw, sb + 4, 1);
    put_u16(&mut raw, sb + 6, 1);
    put_u16(&mut raw, sb + 8, first_data_zone as u16);
    put_u32(&mut raw, sb + 12, 0x1000_0000);
    put_u16(&mut raw, sb + 16, magic);
    put_u16(&mut raw, sb + 18, 1);
    put_u32(&mut raw, sb + 20, IMAGE_BLOCKS as u32);

    let table = 4 * BLOCK;
    let slot = 2 + name_len;
    for f in &flat {
        let at = table + (f.ino as usize - 1) * inode_size;
        let block_at = f.block as usize * BLOCK;
        let (mode, size, links) = match &f.kind {
            Kind::Dir(entries) => {
                for (i, (name, ino, _)) in entries.iter().enumerate() {
                    let off = block_at + i * slot;
                    put_u16(&mut raw, off, *ino as u16);
                    raw[off + 2..off + 2 + name.len()].copy_from_slice(name.as_bytes());
                }
                (0o040755u16, (entries.len() * slot) as u32, 2u16)
            }
            Kind::File(data) => {
                raw[block_at..block_at + data.len()].copy_from_slice(data);
                (0o100644u16, data.len() as u32, 1u16)
            }
        };

        match flavor {
            MinixFlavor::V1 => {
                put_u16(&mut raw, at, mode);
                put_u32(&mut raw, at + 4, size);
                put_u32(&mut raw, at + 8, 4_000);
                put_u8(&mut raw, at + 13, links as u8);
                put_u16(&mut raw, at + 14, f.block as u16);
            }
            MinixFlavor::V2 => {
                put_u16(&mut raw, at, mode);
                put_u16(&mut raw, at + 2, links);
                put_u32(&mut raw, at + 8, size);
                put_u32(&mut raw, at + 12, 1_000);
                put_u32(&mut raw, at + 16, 2_000);
                put_u32(&mut raw, at + 20, 3_000);
                put_u32(&mut raw, at + 24, f.block);
            }
        }
    }

    let (inodes, blocks) = index(&flat);
    BuiltImage {
        bytes: raw,
        inodes,
        blocks,
        inode_table: table,
        inode_size,
        indexing: InodeIndexing::OneBased,
    }
}

/// Routes the crate's tracing output to the test harness. `RUST_LOG` selects
/// the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
