//! Fixed-slot minix directory records.

use crate::error::Result;
use crate::fs::dentry::DirectoryEntry;
use crate::image::{FieldReader, Image};

/// Width of the inode number in front of the name field.
pub const DIR_INODE_FIELD_LEN: u32 = 2;

/// Decodes the slot at `offset` of the zone at `block_address`.
///
/// The name field is null-padded; a name filling the whole field has no
/// terminator.
pub fn decode_entry<B: AsRef<[u8]>>(
    image: &Image<B>,
    block_address: u64,
    name_len: u32,
    offset: u64,
) -> Result<(DirectoryEntry, u64)> {
    let slot_size = DIR_INODE_FIELD_LEN + name_len;
    let slot = image.read_exact(block_address + offset, u64::from(slot_size))?;

    let inode = FieldReader::new(slot).u16_at(0)?;
    let field = &slot[DIR_INODE_FIELD_LEN as usize..];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());

    let entry = DirectoryEntry {
        inode: u32::from(inode),
        rec_len: slot_size as u16,
        name: field[..end].to_vec(),
        file_type: None,
    };
    Ok((entry, offset + u64::from(slot_size)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileSystemError;

    #[test]
    fn test_padded_name() {
        let mut raw = vec![0u8; 64];
        raw[16..18].copy_from_slice(&7u16.to_le_bytes());
        raw[18..23].copy_from_slice(b"dir_a");
        let (entry, next) = decode_entry(&Image::new(raw), 0, 14, 16).unwrap();
        assert_eq!(entry.inode, 7);
        assert_eq!(entry.name, b"dir_a");
        assert_eq!(entry.rec_len, 16);
        assert_eq!(next, 32);
    }

    #[test]
    fn test_full_width_name_is_not_overrun() {
        let mut raw = vec![0xFFu8; 40];
        raw[0..2].copy_from_slice(&3u16.to_le_bytes());
        raw[2..16].copy_from_slice(b"fourteen_chars");
        let (entry, _) = decode_entry(&Image::new(raw), 0, 14, 0).unwrap();
        assert_eq!(entry.name, b"fourteen_chars");
    }

    #[test]
    fn test_slot_past_end() {
        let image = Image::new(vec![0u8; 20]);
        assert!(matches!(
            decode_entry(&image, 0, 14, 16),
            Err(FileSystemError::OutOfBounds { .. })
        ));
    }
}
