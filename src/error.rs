use thiserror::Error;

/// Errors raised while decoding or walking a filesystem image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileSystemError {
    #[error("Read of {length} bytes at offset {offset} exceeds image size {image_len}")]
    OutOfBounds {
        offset: u64,
        length: u64,
        image_len: u64,
    },

    #[error("Truncated record at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: u64,
        needed: usize,
        available: u64,
    },

    #[error("Bad magic: expected {expected}, found {found:#06x}")]
    BadMagic { expected: &'static str, found: u16 },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Block group {index} does not exist ({count} groups)")]
    InvalidGroup { index: u32, count: u32 },

    #[error("Block group {0} has no bitmap or inode table")]
    UnusableGroup(u32),

    #[error("Invalid inode number {0}")]
    InvalidInode(u32),

    #[error("Corrupted inode {inode}: {reason}")]
    CorruptInode { inode: u32, reason: String },

    #[error("Inode {inode} holds {size} bytes, more than one {block_size}-byte block")]
    MultiBlockFile {
        inode: u32,
        size: u64,
        block_size: u32,
    },

    #[error("Corrupted directory entry at offset {offset}: {reason}")]
    CorruptDirectory { offset: u64, reason: String },

    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Path exceeds the maximum depth of {limit} components")]
    TooDeep { limit: usize },
}

impl FileSystemError {
    /// True for the lookup miss a caller is expected to handle, as opposed to
    /// a structural problem with the image.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileSystemError::NotFound(_))
    }

    pub(crate) fn corrupt_dir(offset: u64, reason: impl Into<String>) -> Self {
        FileSystemError::CorruptDirectory {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;
