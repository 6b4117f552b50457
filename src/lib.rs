//! Read-only inspection of ext2 and minix filesystem images.
//!
//! ```ignore
//! use fsview::{FilesystemView, Format, Image};
//!
//! let view = FilesystemView::open(Image::new(bytes), Format::Minix)?;
//! let inode = view.resolve_path("/dir_a/dir_b/foobar.txt")?;
//! let data = view.read_file_data(inode)?;
//! ```

mod error;
pub mod fs;
pub mod image;
mod view;

pub use error::{FileSystemError, Result};
pub use fs::dentry::{DirScheme, DirectoryEntry};
pub use fs::dir::DirEntries;
pub use fs::ext2::GroupDescriptor;
pub use fs::geometry::{Geometry, InodeIndexing};
pub use fs::inode::Inode;
pub use fs::superblock::Superblock;
pub use fs::{FileType, Format, InodeNumber};
pub use image::Image;
pub use view::{FilesystemView, ViewOptions, WalkEntry};
