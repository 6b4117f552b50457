//! Path resolution by recursive descent over directory entries.

use super::InodeNumber;
use super::dentry::DirectoryEntry;
use super::inode::Inode;
use crate::error::{FileSystemError, Result};
use tracing::debug;

/// Default bound on the number of components a path may descend through.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Directory access the resolver walks over.
pub trait DirectoryTree {
    fn inode(&self, number: InodeNumber) -> Result<Inode>;

    /// First entry of `dir` whose name equals `name` byte for byte.
    fn find_entry(&self, dir: &Inode, name: &[u8]) -> Result<Option<DirectoryEntry>>;
}

/// Splits `path` on `/`. The empty component in front of an absolute path is
/// dropped; a trailing empty component (trailing slash) is kept.
pub fn split_path(path: &str) -> Vec<&str> {
    let mut components: Vec<&str> = path.split('/').collect();
    if path.starts_with('/') {
        components.remove(0);
    }
    components
}

/// Resolves `components` starting at directory `start`.
///
/// Names must match exactly. A non-directory may only be the last
/// component; a trailing slash is accepted after a directory only.
pub fn resolve<T: DirectoryTree + ?Sized>(
    tree: &T,
    start: InodeNumber,
    components: &[&str],
    max_depth: usize,
) -> Result<InodeNumber> {
    let depth = match components.last() {
        Some(last) if last.is_empty() => components.len() - 1,
        _ => components.len(),
    };
    if depth > max_depth {
        return Err(FileSystemError::TooDeep { limit: max_depth });
    }

    let dir = tree.inode(start)?;
    if depth > 0 && !dir.is_dir() {
        return Err(FileSystemError::NotADirectory("/".to_string()));
    }
    descend(tree, dir, components, 0)
}

fn descend<T: DirectoryTree + ?Sized>(
    tree: &T,
    dir: Inode,
    components: &[&str],
    index: usize,
) -> Result<InodeNumber> {
    let Some(&name) = components.get(index) else {
        return Ok(dir.number);
    };
    if name.is_empty() && index + 1 == components.len() {
        return Ok(dir.number);
    }

    let entry = tree
        .find_entry(&dir, name.as_bytes())?
        .ok_or_else(|| FileSystemError::NotFound(display_prefix(components, index)))?;
    let child = tree.inode(entry.inode)?;
    debug!(component = name, inode = child.number, "resolved path component");

    let rest = index + 1;
    if child.is_dir() {
        descend(tree, child, components, rest)
    } else if rest == components.len() {
        Ok(child.number)
    } else {
        Err(FileSystemError::NotADirectory(display_prefix(components, index)))
    }
}

fn display_prefix(components: &[&str], index: usize) -> String {
    format!("/{}", components[..=index].join("/"))
}
