//! Core VFS trait.

use async_trait::async_trait;
use gitview_types::{Attr, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

/// Abstract read-only filesystem interface.
///
/// All operations use paths relative to the filesystem root. A leading `/`
/// is accepted and ignored.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Read the entire contents of a file.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// List entries in a directory.
    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Get attributes, following symlinks.
    async fn stat(&self, path: &Path) -> io::Result<Attr>;

    /// Returns true if this filesystem is read-only.
    fn read_only(&self) -> bool;

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool {
        self.stat(path).await.is_ok()
    }

    /// Read the target of a symbolic link without following it.
    async fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Get attributes without following symlinks.
    async fn lstat(&self, path: &Path) -> io::Result<Attr>;
}
