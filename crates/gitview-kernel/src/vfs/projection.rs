//! `Filesystem` over a [`ProjectionFs`].

use async_trait::async_trait;
use gitview_types::{Attr, DirEntry, FileKind, FsError, FsResult};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::traits::Filesystem;
use crate::adapter::ProjectionFs;

/// Symlink hops `stat` follows before giving up.
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Async, mount-path view of a projection.
///
/// Every call is independent: it normalizes its own path and resolves from
/// the root on a blocking thread.
#[derive(Debug, Clone)]
pub struct ProjectionVfs {
    fs: Arc<ProjectionFs>,
}

impl ProjectionVfs {
    pub fn new(fs: Arc<ProjectionFs>) -> Self {
        Self { fs }
    }

    pub fn projection(&self) -> &Arc<ProjectionFs> {
        &self.fs
    }

    /// Normalize a mount-style path: strip `/`, skip `.`, pop on `..`.
    ///
    /// `..` never climbs above the root.
    fn normalize(path: &Path) -> io::Result<String> {
        let mut parts: Vec<&str> = Vec::new();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    parts.pop();
                }
                Component::Normal(s) => {
                    let s = s.to_str().ok_or_else(|| {
                        io::Error::new(io::ErrorKind::NotFound, "path is not UTF-8")
                    })?;
                    parts.push(s);
                }
            }
        }
        Ok(parts.join("/"))
    }

    /// Run `op` on the blocking pool.
    async fn blocking<T, F>(&self, path: &Path, op: F) -> io::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ProjectionFs, &str) -> FsResult<T> + Send + 'static,
    {
        let path = Self::normalize(path)?;
        let fs = self.fs.clone();
        tokio::task::spawn_blocking(move || op(&fs, &path))
            .await
            .map_err(io::Error::other)?
            .map_err(io::Error::from)
    }
}

/// Resolve a relative symlink target against the link's directory.
///
/// Returns `None` for empty or absolute targets and targets that leave the
/// projection.
fn resolve_link(link: &str, target: &Path) -> Option<String> {
    if target.as_os_str().is_empty() {
        return None;
    }
    let mut parts: Vec<&str> = link.split('/').collect();
    parts.pop();
    for component in target.components() {
        match component {
            Component::Normal(s) => parts.push(s.to_str()?),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

fn follow(fs: &ProjectionFs, path: &str) -> FsResult<Attr> {
    let mut current = path.to_string();
    for _ in 0..MAX_SYMLINK_HOPS {
        let attr = fs.get_attributes(&current)?;
        if attr.kind != FileKind::Symlink {
            return Ok(attr);
        }
        let target = fs.read_symlink(&current)?;
        current = resolve_link(&current, &target).ok_or_else(FsError::not_found)?;
    }
    Err(FsError::not_found())
}

#[async_trait]
impl Filesystem for ProjectionVfs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.blocking(path, |fs, path| fs.open_file(path)?.read_all())
            .await
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.blocking(path, |fs, path| fs.list_directory(path)).await
    }

    async fn stat(&self, path: &Path) -> io::Result<Attr> {
        self.blocking(path, follow).await
    }

    fn read_only(&self) -> bool {
        true
    }

    async fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.blocking(path, |fs, path| fs.read_symlink(path)).await
    }

    async fn lstat(&self, path: &Path) -> io::Result<Attr> {
        self.blocking(path, |fs, path| fs.get_attributes(path)).await
    }
}
