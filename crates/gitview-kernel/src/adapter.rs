//! Filesystem adapter: the calls a transport needs, in tree-model terms.
//!
//! Paths are slash-separated and relative to the projection root; the empty
//! path is the root. Matching is exact: no normalization, no case folding,
//! no partial matches. Callers that receive mount-style paths normalize them
//! first (see [`crate::vfs`]).

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use gitview_types::{Attr, DirEntry, FileMode, FsError, FsResult, translate_mode};

use crate::builder::{RootSpec, TreeBuilder};
use crate::diag::Diagnostics;
use crate::store::ObjectStore;
use crate::tree::{ContentReader, Node};

/// A read-only filesystem view over one tree root.
pub struct ProjectionFs {
    root: Node,
    diagnostics: Diagnostics,
    name: String,
}

impl ProjectionFs {
    /// Wrap an already built root.
    pub fn new(root: Node, diagnostics: Diagnostics, name: impl Into<String>) -> Self {
        Self {
            root,
            diagnostics,
            name: name.into(),
        }
    }

    /// Build the root from `store` and wrap it.
    ///
    /// Fails if `spec` does not resolve; nothing else about the repository is
    /// read until a path is asked for.
    pub fn open(
        store: Arc<dyn ObjectStore>,
        spec: &RootSpec,
        diagnostics: Diagnostics,
    ) -> FsResult<Self> {
        let name = format!("gitview:{}", store.describe());
        let root = TreeBuilder::new(store, diagnostics.clone())
            .build(spec)
            .inspect_err(|e| diagnostics.unexpected(format!("building root {}: {}", spec, e.describe())))?;
        Ok(Self::new(root, diagnostics, name))
    }

    /// Replace the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Human-readable identifier for display by the transport.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route diagnostics to `tracing` (true) or discard them (false).
    pub fn set_debug(&self, debug: bool) {
        self.diagnostics.set_verbose(debug);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Resolve a path to a node, one segment at a time.
    ///
    /// Descending through anything that is not a directory is `NotFound`.
    /// The first error is returned unchanged.
    pub fn resolve(&self, path: &str) -> FsResult<Node> {
        let result = self.resolve_inner(path);
        self.observe("resolve", path, result)
    }

    /// Attributes of the node at `path`.
    pub fn get_attributes(&self, path: &str) -> FsResult<Attr> {
        let result = self.get_attributes_inner(path);
        self.observe("getattr", path, result)
    }

    /// Entries of the directory at `path`, sorted by name.
    ///
    /// Children that cannot be translated are left out.
    pub fn list_directory(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let result = self.list_directory_inner(path);
        self.observe("readdir", path, result)
    }

    /// Open the file at `path` for reading.
    pub fn open_file(&self, path: &str) -> FsResult<FileHandle> {
        let result = self.open_file_inner(path);
        self.observe("open", path, result)
    }

    /// Target of the symlink at `path`, byte for byte.
    pub fn read_symlink(&self, path: &str) -> FsResult<PathBuf> {
        let result = self.read_symlink_inner(path);
        self.observe("readlink", path, result)
    }

    /// Record unexpected errors; expected ones are normal answers.
    fn observe<T>(&self, op: &str, path: &str, result: FsResult<T>) -> FsResult<T> {
        if let Err(e) = &result {
            if e.is_unexpected() {
                self.diagnostics
                    .unexpected(format!("{} {:?}: {}", op, path, e.describe()));
            }
        }
        result
    }

    fn resolve_inner(&self, path: &str) -> FsResult<Node> {
        let mut node = self.root.clone();
        if path.is_empty() {
            return Ok(node);
        }
        for segment in path.split('/') {
            let Node::Directory(dir) = &node else {
                return Err(FsError::not_found());
            };
            let mut children = dir.children()?;
            node = children.remove(segment).ok_or_else(FsError::not_found)?;
        }
        Ok(node)
    }

    fn get_attributes_inner(&self, path: &str) -> FsResult<Attr> {
        match self.resolve_inner(path)? {
            Node::Directory(_) => Ok(Attr::directory()),
            Node::File(file) => {
                let mode = file.mode();
                if translate_mode(mode).is_none() {
                    self.diagnostics
                        .skipped(format!("skipping {:?}: {} file", path, mode));
                    return Err(FsError::not_found());
                }
                let size = file.size()?;
                Attr::file(mode, size).ok_or_else(FsError::not_found)
            }
            Node::Unsupported(what) => {
                self.diagnostics
                    .skipped(format!("skipping node at {:?}: {}", path, what));
                Err(FsError::not_found())
            }
        }
    }

    fn list_directory_inner(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let Node::Directory(dir) = self.resolve_inner(path)? else {
            return Err(FsError::not_directory());
        };

        let children = dir.children()?;
        let mut entries = Vec::with_capacity(children.len());
        for (name, child) in children {
            match child {
                Node::Directory(_) => entries.push(DirEntry::directory(name)),
                Node::File(file) => match DirEntry::file(name.as_str(), file.mode()) {
                    Some(entry) => entries.push(entry),
                    None => self.diagnostics.skipped(format!(
                        "skipping file child {:?} of {:?}: {}",
                        name,
                        path,
                        file.mode()
                    )),
                },
                Node::Unsupported(what) => self
                    .diagnostics
                    .skipped(format!("skipping child {:?} of {:?}: {}", name, path, what)),
            }
        }
        Ok(entries)
    }

    fn open_file_inner(&self, path: &str) -> FsResult<FileHandle> {
        let Node::File(file) = self.resolve_inner(path)? else {
            return Err(FsError::invalid());
        };
        let mode = file.mode();
        let attr = match translate_mode(mode) {
            Some(_) => Attr::file(mode, file.size()?),
            None => None,
        };
        Ok(FileHandle {
            mode,
            attr,
            reader: file.open()?,
        })
    }

    fn read_symlink_inner(&self, path: &str) -> FsResult<PathBuf> {
        let Node::File(file) = self.resolve_inner(path)? else {
            return Err(FsError::invalid());
        };
        if !file.mode().is_symlink() {
            return Err(FsError::invalid());
        }

        let mut reader = file.open()?;
        let mut target = Vec::new();
        reader.read_to_end(&mut target).map_err(FsError::unexpected)?;
        target_path(target)
    }
}

#[cfg(unix)]
fn target_path(bytes: Vec<u8>) -> FsResult<PathBuf> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    Ok(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
fn target_path(bytes: Vec<u8>) -> FsResult<PathBuf> {
    String::from_utf8(bytes)
        .map(PathBuf::from)
        .map_err(FsError::unexpected)
}

impl std::fmt::Display for ProjectionFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl std::fmt::Debug for ProjectionFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionFs")
            .field("name", &self.name)
            .finish()
    }
}

/// An open file. The content stream is released when the handle is dropped.
pub struct FileHandle {
    mode: FileMode,
    attr: Option<Attr>,
    reader: ContentReader,
}

impl FileHandle {
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Attributes as of open. `None` when the mode has no filesystem analogue.
    pub fn attr(&self) -> Option<Attr> {
        self.attr
    }

    /// Read the rest of the content.
    pub fn read_all(mut self) -> FsResult<Vec<u8>> {
        let mut data = Vec::new();
        self.reader
            .read_to_end(&mut data)
            .map_err(FsError::unexpected)?;
        Ok(data)
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("mode", &self.mode)
            .field("attr", &self.attr)
            .finish_non_exhaustive()
    }
}
