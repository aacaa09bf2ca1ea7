//! Tree model: the contract every backing store satisfies.
//!
//! A [`Node`] is a directory, a file, or explicitly neither. Nodes have no
//! identity beyond the path that produced them and are cheap to discard.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use gitview_types::{FileMode, FsResult};

pub use crate::store::ContentReader;

/// Children of a directory, keyed by name.
pub type Children = BTreeMap<String, Node>;

/// Directory capability.
pub trait DirNode: Send + Sync {
    /// Direct children. Recomputed on every call; grandchildren are not resolved.
    fn children(&self) -> FsResult<Children>;
}

/// File capability.
pub trait FileNode: Send + Sync {
    /// The repository mode of this file.
    fn mode(&self) -> FileMode;

    /// Content length in bytes.
    fn size(&self) -> FsResult<u64>;

    /// Open a fresh content stream.
    fn open(&self) -> FsResult<ContentReader>;
}

/// A resolved tree node.
#[derive(Clone)]
pub enum Node {
    Directory(Arc<dyn DirNode>),
    File(Arc<dyn FileNode>),
    /// Something a backing store produced but cannot expose. Skipped, never fatal.
    Unsupported(String),
}

impl Node {
    pub fn directory(dir: impl DirNode + 'static) -> Self {
        Node::Directory(Arc::new(dir))
    }

    pub fn file(file: impl FileNode + 'static) -> Self {
        Node::File(Arc::new(file))
    }

    pub fn as_dir(&self) -> Option<&Arc<dyn DirNode>> {
        match self {
            Node::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&Arc<dyn FileNode>> {
        match self {
            Node::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Directory(_) => f.write_str("Directory"),
            Node::File(file) => write!(f, "File({})", file.mode()),
            Node::Unsupported(what) => write!(f, "Unsupported({})", what),
        }
    }
}

/// A directory with a fixed set of children, for synthetic trees.
#[derive(Clone, Default)]
pub struct StaticDir {
    children: Children,
}

impl StaticDir {
    pub fn new(children: Children) -> Self {
        Self { children }
    }
}

impl DirNode for StaticDir {
    fn children(&self) -> FsResult<Children> {
        Ok(self.children.clone())
    }
}
