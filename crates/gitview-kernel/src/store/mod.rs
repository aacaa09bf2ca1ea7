//! Object store seam — the read-only view of a repository the builder needs.
//!
//! The builder never touches git2 directly. Everything it needs from a
//! repository goes through [`ObjectStore`]:
//!
//! - resolve a revision, or a set of refs, to root trees
//! - enumerate one tree's direct entries
//! - size and open a blob
//!
//! Two implementations ship here:
//!
//! - **GitStore**: a libgit2 repository on disk
//! - **MemoryStore**: an in-memory object graph (tests, synthetic trees)

mod git;
mod memory;

pub use git::GitStore;
pub use memory::{MemoryEntry, MemoryStore};

use std::io::Read;

use git2::Oid;
use thiserror::Error;

/// Result type for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A readable stream over one blob's content. Dropping it releases the handle.
pub type ContentReader = Box<dyn Read + Send>;

/// Object store errors. All of them are unexpected from the projection's
/// point of view: the tree told us the object exists.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
    #[error("corrupt object: {0}")]
    Corrupt(String),
    #[error("failed to acquire repository lock")]
    Lock,
}

/// The type of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Tree,
    Blob,
    /// A submodule commit (gitlink). Not part of this repository's graph.
    Commit,
    Other,
}

/// One entry of a tree object, exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Name bytes. Git does not require UTF-8.
    pub name: Vec<u8>,
    /// Raw git mode (e.g. `0o100644`).
    pub mode: u32,
    pub id: Oid,
    pub kind: ObjectKind,
}

/// Read-only access to a repository's object graph.
///
/// Implementations must be safe for concurrent independent calls. None of
/// these methods may mutate repository state.
pub trait ObjectStore: Send + Sync {
    /// Resolve a revision (commit-ish or tree-ish) to a tree id.
    fn resolve_root(&self, spec: &str) -> StoreResult<Oid>;

    /// Resolve a ref name or glob to `(full ref name, tree id)` pairs.
    ///
    /// Refs that do not peel to a tree are left out.
    fn resolve_refs(&self, pattern: &str) -> StoreResult<Vec<(String, Oid)>>;

    /// List the direct entries of a tree.
    fn tree_entries(&self, tree: Oid) -> StoreResult<Vec<RawEntry>>;

    /// Size of a blob in bytes, without reading its content.
    fn blob_size(&self, blob: Oid) -> StoreResult<u64>;

    /// Open a fresh stream over a blob's content.
    fn open_blob(&self, blob: Oid) -> StoreResult<ContentReader>;

    /// Human-readable identity of the backing repository.
    fn describe(&self) -> String;
}
