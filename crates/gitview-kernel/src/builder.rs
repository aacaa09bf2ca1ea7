//! Repository tree builder.
//!
//! Turns a root specifier into a [`Node`] whose directories read the
//! repository one level at a time:
//!
//! ```text
//! RootSpec::Revision("HEAD")          RootSpec::Refs(["refs/heads/*"])
//!
//! /                                   /
//! ├── docs/        (tree, lazy)       └── refs/           (static)
//! │   └── readme.txt                      └── heads/      (static)
//! └── run.sh       (blob)                     ├── main/   (tree, lazy)
//!                                             └── dev/    (tree, lazy)
//! ```
//!
//! Ref tips are pinned to tree ids when the root is built, so one session
//! never sees a branch move underneath it.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use git2::Oid;
use gitview_types::{FileMode, FsError, FsResult};

use crate::diag::Diagnostics;
use crate::store::{ContentReader, ObjectKind, ObjectStore, RawEntry};
use crate::tree::{Children, DirNode, FileNode, Node, StaticDir};

/// What the projection is rooted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSpec {
    /// A single commit-ish or tree-ish, e.g. `HEAD`, `v1.0`, a hex id.
    Revision(String),
    /// A set of ref names or globs, exposed as nested top-level directories.
    Refs(Vec<String>),
}

impl Default for RootSpec {
    fn default() -> Self {
        RootSpec::Revision("HEAD".to_string())
    }
}

impl std::fmt::Display for RootSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootSpec::Revision(rev) => write!(f, "{}", rev),
            RootSpec::Refs(patterns) => write!(f, "refs[{}]", patterns.join(", ")),
        }
    }
}

/// Builds root nodes over one object store.
pub struct TreeBuilder {
    store: Arc<dyn ObjectStore>,
    diagnostics: Diagnostics,
}

impl TreeBuilder {
    pub fn new(store: Arc<dyn ObjectStore>, diagnostics: Diagnostics) -> Self {
        Self { store, diagnostics }
    }

    /// Resolve `spec` and return the root directory.
    ///
    /// This is the only fatal failure point: if the root cannot be resolved
    /// the projection cannot exist.
    pub fn build(&self, spec: &RootSpec) -> FsResult<Node> {
        match spec {
            RootSpec::Revision(rev) => {
                let tree = self.store.resolve_root(rev).map_err(FsError::unexpected)?;
                tracing::debug!("rooting projection at {} (tree {})", rev, tree);
                Ok(self.tree_node(tree))
            }
            RootSpec::Refs(patterns) => {
                let mut pinned = BTreeMap::new();
                for pattern in patterns {
                    let refs = self.store.resolve_refs(pattern).map_err(FsError::unexpected)?;
                    pinned.extend(refs);
                }
                if pinned.is_empty() {
                    return Err(FsError::unexpected(format!(
                        "no refs matched {}",
                        patterns.join(", ")
                    )));
                }
                tracing::debug!("rooting projection at {} refs", pinned.len());
                Ok(self.ref_namespace(pinned))
            }
        }
    }

    fn tree_node(&self, tree: Oid) -> Node {
        Node::directory(TreeDir {
            store: self.store.clone(),
            diagnostics: self.diagnostics.clone(),
            tree,
        })
    }

    /// Lay pinned refs out as nested directories, split on `/`.
    fn ref_namespace(&self, pinned: BTreeMap<String, Oid>) -> Node {
        let mut root = Namespace::default();
        for (name, tree) in pinned {
            if !root.insert(&name, tree) {
                self.diagnostics
                    .skipped(format!("ref {} conflicts with another ref, skipping", name));
            }
        }
        self.namespace_node(root)
    }

    fn namespace_node(&self, namespace: Namespace) -> Node {
        let children = namespace
            .entries
            .into_iter()
            .map(|(name, entry)| {
                let node = match entry {
                    NamespaceEntry::Tree(tree) => self.tree_node(tree),
                    NamespaceEntry::Dir(inner) => self.namespace_node(inner),
                };
                (name, node)
            })
            .collect();
        Node::directory(StaticDir::new(children))
    }
}

/// Intermediate layout of ref names before they become nodes.
#[derive(Default)]
struct Namespace {
    entries: BTreeMap<String, NamespaceEntry>,
}

enum NamespaceEntry {
    Tree(Oid),
    Dir(Namespace),
}

impl Namespace {
    /// Returns false if the name collides with an existing ref.
    fn insert(&mut self, name: &str, tree: Oid) -> bool {
        let (head, rest) = match name.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        if head.is_empty() {
            return false;
        }
        match (self.entries.entry(head.to_string()), rest) {
            (Entry::Vacant(slot), None) => {
                slot.insert(NamespaceEntry::Tree(tree));
                true
            }
            (Entry::Vacant(slot), Some(rest)) => {
                let mut inner = Namespace::default();
                let ok = inner.insert(rest, tree);
                if ok {
                    slot.insert(NamespaceEntry::Dir(inner));
                }
                ok
            }
            (Entry::Occupied(mut slot), Some(rest)) => match slot.get_mut() {
                NamespaceEntry::Dir(inner) => inner.insert(rest, tree),
                NamespaceEntry::Tree(_) => false,
            },
            (Entry::Occupied(_), None) => false,
        }
    }
}

/// A git tree, read one level per `children()` call.
struct TreeDir {
    store: Arc<dyn ObjectStore>,
    diagnostics: Diagnostics,
    tree: Oid,
}

impl TreeDir {
    fn child(&self, entry: RawEntry) -> Option<(String, Node)> {
        let name = match String::from_utf8(entry.name) {
            Ok(name) => name,
            Err(e) => {
                self.diagnostics.skipped(format!(
                    "tree {}: skipping entry with non-UTF-8 name {:?}",
                    self.tree,
                    String::from_utf8_lossy(e.as_bytes())
                ));
                return None;
            }
        };
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
            self.diagnostics
                .skipped(format!("tree {}: skipping entry with invalid name {:?}", self.tree, name));
            return None;
        }

        let node = match entry.kind {
            ObjectKind::Tree => Node::directory(TreeDir {
                store: self.store.clone(),
                diagnostics: self.diagnostics.clone(),
                tree: entry.id,
            }),
            ObjectKind::Blob => Node::file(BlobFile {
                store: self.store.clone(),
                blob: entry.id,
                mode: FileMode::from_raw(entry.mode),
            }),
            ObjectKind::Commit => Node::Unsupported(format!("submodule at {}", entry.id)),
            ObjectKind::Other => {
                self.diagnostics.skipped(format!(
                    "tree {}: skipping {:?} with mode {:06o}",
                    self.tree, name, entry.mode
                ));
                return None;
            }
        };
        Some((name, node))
    }
}

impl DirNode for TreeDir {
    fn children(&self) -> FsResult<Children> {
        let entries = self.store.tree_entries(self.tree).map_err(FsError::unexpected)?;

        let mut children = Children::new();
        for entry in entries {
            let Some((name, node)) = self.child(entry) else {
                continue;
            };
            match children.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(slot) => {
                    self.diagnostics.skipped(format!(
                        "tree {}: duplicate entry {:?}, keeping the first",
                        self.tree,
                        slot.key()
                    ));
                }
            }
        }
        Ok(children)
    }
}

/// A blob with the mode its tree entry gave it.
struct BlobFile {
    store: Arc<dyn ObjectStore>,
    blob: Oid,
    mode: FileMode,
}

impl FileNode for BlobFile {
    fn mode(&self) -> FileMode {
        self.mode
    }

    fn size(&self) -> FsResult<u64> {
        self.store.blob_size(self.blob).map_err(FsError::unexpected)
    }

    fn open(&self) -> FsResult<ContentReader> {
        self.store.open_blob(self.blob).map_err(FsError::unexpected)
    }
}
