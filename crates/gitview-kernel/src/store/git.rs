//! libgit2-backed object store.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use git2::{ObjectType, Oid, Repository};

use super::{ContentReader, ObjectKind, ObjectStore, RawEntry, StoreError, StoreResult};

/// Object store over a git repository on disk.
///
/// `git2::Repository` is `Send` but not `Sync`, so every raw read takes one
/// mutex. The guard never outlives a single store call: blob content is
/// copied out before the lock is released.
pub struct GitStore {
    repo: Mutex<Repository>,
    path: PathBuf,
}

impl GitStore {
    /// Open an existing repository (work tree or bare).
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path: PathBuf = path.into();
        let repo = Repository::open(&path)?;
        Ok(Self::from_repository(repo))
    }

    /// Wrap an already opened repository.
    pub fn from_repository(repo: Repository) -> Self {
        let path = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo.path().to_path_buf());
        Self {
            repo: Mutex::new(repo),
            path,
        }
    }

    /// Path of the repository (work tree, or the git dir for bare repos).
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn repo(&self) -> StoreResult<MutexGuard<'_, Repository>> {
        self.repo.lock().map_err(|_| StoreError::Lock)
    }
}

/// Glob metacharacters understood by `git_reference_foreach_glob`.
fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn entry_kind(kind: Option<ObjectType>) -> ObjectKind {
    match kind {
        Some(ObjectType::Tree) => ObjectKind::Tree,
        Some(ObjectType::Blob) => ObjectKind::Blob,
        Some(ObjectType::Commit) => ObjectKind::Commit,
        _ => ObjectKind::Other,
    }
}

impl ObjectStore for GitStore {
    fn resolve_root(&self, spec: &str) -> StoreResult<Oid> {
        let repo = self.repo()?;
        let object = repo.revparse_single(spec)?;
        let tree = object.peel_to_tree()?;
        Ok(tree.id())
    }

    fn resolve_refs(&self, pattern: &str) -> StoreResult<Vec<(String, Oid)>> {
        let repo = self.repo()?;
        let mut resolved = Vec::new();

        if !is_glob(pattern) {
            // "main", "v1.0", "refs/heads/main" all name one ref.
            let reference = repo.resolve_reference_from_short_name(pattern)?;
            let name = reference
                .name()
                .ok_or_else(|| StoreError::Corrupt(format!("ref name is not UTF-8: {}", pattern)))?
                .to_string();
            let tree = reference.peel_to_tree()?;
            resolved.push((name, tree.id()));
            return Ok(resolved);
        }

        for reference in repo.references_glob(pattern)? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                tracing::debug!("skipping ref with non-UTF-8 name");
                continue;
            };
            match reference.peel_to_tree() {
                Ok(tree) => resolved.push((name.to_string(), tree.id())),
                Err(e) => tracing::debug!("skipping ref {}: {}", name, e),
            }
        }
        Ok(resolved)
    }

    fn tree_entries(&self, tree: Oid) -> StoreResult<Vec<RawEntry>> {
        let repo = self.repo()?;
        let tree = repo.find_tree(tree)?;
        let entries = tree
            .iter()
            .map(|entry| RawEntry {
                name: entry.name_bytes().to_vec(),
                mode: entry.filemode_raw() as u32,
                id: entry.id(),
                kind: entry_kind(entry.kind()),
            })
            .collect();
        Ok(entries)
    }

    fn blob_size(&self, blob: Oid) -> StoreResult<u64> {
        let repo = self.repo()?;
        let (size, kind) = repo.odb()?.read_header(blob)?;
        if kind != ObjectType::Blob {
            return Err(StoreError::Corrupt(format!("{} is a {}, not a blob", blob, kind)));
        }
        Ok(size as u64)
    }

    fn open_blob(&self, blob: Oid) -> StoreResult<ContentReader> {
        let repo = self.repo()?;
        let blob = repo.find_blob(blob)?;
        Ok(Box::new(Cursor::new(blob.content().to_vec())))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl std::fmt::Debug for GitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitStore")
            .field("path", &self.path)
            .finish()
    }
}
