//! In-memory object store.
//!
//! Used for tests and for synthetic projections. Objects are content-addressed
//! with git's own hashing, so ids look like real ones.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::RwLock;

use git2::{ObjectType, Oid};
use gitview_types::{RAW_EXECUTABLE, RAW_REGULAR, RAW_SYMLINK, RAW_TREE};

use super::{ContentReader, ObjectKind, ObjectStore, RawEntry, StoreError, StoreResult};

/// Object in the memory store.
#[derive(Debug, Clone)]
enum Object {
    Blob(Vec<u8>),
    Tree(Vec<MemoryEntry>),
    /// Present but undecodable.
    Corrupt,
}

/// A tree entry to insert into a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub name: Vec<u8>,
    pub mode: u32,
    pub id: Oid,
}

impl MemoryEntry {
    pub fn new(name: impl Into<Vec<u8>>, mode: u32, id: Oid) -> Self {
        Self {
            name: name.into(),
            mode,
            id,
        }
    }

    pub fn file(name: impl Into<Vec<u8>>, id: Oid) -> Self {
        Self::new(name, RAW_REGULAR, id)
    }

    pub fn executable(name: impl Into<Vec<u8>>, id: Oid) -> Self {
        Self::new(name, RAW_EXECUTABLE, id)
    }

    pub fn symlink(name: impl Into<Vec<u8>>, id: Oid) -> Self {
        Self::new(name, RAW_SYMLINK, id)
    }

    pub fn tree(name: impl Into<Vec<u8>>, id: Oid) -> Self {
        Self::new(name, RAW_TREE, id)
    }
}

/// Object kind implied by a raw mode, the way git decides it.
fn kind_for_mode(mode: u32) -> ObjectKind {
    match mode & 0o170000 {
        0o040000 => ObjectKind::Tree,
        0o160000 => ObjectKind::Commit,
        0o100000 | 0o120000 => ObjectKind::Blob,
        _ => ObjectKind::Other,
    }
}

/// In-memory object store.
///
/// Thread-safe via internal `RwLock`s. All data is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<Oid, Object>>,
    refs: RwLock<BTreeMap<String, Oid>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, id: Oid, object: Object) -> StoreResult<Oid> {
        self.objects
            .write()
            .map_err(|_| StoreError::Lock)?
            .insert(id, object);
        Ok(id)
    }

    fn get(&self, id: Oid) -> StoreResult<Object> {
        self.objects
            .read()
            .map_err(|_| StoreError::Lock)?
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Store a blob and return its id.
    pub fn insert_blob(&self, data: impl Into<Vec<u8>>) -> StoreResult<Oid> {
        let data = data.into();
        let id = Oid::hash_object(ObjectType::Blob, &data)?;
        self.insert(id, Object::Blob(data))
    }

    /// Store a tree and return its id. Entries may point at objects that
    /// do not exist; reading them later fails.
    pub fn insert_tree(&self, entries: Vec<MemoryEntry>) -> StoreResult<Oid> {
        let mut encoded = Vec::new();
        for entry in &entries {
            encoded.extend_from_slice(format!("{:o} ", entry.mode).as_bytes());
            encoded.extend_from_slice(&entry.name);
            encoded.push(0);
            encoded.extend_from_slice(entry.id.as_bytes());
        }
        let id = Oid::hash_object(ObjectType::Tree, &encoded)?;
        self.insert(id, Object::Tree(entries))
    }

    /// Point a ref at a tree.
    pub fn set_ref(&self, name: impl Into<String>, tree: Oid) -> StoreResult<()> {
        self.refs
            .write()
            .map_err(|_| StoreError::Lock)?
            .insert(name.into(), tree);
        Ok(())
    }

    /// Replace an object with undecodable garbage.
    pub fn corrupt(&self, id: Oid) -> StoreResult<()> {
        self.insert(id, Object::Corrupt).map(|_| ())
    }

    /// Drop an object, leaving dangling references to it.
    pub fn remove(&self, id: Oid) -> StoreResult<()> {
        self.objects
            .write()
            .map_err(|_| StoreError::Lock)?
            .remove(&id);
        Ok(())
    }

    fn is_tree(&self, id: Oid) -> bool {
        matches!(self.get(id), Ok(Object::Tree(_)))
    }
}

impl ObjectStore for MemoryStore {
    fn resolve_root(&self, spec: &str) -> StoreResult<Oid> {
        let refs = self.refs.read().map_err(|_| StoreError::Lock)?;
        let by_name = [
            spec.to_string(),
            format!("refs/heads/{}", spec),
            format!("refs/tags/{}", spec),
        ]
        .into_iter()
        .find_map(|name| refs.get(&name).copied());
        drop(refs);

        let id = match by_name {
            Some(id) => id,
            None => Oid::from_str(spec).map_err(|_| StoreError::NotFound(spec.to_string()))?,
        };
        if self.is_tree(id) {
            Ok(id)
        } else {
            Err(StoreError::NotFound(spec.to_string()))
        }
    }

    fn resolve_refs(&self, pattern: &str) -> StoreResult<Vec<(String, Oid)>> {
        let refs = self.refs.read().map_err(|_| StoreError::Lock)?.clone();

        let matched: Vec<(String, Oid)> = match pattern.strip_suffix('*') {
            Some(prefix) => refs
                .into_iter()
                .filter(|(name, _)| name.starts_with(prefix))
                .collect(),
            None => {
                let found = [
                    pattern.to_string(),
                    format!("refs/heads/{}", pattern),
                    format!("refs/tags/{}", pattern),
                ]
                .into_iter()
                .find_map(|name| refs.get(&name).map(|id| (name, *id)))
                .ok_or_else(|| StoreError::NotFound(pattern.to_string()))?;
                vec![found]
            }
        };

        Ok(matched
            .into_iter()
            .filter(|(_, id)| self.is_tree(*id))
            .collect())
    }

    fn tree_entries(&self, tree: Oid) -> StoreResult<Vec<RawEntry>> {
        match self.get(tree)? {
            Object::Tree(entries) => Ok(entries
                .into_iter()
                .map(|entry| RawEntry {
                    kind: kind_for_mode(entry.mode),
                    name: entry.name,
                    mode: entry.mode,
                    id: entry.id,
                })
                .collect()),
            Object::Blob(_) => Err(StoreError::Corrupt(format!("{} is a blob, not a tree", tree))),
            Object::Corrupt => Err(StoreError::Corrupt(tree.to_string())),
        }
    }

    fn blob_size(&self, blob: Oid) -> StoreResult<u64> {
        match self.get(blob)? {
            Object::Blob(data) => Ok(data.len() as u64),
            Object::Tree(_) => Err(StoreError::Corrupt(format!("{} is a tree, not a blob", blob))),
            Object::Corrupt => Err(StoreError::Corrupt(blob.to_string())),
        }
    }

    fn open_blob(&self, blob: Oid) -> StoreResult<ContentReader> {
        match self.get(blob)? {
            Object::Blob(data) => Ok(Box::new(Cursor::new(data))),
            Object::Tree(_) => Err(StoreError::Corrupt(format!("{} is a tree, not a blob", blob))),
            Object::Corrupt => Err(StoreError::Corrupt(blob.to_string())),
        }
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
