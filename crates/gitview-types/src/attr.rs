//! Filesystem-observable attributes synthesized from repository metadata.

use serde::Serialize;

use crate::mode::FileMode;

/// `st_mode` type bits for a directory.
pub const S_IFDIR: u32 = 0o040000;
/// `st_mode` type bits for a regular file.
pub const S_IFREG: u32 = 0o100000;
/// `st_mode` type bits for a symbolic link.
pub const S_IFLNK: u32 = 0o120000;

/// Permissions of every directory: read and traverse, never write.
pub const DIR_PERM: u32 = 0o555;

/// What a path looks like to a filesystem caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Directory,
    RegularFile,
    Symlink,
}

impl FileKind {
    /// The `st_mode` type bits for this kind.
    pub fn type_bits(self) -> u32 {
        match self {
            FileKind::Directory => S_IFDIR,
            FileKind::RegularFile => S_IFREG,
            FileKind::Symlink => S_IFLNK,
        }
    }
}

/// Translate a repository file mode into a filesystem kind and permissions.
///
/// | repository mode | filesystem |
/// |---|---|
/// | regular | regular file, `0444` |
/// | executable | regular file, `0555` |
/// | symlink | symlink, `0444` |
/// | anything else | `None` |
///
/// This is the only translation table; attributes and listings both use it.
pub fn translate_mode(mode: FileMode) -> Option<(FileKind, u32)> {
    match mode {
        FileMode::Regular => Some((FileKind::RegularFile, 0o444)),
        FileMode::Executable => Some((FileKind::RegularFile, 0o555)),
        FileMode::Symlink => Some((FileKind::Symlink, 0o444)),
        FileMode::Other(_) => None,
    }
}

/// Attributes of a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attr {
    pub kind: FileKind,
    /// Permission bits (e.g. `0o444`).
    pub perm: u32,
    /// Content length in bytes; 0 for directories. For symlinks, the target length.
    pub size: u64,
    pub nlink: u32,
}

impl Attr {
    /// Attributes shared by every directory in the projection.
    pub fn directory() -> Self {
        Self {
            kind: FileKind::Directory,
            perm: DIR_PERM,
            size: 0,
            nlink: 2,
        }
    }

    /// Attributes of a file, or `None` if its mode has no filesystem analogue.
    pub fn file(mode: FileMode, size: u64) -> Option<Self> {
        let (kind, perm) = translate_mode(mode)?;
        Some(Self {
            kind,
            perm,
            size,
            nlink: 1,
        })
    }

    /// Full `st_mode`: type bits plus permissions.
    pub fn mode(&self) -> u32 {
        self.kind.type_bits() | self.perm
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    /// Name of the entry (not full path).
    pub name: String,
    pub kind: FileKind,
    pub perm: u32,
}

impl DirEntry {
    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Directory,
            perm: DIR_PERM,
        }
    }

    /// Create a file entry, or `None` if the mode cannot be translated.
    pub fn file(name: impl Into<String>, mode: FileMode) -> Option<Self> {
        let (kind, perm) = translate_mode(mode)?;
        Some(Self {
            name: name.into(),
            kind,
            perm,
        })
    }

    /// Full `st_mode`, identical to [`Attr::mode`] for the same node.
    pub fn mode(&self) -> u32 {
        self.kind.type_bits() | self.perm
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}
