//! Repository file modes.

use serde::{Deserialize, Serialize};

/// Raw git mode of a regular (non-executable) blob.
pub const RAW_REGULAR: u32 = 0o100644;
/// Raw git mode of an executable blob.
pub const RAW_EXECUTABLE: u32 = 0o100755;
/// Raw git mode of a symbolic link blob.
pub const RAW_SYMLINK: u32 = 0o120000;
/// Raw git mode of a sub-tree.
pub const RAW_TREE: u32 = 0o040000;
/// Raw git mode of a submodule commit (gitlink).
pub const RAW_GITLINK: u32 = 0o160000;

/// The mode a repository records for a file entry.
///
/// Only three modes have a filesystem analogue. Everything else is kept
/// verbatim in `Other` so callers can report it, but it is never exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMode {
    Regular,
    Executable,
    Symlink,
    Other(u32),
}

impl FileMode {
    /// Classify a raw mode. Total: unknown modes become `Other`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            RAW_REGULAR => FileMode::Regular,
            RAW_EXECUTABLE => FileMode::Executable,
            RAW_SYMLINK => FileMode::Symlink,
            other => FileMode::Other(other),
        }
    }

    /// The raw git mode.
    pub fn raw(self) -> u32 {
        match self {
            FileMode::Regular => RAW_REGULAR,
            FileMode::Executable => RAW_EXECUTABLE,
            FileMode::Symlink => RAW_SYMLINK,
            FileMode::Other(raw) => raw,
        }
    }

    pub fn is_symlink(self) -> bool {
        self == FileMode::Symlink
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileMode::Regular => write!(f, "regular"),
            FileMode::Executable => write!(f, "executable"),
            FileMode::Symlink => write!(f, "symlink"),
            FileMode::Other(raw) => write!(f, "unsupported ({:06o})", raw),
        }
    }
}
