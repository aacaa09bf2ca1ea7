//! Two-tier error taxonomy: a stable status tag plus an optional cause.
//!
//! *Expected* errors are normal answers to a caller probing the namespace
//! (no such path, wrong node type). They carry no cause and are never logged
//! as failures. *Unexpected* errors come from the repository itself (decode
//! failure, I/O against object storage); they surface as [`FsStatus::Io`] and
//! carry the underlying error for diagnostics.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// POSIX `ENOENT`.
pub const ENOENT: i32 = 2;
/// POSIX `EIO`.
pub const EIO: i32 = 5;
/// POSIX `ENOTDIR`.
pub const ENOTDIR: i32 = 20;
/// POSIX `EINVAL`.
pub const EINVAL: i32 = 22;

/// Result type for projection operations.
pub type FsResult<T> = Result<T, FsError>;

/// Stable filesystem status reported to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FsStatus {
    #[error("no such file or directory")]
    NotFound,
    #[error("not a directory")]
    NotDirectory,
    #[error("invalid operation")]
    InvalidOperation,
    #[error("input/output error")]
    Io,
}

impl FsStatus {
    /// The POSIX error number for this status.
    pub fn errno(self) -> i32 {
        match self {
            FsStatus::NotFound => ENOENT,
            FsStatus::NotDirectory => ENOTDIR,
            FsStatus::InvalidOperation => EINVAL,
            FsStatus::Io => EIO,
        }
    }

    /// The closest `std::io::ErrorKind`.
    pub fn io_kind(self) -> io::ErrorKind {
        match self {
            FsStatus::NotFound => io::ErrorKind::NotFound,
            FsStatus::NotDirectory => io::ErrorKind::NotADirectory,
            FsStatus::InvalidOperation => io::ErrorKind::InvalidInput,
            FsStatus::Io => io::ErrorKind::Other,
        }
    }
}

/// A failed projection operation.
#[derive(Debug, Error)]
#[error("{status}")]
pub struct FsError {
    status: FsStatus,
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl FsError {
    /// A structural outcome: the path does not exist, or names the wrong kind of node.
    pub fn expected(status: FsStatus) -> Self {
        Self {
            status,
            cause: None,
        }
    }

    /// A repository failure. Always reported as [`FsStatus::Io`].
    pub fn unexpected(cause: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            status: FsStatus::Io,
            cause: Some(cause.into()),
        }
    }

    pub fn not_found() -> Self {
        Self::expected(FsStatus::NotFound)
    }

    pub fn not_directory() -> Self {
        Self::expected(FsStatus::NotDirectory)
    }

    pub fn invalid() -> Self {
        Self::expected(FsStatus::InvalidOperation)
    }

    pub fn status(&self) -> FsStatus {
        self.status
    }

    pub fn errno(&self) -> i32 {
        self.status.errno()
    }

    /// True for errors that may indicate repository corruption.
    pub fn is_unexpected(&self) -> bool {
        self.cause.is_some()
    }

    /// The underlying repository error, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Status and cause on one line, for diagnostics.
    pub fn describe(&self) -> String {
        match &self.cause {
            Some(cause) => format!("{}: {}", self.status, cause),
            None => self.status.to_string(),
        }
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        io::Error::new(err.status.io_kind(), err)
    }
}
