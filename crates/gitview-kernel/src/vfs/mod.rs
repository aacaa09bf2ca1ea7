//! Async VFS facade for transports.
//!
//! Transports (a FUSE session, a shell, an RPC server) speak in mount-style
//! paths and live on an async runtime. This module normalizes their paths and
//! moves every repository read onto the blocking pool:
//!
//! ```text
//! transport ──► ProjectionVfs (async, io::Result) ──► ProjectionFs (sync, FsResult)
//! ```

mod projection;
mod traits;

pub use projection::{MAX_SYMLINK_HOPS, ProjectionVfs};
pub use traits::Filesystem;
