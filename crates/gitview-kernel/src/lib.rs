//! gitview-kernel: the core of gitview.
//!
//! This crate provides:
//!
//! - **Tree model**: directory / file / unsupported nodes (`tree`)
//! - **Object store**: read-only repository access, git2 or in-memory (`store`)
//! - **Builder**: lazy nodes over a revision or a set of refs (`builder`)
//! - **Adapter**: resolve, getattr, readdir, open, readlink (`adapter`)
//! - **VFS**: async, mount-path facade for transports (`vfs`)
//!
//! ```text
//! transport ─► vfs ─► adapter ─► tree ◄─ builder ─► store ─► git2
//! ```

pub mod adapter;
pub mod builder;
pub mod config;
pub mod diag;
pub mod store;
pub mod tree;
pub mod vfs;

pub use adapter::{FileHandle, ProjectionFs};
pub use builder::{RootSpec, TreeBuilder};
pub use config::{ConfigError, ViewConfig};
pub use diag::{BufferSink, Diagnostic, DiagnosticSink, Diagnostics, NullSink, Severity, TracingSink};
pub use tree::{Children, DirNode, FileNode, Node};
