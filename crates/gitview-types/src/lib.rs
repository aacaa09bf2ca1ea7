//! Pure data types for gitview — file modes, attributes, status codes, errors.
//!
//! This crate is a leaf dependency with no git library, no async runtime, no I/O.
//! It exists so that transports can speak the projection's vocabulary without
//! pulling in libgit2.

pub mod attr;
pub mod error;
pub mod mode;

// Flat re-exports for convenience
pub use attr::*;
pub use error::*;
pub use mode::*;
