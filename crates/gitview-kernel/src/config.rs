//! Projection configuration.
//!
//! Loaded from a TOML file, then overridden by command-line flags:
//!
//! ```toml
//! repo = "/src/linux"
//! rev = "v6.9"          # single-root projection
//! # refs = ["refs/heads/*", "refs/tags/v6.*"]   # multi-root instead
//! name = "linux@v6.9"
//! debug = false
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gitview_types::FsError;
use serde::Deserialize;
use thiserror::Error;

use crate::adapter::ProjectionFs;
use crate::builder::RootSpec;
use crate::diag::Diagnostics;
use crate::store::{GitStore, StoreError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to open repository {path}: {source}")]
    Repository {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("failed to build projection: {}", .0.describe())]
    Projection(#[from] FsError),
}

/// Everything needed to construct a projection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Repository path (work tree or bare).
    pub repo: PathBuf,
    /// Revision for a single-root projection.
    pub rev: String,
    /// Ref names or globs. Non-empty selects the multi-root projection.
    pub refs: Vec<String>,
    /// Display name override.
    pub name: Option<String>,
    /// Route diagnostics to the log.
    pub debug: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            rev: "HEAD".to_string(),
            refs: Vec::new(),
            name: None,
            debug: false,
        }
    }
}

impl ViewConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The root this config selects.
    pub fn root_spec(&self) -> RootSpec {
        if self.refs.is_empty() {
            RootSpec::Revision(self.rev.clone())
        } else {
            RootSpec::Refs(self.refs.clone())
        }
    }

    /// Open the repository and build the projection.
    pub fn open(&self) -> Result<ProjectionFs, ConfigError> {
        let store = GitStore::open(&self.repo).map_err(|source| ConfigError::Repository {
            path: self.repo.clone(),
            source,
        })?;

        let diagnostics = Diagnostics::new();
        diagnostics.set_verbose(self.debug);

        let fs = ProjectionFs::open(Arc::new(store), &self.root_spec(), diagnostics)?;
        Ok(match &self.name {
            Some(name) => fs.with_name(name.clone()),
            None => fs,
        })
    }
}
