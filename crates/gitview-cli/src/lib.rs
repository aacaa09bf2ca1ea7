//! gitview-cli: browse a repository projection from the shell.
//!
//! The binary is a thin transport over [`ProjectionVfs`]: every subcommand
//! is one or more independent VFS calls, rendered as text.

pub mod format;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitview_kernel::ViewConfig;
use gitview_kernel::vfs::{Filesystem, ProjectionVfs};
use gitview_types::{DirEntry, FileKind};

/// Browse a git repository as a read-only filesystem.
#[derive(Debug, Parser)]
#[command(name = "gitview", version, about)]
pub struct Cli {
    /// Repository to project (work tree or bare)
    #[arg(short = 'C', long, global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Revision to project as the root
    #[arg(long, global = true, value_name = "REV")]
    pub rev: Option<String>,

    /// Project these refs (names or globs) as top-level directories instead
    #[arg(long = "ref", global = true, value_name = "REF")]
    pub refs: Vec<String>,

    /// TOML config file; flags override its values
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log projection diagnostics (skipped entries, repository errors)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a directory
    Ls {
        #[arg(default_value = "")]
        path: String,
        /// Long listing: mode, links, size, name
        #[arg(short, long)]
        long: bool,
    },
    /// Show attributes of a path
    Stat {
        path: String,
        /// Follow symlinks
        #[arg(short = 'L', long)]
        dereference: bool,
    },
    /// Print file contents
    Cat { path: String },
    /// Print a symlink's target
    Readlink { path: String },
    /// Print a directory hierarchy
    Tree {
        #[arg(default_value = "")]
        path: String,
        /// Descend at most this many levels
        #[arg(short = 'L', long, value_name = "N")]
        max_depth: Option<usize>,
    },
}

impl Cli {
    /// The config file (if any) with flags applied on top.
    pub fn view_config(&self) -> Result<ViewConfig> {
        let mut config = match &self.config {
            Some(path) => ViewConfig::load(path)?,
            None => ViewConfig::default(),
        };
        if let Some(repo) = &self.repo {
            config.repo = repo.clone();
        }
        if let Some(rev) = &self.rev {
            config.rev = rev.clone();
            config.refs.clear();
        }
        if !self.refs.is_empty() {
            config.refs = self.refs.clone();
        }
        config.debug |= self.debug;
        Ok(config)
    }
}

/// Build the projection described by `cli` and run its subcommand.
pub async fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = cli.view_config()?;
    let fs = config
        .open()
        .with_context(|| format!("cannot project {}", config.repo.display()))?;
    tracing::debug!(name = %fs, root = %config.root_spec(), "projection ready");

    let vfs = ProjectionVfs::new(Arc::new(fs));
    execute(&vfs, &cli.command, out).await
}

/// Run one subcommand against an existing projection.
pub async fn execute<W: Write>(vfs: &ProjectionVfs, command: &Command, out: &mut W) -> Result<()> {
    match command {
        Command::Ls { path, long } => ls(vfs, path, *long, out).await,
        Command::Stat { path, dereference } => {
            let attr = if *dereference {
                vfs.stat(Path::new(path)).await
            } else {
                vfs.lstat(Path::new(path)).await
            }
            .with_context(|| format!("stat {path}"))?;
            out.write_all(format::stat_block(path, &attr).as_bytes())?;
            Ok(())
        }
        Command::Cat { path } => {
            let data = vfs
                .read(Path::new(path))
                .await
                .with_context(|| format!("cat {path}"))?;
            out.write_all(&data)?;
            Ok(())
        }
        Command::Readlink { path } => {
            let target = vfs
                .read_link(Path::new(path))
                .await
                .with_context(|| format!("readlink {path}"))?;
            writeln!(out, "{}", target.display())?;
            Ok(())
        }
        Command::Tree { path, max_depth } => tree(vfs, path, *max_depth, out).await,
    }
}

async fn ls<W: Write>(vfs: &ProjectionVfs, path: &str, long: bool, out: &mut W) -> Result<()> {
    let dir = Path::new(path);
    let entries = vfs.list(dir).await.with_context(|| format!("ls {path}"))?;
    for entry in entries {
        if !long {
            writeln!(out, "{}", entry.name)?;
            continue;
        }
        let child = dir.join(&entry.name);
        let attr = vfs
            .lstat(&child)
            .await
            .with_context(|| format!("ls {}", child.display()))?;
        let target = match entry.kind {
            FileKind::Symlink => Some(vfs.read_link(&child).await?),
            _ => None,
        };
        writeln!(
            out,
            "{}",
            format::long_line(&entry.name, &attr, target.as_deref())
        )?;
    }
    Ok(())
}

struct TreeItem {
    path: PathBuf,
    entry: DirEntry,
    prefix: String,
    last: bool,
    depth: usize,
}

/// Push `dir`'s entries so that popping yields them in name order.
async fn push_children(
    vfs: &ProjectionVfs,
    dir: &Path,
    prefix: &str,
    depth: usize,
    stack: &mut Vec<TreeItem>,
) -> std::io::Result<()> {
    let entries = vfs.list(dir).await?;
    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate().rev() {
        stack.push(TreeItem {
            path: dir.join(&entry.name),
            entry,
            prefix: prefix.to_string(),
            last: i + 1 == count,
            depth,
        });
    }
    Ok(())
}

async fn tree<W: Write>(
    vfs: &ProjectionVfs,
    path: &str,
    max_depth: Option<usize>,
    out: &mut W,
) -> Result<()> {
    let mut stack = Vec::new();
    push_children(vfs, Path::new(path), "", 1, &mut stack)
        .await
        .with_context(|| format!("tree {path}"))?;
    writeln!(out, "{}", if path.is_empty() { "." } else { path })?;

    let (mut dirs, mut files) = (0usize, 0usize);
    while let Some(item) = stack.pop() {
        let branch = if item.last { "└── " } else { "├── " };
        let mut line = format!("{}{}{}", item.prefix, branch, item.entry.name);
        if item.entry.kind == FileKind::Symlink {
            if let Ok(target) = vfs.read_link(&item.path).await {
                line.push_str(" -> ");
                line.push_str(&target.display().to_string());
            }
        }
        writeln!(out, "{line}")?;

        if !item.entry.is_dir() {
            files += 1;
            continue;
        }
        dirs += 1;
        if max_depth.is_some_and(|max| item.depth >= max) {
            continue;
        }
        let prefix = format!("{}{}", item.prefix, if item.last { "    " } else { "│   " });
        // A broken subtree is reported in place; its siblings still print.
        if let Err(e) = push_children(vfs, &item.path, &prefix, item.depth + 1, &mut stack).await {
            tracing::warn!(path = %item.path.display(), error = %e, "cannot list directory");
            writeln!(out, "{prefix}└── [error opening dir: {e}]")?;
        }
    }

    writeln!(out, "\n{dirs} directories, {files} files")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["gitview", "--repo", "/tmp/r", "--ref", "refs/heads/*", "ls"]);
        let config = cli.view_config().unwrap();
        assert_eq!(config.repo, PathBuf::from("/tmp/r"));
        assert_eq!(config.refs, vec!["refs/heads/*".to_string()]);
        assert!(!config.debug);
    }

    #[test]
    fn test_rev_replaces_config_refs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.toml");
        std::fs::write(&path, "refs = [\"refs/tags/*\"]\ndebug = true\n").unwrap();

        let cli = Cli::parse_from([
            "gitview",
            "--config",
            path.to_str().unwrap(),
            "--rev",
            "v1.0",
            "cat",
            "README",
        ]);
        let config = cli.view_config().unwrap();
        assert_eq!(config.rev, "v1.0");
        assert!(config.refs.is_empty());
        assert!(config.debug);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["gitview", "tree", "-L", "2", "--debug"]);
        assert!(cli.debug);
        match cli.command {
            Command::Tree { path, max_depth } => {
                assert_eq!(path, "");
                assert_eq!(max_depth, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
