//! gitview: browse a git repository as a read-only filesystem.
//!
//! # Usage
//!
//! ```bash
//! gitview -C ~/src/project ls docs
//! gitview --rev v1.2 cat src/main.rs
//! gitview --ref 'refs/heads/*' tree -L 3
//! ```

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gitview_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("gitview={default_level}"))),
        )
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    gitview_cli::run(&cli, &mut out).await?;
    out.flush()?;
    Ok(())
}
