//! # gitledger CLI
//!
//! Single entry point: one run performs discovery against every configured
//! provider (cache-aware) and rewrites both stat outputs. All behavior is
//! read from the config file; there are no other flags.
//!
//! ```bash
//! gitledger --config ./gitledger.toml
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use gitledger::{config, report};

/// Aggregate your commit history across hosting providers into a local
/// cache and daily/per-project stats.
#[derive(Parser)]
#[command(
    name = "gitledger",
    about = "Aggregate commit history across hosting providers into daily and per-project stats",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Credentials, cache and workspace directories, freshness windows,
    /// and output paths all live here.
    #[arg(long, default_value = "./gitledger.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    report::run_report(&config)
}
