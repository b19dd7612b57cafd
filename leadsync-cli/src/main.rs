//! leadsync — two-way status sync between an Airtable lead table and a
//! ClickUp list.
//!
//! # Usage
//!
//! ```text
//! leadsync sync [--phase both|leads|tasks] [--window-minutes N] [--dry-run] [--json]
//! leadsync config [--json]
//! leadsync map
//! ```
//!
//! Global flags: `--config <path>` (YAML file, default `~/.leadsync/config.yaml`),
//! `--verbose`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, map::MapArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "leadsync",
    version,
    about = "Keep Airtable leads and ClickUp follow-up tasks in step",
    long_about = None,
)]
struct Cli {
    /// Config file (YAML). Environment variables override its values.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one reconciliation pass (lead → task, then task → lead).
    Sync(SyncArgs),

    /// Show the resolved configuration with secrets masked.
    Config(ConfigArgs),

    /// Print the status mapping tables.
    Map(MapArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Sync(args) => args.run(config),
        Commands::Config(args) => args.run(config),
        Commands::Map(args) => args.run(),
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
