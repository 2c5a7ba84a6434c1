//! Headsync — incremental kernel header mirror.
//!
//! # Usage
//!
//! ```text
//! headsync update [--config <path>] [--line <pattern>] [--dry-run]
//! headsync status [--config <path>] [--json]
//! headsync lines [--config <path>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{lines::LinesArgs, status::StatusArgs, update::UpdateArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "headsync",
    version,
    about = "Mirror exported kernel header trees, one commit per upstream release",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay missing upstream releases into the mirror.
    Update(UpdateArgs),

    /// Show per-line mirror progress against upstream.
    Status(StatusArgs),

    /// List configured release lines and their tag prefixes.
    Lines(LinesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Update(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Lines(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
