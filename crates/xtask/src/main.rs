//! Development tasks for the action-plan workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;
mod logging;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadPlan, Simulate};

/// Development tasks for the action-plan workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for action plans", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to FILE (default: xtask.log in the platform log directory)
    #[arg(long, global = true, value_name = "FILE", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scenario file and print the plan event log
    Simulate(Simulate),

    /// Decode a saved world snapshot and print every plan
    ReadPlan(ReadPlan),

    /// Clean snapshots and logs
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for SAVE_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_file = cli
        .log_file
        .map(|path| path.unwrap_or_else(|| dirs::log_dir().join("xtask.log")));
    let _guard = logging::init(cli.verbose, log_file.as_deref())?;

    match cli.command {
        Command::Simulate(cmd) => cmd.execute(),
        Command::ReadPlan(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
