//! Clean snapshots and logs
//!
//! Deletes the log directory, the snapshot directory, or a single named
//! snapshot. Always prompts for confirmation unless `--yes` is given.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

use runtime::{FileSnapshotRepository, SnapshotRepository};

use crate::dirs;

/// Clean snapshots and logs
#[derive(Parser, Debug)]
pub struct Clean {
    /// Clean only logs (cache directory)
    #[arg(long)]
    pub logs: bool,

    /// Clean only snapshots
    #[arg(long)]
    pub snapshots: bool,

    /// Delete one snapshot by name (implies --snapshots)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Snapshot directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

enum Target {
    Directory(PathBuf),
    Snapshot { dir: PathBuf, name: String },
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        if self.name.is_some() && self.logs {
            anyhow::bail!("--name cannot be combined with --logs");
        }

        let clean_snapshots = self.snapshots || self.name.is_some() || !self.logs;
        let clean_logs = self.logs || !clean_snapshots;
        let snapshot_dir = self.data_dir.clone().unwrap_or_else(dirs::snapshot_dir);

        let mut targets: Vec<(String, Target)> = Vec::new();

        if clean_logs {
            let log_dir = dirs::log_dir();
            if log_dir.exists() {
                targets.push(("All logs".to_string(), Target::Directory(log_dir)));
            }
        }

        if clean_snapshots {
            match &self.name {
                Some(name) => {
                    let repository = FileSnapshotRepository::new(&snapshot_dir)?;
                    if !repository.exists(name) {
                        eprintln!(
                            "{} Snapshot not found: {}",
                            style("✗").red().bold(),
                            style(name).cyan()
                        );
                        anyhow::bail!("Snapshot does not exist");
                    }
                    targets.push((
                        format!("Snapshot ({name})"),
                        Target::Snapshot {
                            dir: snapshot_dir,
                            name: name.clone(),
                        },
                    ));
                }
                None if snapshot_dir.exists() => {
                    targets.push(("All snapshots".to_string(), Target::Directory(snapshot_dir)));
                }
                None => {}
            }
        }

        if targets.is_empty() {
            println!(
                "{}",
                style("Nothing to clean - directories don't exist yet").dim()
            );
            return Ok(());
        }

        println!("{}", style("Clean action-plan data").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for (label, target) in &targets {
            let path = match target {
                Target::Directory(path) => path.clone(),
                Target::Snapshot { dir, name } => dir.join(name),
            };
            println!("  {} {}", style("→").cyan(), style(label).bold());
            println!("    {}", style(path.display()).dim());
        }
        println!();

        if !self.yes && !self.confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for (label, target) in targets {
            print!("Deleting {}... ", label);
            io::stdout().flush()?;

            match target {
                Target::Directory(path) => std::fs::remove_dir_all(&path)
                    .with_context(|| format!("Failed to delete: {}", path.display()))?,
                Target::Snapshot { dir, name } => {
                    FileSnapshotRepository::new(&dir)?.delete(&name)?;
                }
            }

            println!("{}", style("✓").green());
        }

        println!();
        println!("{}", style("✓ Cleanup complete!").green().bold());

        Ok(())
    }

    fn confirm(&self) -> Result<bool> {
        print!("{} ", style("Proceed? [y/N]").yellow().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }
}
