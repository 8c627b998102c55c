//! Read and inspect saved world snapshots
//!
//! Decodes every plan stored in a `.snap` file with the builtin action
//! registry and displays the queued actions with their fields.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde_json::json;
use std::path::{Path, PathBuf};

use game_content::builtin_registry;
use game_core::{ActionPlan, ActionRegistry, EntityId, decode_plan};
use runtime::repository::SNAPSHOT_EXTENSION;
use runtime::{EntityRecord, SnapshotMetadata, WorldSnapshot, read_snapshot_file};

use crate::dirs;
use crate::utils::{component_name, format_bytes};

/// Read and inspect snapshot files
#[derive(Parser)]
pub struct ReadPlan {
    /// Snapshot name (looked up in the snapshot directory) or path to a .snap file
    #[arg(value_name = "SNAPSHOT")]
    snapshot: String,

    /// Snapshot directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Only show this entity
    #[arg(short, long, value_name = "ID")]
    entity: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Queued actions with their fields
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format with raw plan bytes
    Debug,
}

impl ReadPlan {
    pub fn execute(self) -> Result<()> {
        let path = self.resolve_path();
        if !path.exists() {
            anyhow::bail!(
                "Snapshot not found: {}\n\nHint: run `cargo xtask simulate <SCENARIO> --save <NAME>` first",
                path.display()
            );
        }

        let (snapshot, metadata) = read_snapshot_file(&path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let registry = builtin_registry()?;

        let records: Vec<&EntityRecord> = match self.entity {
            Some(id) => {
                let record = snapshot
                    .entity(EntityId(id))
                    .with_context(|| format!("Entity {} is not in this snapshot", id))?;
                vec![record]
            }
            None => snapshot.entities.iter().collect(),
        };

        match self.format {
            OutputFormat::Summary => {
                print_header(&path, &snapshot, metadata.as_ref());
                print_summary(&records, &registry)?;
            }
            OutputFormat::Json => print_json(&snapshot, metadata.as_ref(), &records, &registry)?,
            OutputFormat::Debug => {
                print_header(&path, &snapshot, metadata.as_ref());
                print_debug(&records, &registry)?;
            }
        }

        Ok(())
    }

    fn resolve_path(&self) -> PathBuf {
        let direct = Path::new(&self.snapshot);
        let is_path = direct.extension().is_some_and(|ext| ext == SNAPSHOT_EXTENSION)
            || self.snapshot.contains(std::path::MAIN_SEPARATOR);
        if is_path {
            return direct.to_path_buf();
        }

        let dir = self.data_dir.clone().unwrap_or_else(dirs::snapshot_dir);
        dir.join(format!("{}.{}", self.snapshot, SNAPSHOT_EXTENSION))
    }
}

fn decode(record: &EntityRecord, registry: &ActionRegistry) -> Result<Option<ActionPlan>> {
    record
        .plan
        .as_deref()
        .map(|bytes| {
            decode_plan(bytes, registry)
                .with_context(|| format!("Failed to decode plan of entity {}", record.entity))
        })
        .transpose()
}

fn print_header(path: &Path, snapshot: &WorldSnapshot, metadata: Option<&SnapshotMetadata>) {
    println!("{} {}", style("Snapshot:").bold().cyan(), path.display());
    println!("{} {}", style("Frame:").bold().cyan(), snapshot.frame);
    println!(
        "{} {} ({} with plans)",
        style("Entities:").bold().cyan(),
        snapshot.entities.len(),
        snapshot.plan_count()
    );
    match metadata {
        Some(metadata) => {
            println!(
                "{} {}",
                style("File Size:").bold().cyan(),
                format_bytes(metadata.byte_len as usize)
            );
            println!(
                "{} {} {}",
                style("Checksum:").bold().cyan(),
                metadata.checksum,
                style("(verified)").green()
            );
        }
        None => println!(
            "{} {}",
            style("Warning:").bold().yellow(),
            "no metadata file next to the snapshot; checksum not verified"
        ),
    }
    println!();
}

fn print_summary(records: &[&EntityRecord], registry: &ActionRegistry) -> Result<()> {
    println!("{}", style("=== Plans ===").bold().green());
    println!();

    for record in records {
        let components: Vec<String> = record
            .components
            .iter()
            .map(|kind| component_name(*kind))
            .collect();
        println!(
            "{} [{}]",
            style(format!("Entity {}", record.entity)).bold().yellow(),
            components.join(", ")
        );

        let Some(plan) = decode(record, registry)? else {
            println!("  {}", style("(no plan)").dim());
            continue;
        };
        if !record.active {
            println!("  {}", style("(inactive)").dim());
        }
        if plan.is_empty() {
            println!("  {}", style("idle").dim());
        }

        for (index, slot) in plan.iter().enumerate() {
            let mut marks = Vec::new();
            if slot.is_started() {
                marks.push("started");
            }
            if slot.was_interrupted() {
                marks.push("interrupted");
            }
            let marks = if marks.is_empty() {
                String::new()
            } else {
                format!(" [{}]", marks.join(", "))
            };

            println!(
                "  {}. {} (priority {}){}",
                index,
                style(slot.action().type_name()).cyan(),
                slot.priority(),
                marks
            );
            for field in slot.action().describe_fields() {
                println!("       {}", field);
            }
        }
        println!();
    }

    Ok(())
}

fn print_json(
    snapshot: &WorldSnapshot,
    metadata: Option<&SnapshotMetadata>,
    records: &[&EntityRecord],
    registry: &ActionRegistry,
) -> Result<()> {
    let mut entities = Vec::with_capacity(records.len());
    for record in records {
        let plan = decode(record, registry)?.map(|plan| {
            plan.iter()
                .map(|slot| {
                    json!({
                        "action": slot.action().type_name(),
                        "priority": slot.priority().value(),
                        "started": slot.is_started(),
                        "interrupted": slot.was_interrupted(),
                        "fields": slot.action().describe_fields(),
                    })
                })
                .collect::<Vec<_>>()
        });
        let components: Vec<String> = record
            .components
            .iter()
            .map(|kind| component_name(*kind))
            .collect();
        entities.push(json!({
            "entity": record.entity.0,
            "components": components,
            "active": record.active,
            "plan": plan,
        }));
    }

    let output = json!({
        "frame": snapshot.frame,
        "checksum": metadata.map(|m| m.checksum.as_str()),
        "entities": entities,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_debug(records: &[&EntityRecord], registry: &ActionRegistry) -> Result<()> {
    for record in records {
        println!("{}", style(format!("Entity {}", record.entity)).bold().yellow());
        println!("  components: {:?}", record.components);
        println!("  active: {}", record.active);
        match &record.plan {
            Some(bytes) => {
                println!("  plan bytes ({}): {}", bytes.len(), hex::encode(bytes));
                if let Some(plan) = decode(record, registry)? {
                    println!("{:#?}", plan);
                }
            }
            None => println!("  plan: none"),
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use game_content::WaitAction;
    use game_content::kinds::components::ACTOR;
    use game_core::{InsertionPolicy, Priority};
    use runtime::{FileSnapshotRepository, Simulation, SnapshotRepository};

    use super::*;

    fn saved_snapshot(dir: &Path) -> EntityId {
        let mut simulation = Simulation::new(builtin_registry().unwrap());
        let worker = simulation.world_mut().spawn([ACTOR]);
        simulation
            .world_mut()
            .push(
                worker,
                Box::new(WaitAction::new(Duration::from_secs(1))),
                Priority::COMMAND_STD,
                InsertionPolicy::default(),
            )
            .unwrap();
        simulation.run(3, Duration::from_millis(100));

        let snapshot = simulation.snapshot().unwrap();
        FileSnapshotRepository::new(dir)
            .unwrap()
            .save("demo", &snapshot)
            .unwrap();
        worker
    }

    fn command(dir: &Path, snapshot: &str, entity: Option<u64>) -> ReadPlan {
        ReadPlan {
            snapshot: snapshot.to_string(),
            data_dir: Some(dir.to_path_buf()),
            entity,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn resolves_names_inside_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = command(dir.path(), "demo", None).resolve_path();
        assert_eq!(path, dir.path().join("demo.snap"));

        let direct = command(dir.path(), "/tmp/other.snap", None).resolve_path();
        assert_eq!(direct, PathBuf::from("/tmp/other.snap"));
    }

    #[test]
    fn reads_saved_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let worker = saved_snapshot(dir.path());

        command(dir.path(), "demo", None).execute().unwrap();
        command(dir.path(), "demo", Some(worker.0)).execute().unwrap();
    }

    #[test]
    fn unknown_entity_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        saved_snapshot(dir.path());

        assert!(command(dir.path(), "demo", Some(999)).execute().is_err());
        assert!(command(dir.path(), "missing", None).execute().is_err());
    }
}
