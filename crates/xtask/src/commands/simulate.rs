//! Run a scenario file through the frame scheduler
//!
//! Builds a world from the scenario's entities, applies scheduled pushes and
//! destroys at the start of their frame, steps the simulation and prints
//! the resulting plan events.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use game_content::{Scenario, ScenarioLoader, builtin_registry};
use game_core::{EntityId, PlanEvent};
use runtime::{
    EntityEvent, FileSnapshotRepository, FrameEvent, Simulation, SnapshotRepository, StepReport,
};

use crate::dirs;
use crate::utils::{component_name, format_duration};

/// Run a scenario and print the event log
#[derive(Parser)]
pub struct Simulate {
    /// Scenario file (.toml or .ron)
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Override the number of frames to run
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Save the final world as a snapshot under this name
    #[arg(long, value_name = "NAME")]
    save: Option<String>,

    /// Snapshot directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also print frames without plan events
    #[arg(long)]
    all_frames: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per event
    Text,
    /// One JSON object per event (JSON lines)
    Json,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let scenario = ScenarioLoader::load(&self.scenario)?;
        let frames = self.frames.unwrap_or(scenario.frames);

        if matches!(self.format, OutputFormat::Text) {
            println!(
                "{} {}",
                style("Scenario:").bold().cyan(),
                self.scenario.display()
            );
            println!(
                "{} {} frames x {}",
                style("Run:").bold().cyan(),
                frames,
                format_duration(scenario.delta())
            );
            println!();
        }

        let mut simulation = build_world(&scenario)?;
        for frame in 0..frames {
            let report = run_frame(&mut simulation, &scenario, frame)?;
            match self.format {
                OutputFormat::Text => print_frame(&report, self.all_frames),
                OutputFormat::Json => print_json(&report)?,
            }
        }

        if matches!(self.format, OutputFormat::Text) {
            print_plans(&simulation);
        }

        if let Some(name) = self.save {
            let dir = self.data_dir.unwrap_or_else(dirs::snapshot_dir);
            let repository = FileSnapshotRepository::new(&dir)
                .with_context(|| format!("Failed to open snapshot directory: {}", dir.display()))?;
            let snapshot = simulation.snapshot()?;
            let metadata = repository.save(&name, &snapshot)?;
            eprintln!(
                "{} {} (frame {}, sha256 {})",
                style("Saved snapshot").green().bold(),
                dir.join(format!("{name}.{}", runtime::repository::SNAPSHOT_EXTENSION))
                    .display(),
                metadata.frame,
                &metadata.checksum[..16]
            );
        }

        Ok(())
    }
}

/// Creates the scenario's entities in a fresh simulation.
pub fn build_world(scenario: &Scenario) -> Result<Simulation> {
    let mut simulation = Simulation::new(builtin_registry()?);
    for spec in &scenario.entities {
        simulation
            .world_mut()
            .insert_entity(spec.entity(), spec.component_kinds());
    }
    Ok(simulation)
}

/// Applies the scenario's edits for `frame`, then steps once.
pub fn run_frame(simulation: &mut Simulation, scenario: &Scenario, frame: u64) -> Result<StepReport> {
    for push in scenario.pushes_at(frame) {
        let entity = EntityId(push.entity);
        simulation
            .world_mut()
            .push(entity, push.action.build(), push.priority(), push.policy)
            .with_context(|| format!("Push at frame {frame} onto entity {entity} failed"))?;
    }
    for destroy in scenario.destroys_at(frame) {
        simulation.world_mut().destroy(EntityId(destroy.entity));
    }
    Ok(simulation.step(scenario.delta()))
}

fn print_frame(report: &StepReport, all_frames: bool) {
    if report.events.is_empty() && report.changes.is_empty() && !all_frames {
        return;
    }

    println!(
        "{} updated {}, delivered {}",
        style(format!("[frame {:>4}]", report.frame)).dim(),
        report.updated,
        report.delivered
    );
    for change in &report.changes {
        match change {
            FrameEvent::EntitySpawned { entity, owner, .. } => {
                println!("    {} entity {} (owner {})", style("+").green(), entity, owner);
            }
            FrameEvent::EntityDestroyed { entity, .. } => {
                println!("    {} entity {}", style("-").red(), entity);
            }
            _ => {}
        }
    }
    for event in &report.events {
        println!("    {}", describe(event));
    }
}

fn describe(event: &EntityEvent) -> String {
    let entity = style(format!("entity {}", event.entity)).cyan();
    match &event.event {
        PlanEvent::Pushed {
            action,
            name,
            priority,
            index,
        } => format!("{entity} pushed {name}#{action} (priority {priority}, slot {index})"),
        PlanEvent::Started {
            action,
            name,
            resumed,
        } => {
            let verb = if *resumed { "resumed" } else { "started" };
            format!("{entity} {} {name}#{action}", style(verb).green())
        }
        PlanEvent::StartupRejected { action, name } => {
            format!("{entity} {} {name}#{action}", style("rejected").yellow())
        }
        PlanEvent::Finished { action, name } => {
            format!("{entity} {} {name}#{action}", style("finished").green().bold())
        }
        PlanEvent::Interrupted { action, name } => {
            format!("{entity} {} {name}#{action}", style("interrupted").yellow())
        }
        PlanEvent::Removed {
            action,
            name,
            started,
        } => {
            let note = if *started { " while running" } else { "" };
            format!("{entity} {} {name}#{action}{note}", style("removed").red())
        }
        PlanEvent::Cleared { count } => {
            format!("{entity} {} {count} action(s)", style("cleared").red())
        }
    }
}

fn print_json(report: &StepReport) -> Result<()> {
    for event in &report.events {
        println!("{}", serde_json::to_string(event)?);
    }
    for change in &report.changes {
        println!("{}", serde_json::to_string(change)?);
    }
    Ok(())
}

fn print_plans(simulation: &Simulation) {
    println!();
    println!(
        "{}",
        style(format!("=== Final plans (frame {}) ===", simulation.frame()))
            .bold()
            .green()
    );

    let world = simulation.world();
    for entity in world.entities().ids() {
        let components: Vec<String> = world
            .entities()
            .components(entity)
            .unwrap_or_default()
            .iter()
            .map(|kind| component_name(*kind))
            .collect();
        print!("  entity {} [{}]", entity, components.join(", "));

        match world.plan(entity) {
            None => println!(),
            Some(plan) if plan.is_empty() => println!(" {}", style("idle").dim()),
            Some(plan) => {
                println!();
                for entry in plan.iter() {
                    let marker = if entry.started { ">" } else { " " };
                    println!(
                        "    {} {}#{} (priority {})",
                        marker, entry.type_name, entry.id, entry.priority
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_content::WaitAction;
    use game_core::ActionType;

    const SCENARIO: &str = r#"
frames = 30
delta_ms = 100

[[entity]]
id = 1
components = ["actor"]

[[entity]]
id = 10
components = ["workable"]

[[push]]
entity = 1
priority = 50
action = { kind = "work_on_target", target = 10, prepare_ms = 200, work_ms = 5000 }

[[push]]
entity = 1
frame = 20
priority = 20
action = { kind = "wait", duration_ms = 300 }

[[destroy]]
entity = 10
frame = 10
"#;

    #[test]
    fn destroyed_target_hands_over_to_the_queued_wait() {
        let scenario = ScenarioLoader::from_toml_str(SCENARIO).unwrap();
        let mut simulation = build_world(&scenario).unwrap();

        let reports: Vec<StepReport> = (0..scenario.frames)
            .map(|frame| run_frame(&mut simulation, &scenario, frame).unwrap())
            .collect();

        let finished: Vec<(u64, &str)> = reports
            .iter()
            .flat_map(|r| r.events.iter())
            .filter_map(|e| match e.event {
                PlanEvent::Finished { name, .. } => Some((e.frame, name)),
                _ => None,
            })
            .collect();
        // The work aborts on the frame its target disappears; the wait pushed
        // at frame 20 runs three frames.
        assert_eq!(finished, vec![(10, "work_on_target"), (22, WaitAction::NAME)]);
        assert!(simulation.world().plan(EntityId(1)).unwrap().is_empty());
    }

    #[test]
    fn push_onto_entity_without_plan_is_an_error() {
        let scenario = ScenarioLoader::from_toml_str(
            r#"
[[entity]]
id = 1
components = ["workable"]

[[push]]
entity = 1
priority = 10
action = { kind = "wait", duration_ms = 100 }
"#,
        )
        .unwrap();
        let mut simulation = build_world(&scenario).unwrap();

        assert!(run_frame(&mut simulation, &scenario, 0).is_err());
    }
}
