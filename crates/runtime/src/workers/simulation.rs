//! Simulation worker that owns the authoritative [`Simulation`].
//!
//! Receives commands from [`crate::RuntimeHandle`], steps the world either
//! on request or on a fixed interval, and publishes plan and frame events to
//! the [`EventBus`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use game_content::{Command as PlanCommand, CommandOutcome};
use game_core::{Action, ActionId, ComponentKind, EntityId, InsertionPolicy, PlanEntry, Priority};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, FrameEvent};
use crate::repository::{SnapshotMetadata, SnapshotRepository, WorldSnapshot};
use crate::simulation::{Simulation, StepReport};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Run one frame.
    Step {
        delta: Duration,
        reply: oneshot::Sender<StepReport>,
    },
    Spawn {
        components: Vec<ComponentKind>,
        reply: oneshot::Sender<EntityId>,
    },
    Destroy {
        entity: EntityId,
        reply: oneshot::Sender<bool>,
    },
    Push {
        entity: EntityId,
        action: Box<dyn Action>,
        priority: Priority,
        policy: InsertionPolicy,
        reply: oneshot::Sender<Result<ActionId>>,
    },
    /// Run an idempotent order against one plan.
    Execute {
        entity: EntityId,
        command: Box<dyn PlanCommand + Send>,
        reply: oneshot::Sender<Result<CommandOutcome>>,
    },
    RemoveAction {
        entity: EntityId,
        action: ActionId,
        reply: oneshot::Sender<Result<()>>,
    },
    ClearPlan {
        entity: EntityId,
        reply: oneshot::Sender<Result<()>>,
    },
    SetActive {
        entity: EntityId,
        active: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Read-only view of one plan, front first.
    InspectPlan {
        entity: EntityId,
        reply: oneshot::Sender<Result<Vec<PlanEntry>>>,
    },
    Snapshot {
        reply: oneshot::Sender<Result<WorldSnapshot>>,
    },
    Save {
        name: String,
        reply: oneshot::Sender<Result<SnapshotMetadata>>,
    },
    /// Replace the world with a stored snapshot; replies with its frame.
    Load {
        name: String,
        reply: oneshot::Sender<Result<u64>>,
    },
}

/// Background task that processes simulation commands.
pub struct SimulationWorker {
    simulation: Simulation,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    repository: Option<Arc<dyn SnapshotRepository>>,
    tick_interval: Option<Duration>,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        simulation: Simulation,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        repository: Option<Arc<dyn SnapshotRepository>>,
        tick_interval: Option<Duration>,
    ) -> Self {
        info!(
            "SimulationWorker initialized with {} entities at frame {}, tick interval {:?}",
            simulation.world().len(),
            simulation.frame(),
            tick_interval
        );

        Self {
            simulation,
            command_rx,
            event_bus,
            repository,
            tick_interval,
        }
    }

    /// Main worker loop.
    ///
    /// Exits once every [`crate::RuntimeHandle`] has been dropped.
    pub async fn run(mut self) {
        let auto_tick = self.tick_interval.is_some();
        let period = self.tick_interval.unwrap_or(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = ticker.tick(), if auto_tick => {
                    self.step(period);
                }
            }
        }

        debug!(frame = self.simulation.frame(), "SimulationWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Step { delta, reply } => {
                let report = self.step(delta);
                if reply.send(report).is_err() {
                    debug!("Step reply channel closed (caller dropped)");
                }
            }
            Command::Spawn { components, reply } => {
                let entity = self.simulation.world_mut().spawn(components);
                if reply.send(entity).is_err() {
                    debug!("Spawn reply channel closed (caller dropped)");
                }
            }
            Command::Destroy { entity, reply } => {
                let destroyed = self.simulation.world_mut().destroy(entity);
                if reply.send(destroyed).is_err() {
                    debug!("Destroy reply channel closed (caller dropped)");
                }
            }
            Command::Push {
                entity,
                action,
                priority,
                policy,
                reply,
            } => {
                let result = self
                    .simulation
                    .world_mut()
                    .push(entity, action, priority, policy);
                if reply.send(result).is_err() {
                    debug!("Push reply channel closed (caller dropped)");
                }
            }
            Command::Execute {
                entity,
                command,
                reply,
            } => {
                let result = self.simulation.world_mut().execute(entity, command.as_ref());
                if reply.send(result).is_err() {
                    debug!("Execute reply channel closed (caller dropped)");
                }
            }
            Command::RemoveAction {
                entity,
                action,
                reply,
            } => {
                let result = self.simulation.world_mut().remove_action(entity, action);
                if reply.send(result).is_err() {
                    debug!("RemoveAction reply channel closed (caller dropped)");
                }
            }
            Command::ClearPlan { entity, reply } => {
                let result = self.simulation.world_mut().clear_plan(entity);
                if reply.send(result).is_err() {
                    debug!("ClearPlan reply channel closed (caller dropped)");
                }
            }
            Command::SetActive {
                entity,
                active,
                reply,
            } => {
                let result = self.simulation.world_mut().set_active(entity, active);
                if reply.send(result).is_err() {
                    debug!("SetActive reply channel closed (caller dropped)");
                }
            }
            Command::InspectPlan { entity, reply } => {
                let result = self
                    .simulation
                    .world()
                    .plan(entity)
                    .map(|plan| plan.iter().collect())
                    .ok_or(RuntimeError::NoPlan(entity));
                if reply.send(result).is_err() {
                    debug!("InspectPlan reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                let result = self.simulation.snapshot();
                if reply.send(result).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Save { name, reply } => {
                let result = self.save(&name);
                if reply.send(result).is_err() {
                    debug!("Save reply channel closed (caller dropped)");
                }
            }
            Command::Load { name, reply } => {
                let result = self.load(&name);
                if reply.send(result).is_err() {
                    debug!("Load reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn step(&mut self, delta: Duration) -> StepReport {
        let report = self.simulation.step(delta);
        for event in &report.events {
            self.event_bus.publish(Event::Plan(event.clone()));
        }
        for change in &report.changes {
            self.event_bus.publish(Event::Frame(change.clone()));
        }
        self.event_bus.publish(Event::Frame(report.summary()));
        report
    }

    fn repository(&self) -> Result<&Arc<dyn SnapshotRepository>> {
        self.repository
            .as_ref()
            .ok_or(RuntimeError::RepositoryNotConfigured)
    }

    fn save(&mut self, name: &str) -> Result<SnapshotMetadata> {
        let snapshot = self.simulation.snapshot()?;
        let metadata = self.repository()?.save(name, &snapshot)?;

        info!(
            "Saved snapshot '{}' at frame {} ({} entities, {} plans)",
            name, metadata.frame, metadata.entities, metadata.plans
        );
        self.event_bus.publish(Event::Frame(FrameEvent::SnapshotSaved {
            frame: metadata.frame,
            name: name.to_string(),
        }));
        Ok(metadata)
    }

    fn load(&mut self, name: &str) -> Result<u64> {
        let snapshot = self
            .repository()?
            .load(name)?
            .ok_or_else(|| RuntimeError::SnapshotNotFound(name.to_string()))?;

        let cleared = self.simulation.restore(&snapshot)?;
        for event in cleared {
            self.event_bus.publish(Event::Plan(event));
        }

        info!("Loaded snapshot '{}' at frame {}", name, snapshot.frame);
        self.event_bus.publish(Event::Frame(FrameEvent::SnapshotLoaded {
            frame: snapshot.frame,
            name: name.to_string(),
        }));
        Ok(snapshot.frame)
    }
}
