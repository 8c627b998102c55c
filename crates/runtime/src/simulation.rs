//! Frame scheduler over a [`World`].
//!
//! One [`Simulation::step`] runs the phases of a frame in a fixed order:
//!
//! 1. tick every active plan in ascending entity order
//! 2. apply deferred spawns and destroys
//! 3. deliver queued messages (destroys publish `ENTITY_DESTROYED`, so
//!    phases 2 and 3 alternate until both queues are empty)
//! 4. collect plan events and world changes into a [`StepReport`]
use std::time::Duration;

use game_core::{ActionRegistry, Clock, PlanConfig};
use tracing::{trace, warn};

use crate::api::Result;
use crate::events::{EntityEvent, FrameEvent};
use crate::repository::WorldSnapshot;
use crate::world::{World, WorldChange};

/// Everything that happened during one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub frame: u64,
    pub updated: usize,
    pub delivered: usize,
    pub events: Vec<EntityEvent>,
    pub changes: Vec<FrameEvent>,
}

impl StepReport {
    /// Frame summary event for the bus.
    pub fn summary(&self) -> FrameEvent {
        FrameEvent::Stepped {
            frame: self.frame,
            updated: self.updated,
            delivered: self.delivered,
        }
    }
}

pub struct Simulation {
    world: World,
    registry: ActionRegistry,
    plan_config: PlanConfig,
    frame: u64,
    max_settle_rounds: usize,
}

impl Simulation {
    pub const DEFAULT_MAX_SETTLE_ROUNDS: usize = 8;

    pub fn new(registry: ActionRegistry) -> Self {
        Self::with_plan_config(registry, PlanConfig::default())
    }

    pub fn with_plan_config(registry: ActionRegistry, plan_config: PlanConfig) -> Self {
        Self {
            world: World::with_plan_config(plan_config.clone()),
            registry,
            plan_config,
            frame: 0,
            max_settle_rounds: Self::DEFAULT_MAX_SETTLE_ROUNDS,
        }
    }

    /// Caps the command/message rounds run after the tick phase.
    pub fn with_max_settle_rounds(mut self, rounds: usize) -> Self {
        self.max_settle_rounds = rounds.max(1);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Frames completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs one frame with `delta` of simulated time.
    pub fn step(&mut self, delta: Duration) -> StepReport {
        let frame = self.frame;
        let clock = Clock::new(frame, delta);

        let updated = self.world.update(clock);

        let mut delivered = 0;
        let mut rounds = 0;
        loop {
            self.world.apply_commands();
            if self.world.messages().pending() == 0 {
                break;
            }
            if rounds == self.max_settle_rounds {
                warn!(frame, rounds, "frame did not settle; work deferred to next frame");
                break;
            }
            delivered += self.world.deliver_messages(1);
            rounds += 1;
        }

        self.frame += 1;
        let report = self.collect(frame, updated, delivered);
        trace!(
            frame,
            updated,
            delivered,
            events = report.events.len(),
            "frame stepped"
        );
        report
    }

    /// Runs `frames` steps of `delta` each and concatenates the reports.
    pub fn run(&mut self, frames: u64, delta: Duration) -> Vec<StepReport> {
        (0..frames).map(|_| self.step(delta)).collect()
    }

    fn collect(&mut self, frame: u64, updated: usize, delivered: usize) -> StepReport {
        let events = self
            .world
            .drain_events()
            .into_iter()
            .map(|(entity, event)| EntityEvent {
                entity,
                frame,
                event,
            })
            .collect();
        let changes = self
            .world
            .drain_changes()
            .into_iter()
            .map(|change| match change {
                WorldChange::Spawned { entity, owner } => FrameEvent::EntitySpawned {
                    frame,
                    entity,
                    owner,
                },
                WorldChange::Destroyed { entity } => FrameEvent::EntityDestroyed { frame, entity },
            })
            .collect();

        StepReport {
            frame,
            updated,
            delivered,
            events,
            changes,
        }
    }

    /// Captures the world at the current frame boundary.
    pub fn snapshot(&mut self) -> Result<WorldSnapshot> {
        self.world.snapshot(self.frame)
    }

    /// Replaces the world with `snapshot`.
    ///
    /// Current plans are cleared first so running actions get their
    /// shutdown; the returned events report that clear. On a decode error
    /// the current world is left untouched.
    pub fn restore(&mut self, snapshot: &WorldSnapshot) -> Result<Vec<EntityEvent>> {
        let restored = World::from_snapshot(snapshot, &self.registry, self.plan_config.clone())?;

        self.world.clear_all_plans();
        let frame = self.frame;
        let cleared = self
            .world
            .drain_events()
            .into_iter()
            .map(|(entity, event)| EntityEvent {
                entity,
                frame,
                event,
            })
            .collect();

        self.world = restored;
        self.frame = snapshot.frame;
        Ok(cleared)
    }
}
