//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the simulation, editing plans, and streaming events from
//! specific topics.
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};

use game_content::{Command as PlanCommand, CommandOutcome};
use game_core::{Action, ActionId, ComponentKind, EntityId, InsertionPolicy, PlanEntry, Priority};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::repository::{SnapshotMetadata, WorldSnapshot};
use crate::simulation::StepReport;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Sends a command built around a fresh reply channel and awaits the reply.
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Run one frame of `delta` simulated time.
    pub async fn step(&self, delta: Duration) -> Result<StepReport> {
        self.request(|reply| Command::Step { delta, reply }).await
    }

    /// Run `frames` frames back to back.
    pub async fn run_frames(&self, frames: u64, delta: Duration) -> Result<Vec<StepReport>> {
        let mut reports = Vec::new();
        for _ in 0..frames {
            reports.push(self.step(delta).await?);
        }
        Ok(reports)
    }

    /// Create an entity; entities with the `actor` component get a plan.
    pub async fn spawn(&self, components: Vec<ComponentKind>) -> Result<EntityId> {
        self.request(|reply| Command::Spawn { components, reply })
            .await
    }

    /// Destroy an entity. Returns false if it did not exist.
    pub async fn destroy(&self, entity: EntityId) -> Result<bool> {
        self.request(|reply| Command::Destroy { entity, reply })
            .await
    }

    /// Push an action onto an entity's plan.
    pub async fn push(
        &self,
        entity: EntityId,
        action: impl Action,
        priority: Priority,
        policy: InsertionPolicy,
    ) -> Result<ActionId> {
        let action: Box<dyn Action> = Box::new(action);
        self.request(|reply| Command::Push {
            entity,
            action,
            priority,
            policy,
            reply,
        })
        .await?
    }

    /// Execute an idempotent command against an entity's plan.
    pub async fn execute(
        &self,
        entity: EntityId,
        command: impl PlanCommand + Send + 'static,
    ) -> Result<CommandOutcome> {
        let command: Box<dyn PlanCommand + Send> = Box::new(command);
        self.request(|reply| Command::Execute {
            entity,
            command,
            reply,
        })
        .await?
    }

    pub async fn remove_action(&self, entity: EntityId, action: ActionId) -> Result<()> {
        self.request(|reply| Command::RemoveAction {
            entity,
            action,
            reply,
        })
        .await?
    }

    pub async fn clear_plan(&self, entity: EntityId) -> Result<()> {
        self.request(|reply| Command::ClearPlan { entity, reply })
            .await?
    }

    /// Pause or resume ticking of one plan.
    pub async fn set_active(&self, entity: EntityId, active: bool) -> Result<()> {
        self.request(|reply| Command::SetActive {
            entity,
            active,
            reply,
        })
        .await?
    }

    /// Queued actions of an entity, front first.
    pub async fn inspect_plan(&self, entity: EntityId) -> Result<Vec<PlanEntry>> {
        self.request(|reply| Command::InspectPlan { entity, reply })
            .await?
    }

    /// Capture the world without persisting it.
    pub async fn snapshot(&self) -> Result<WorldSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await?
    }

    /// Persist the world under `name` in the configured repository.
    pub async fn save(&self, name: impl Into<String>) -> Result<SnapshotMetadata> {
        let name = name.into();
        self.request(|reply| Command::Save { name, reply }).await?
    }

    /// Replace the world with the snapshot stored under `name`.
    pub async fn load(&self, name: impl Into<String>) -> Result<u64> {
        let name = name.into();
        self.request(|reply| Command::Load { name, reply }).await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Plan` - per-entity plan lifecycle events
    /// - `Topic::Frame` - step summaries, spawns, destroys, save/load
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut plans = handle.subscribe(Topic::Plan);
    /// while let Ok(event) = plans.recv().await {
    ///     // Handle plan events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
