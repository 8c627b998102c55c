//! Event payloads published by the simulation.

use serde::Serialize;

use game_core::{EntityId, PlanEvent};

/// A plan lifecycle event tagged with the entity and frame it happened in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityEvent {
    pub entity: EntityId,
    pub frame: u64,
    #[serde(flatten)]
    pub event: PlanEvent,
}

/// Frame-level events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FrameEvent {
    /// One simulation step finished.
    Stepped {
        frame: u64,
        /// Components that ran an update.
        updated: usize,
        /// Messages handed to listeners.
        delivered: usize,
    },
    EntitySpawned {
        frame: u64,
        entity: EntityId,
        owner: EntityId,
    },
    EntityDestroyed {
        frame: u64,
        entity: EntityId,
    },
    SnapshotSaved {
        frame: u64,
        name: String,
    },
    SnapshotLoaded {
        frame: u64,
        name: String,
    },
}
