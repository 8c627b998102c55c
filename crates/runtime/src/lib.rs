//! Runtime orchestration for action-plan simulations.
//!
//! This crate owns the world the plans run against, the per-frame scheduler,
//! snapshot persistence, and the async worker that exposes it all through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`world`] holds entities, reservations, messages and one plan per actor
//! - [`simulation`] steps the world frame by frame
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`repository`] persists world snapshots
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod repository;
pub mod runtime;
pub mod simulation;
pub mod utils;
pub mod world;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{EntityEvent, Event, EventBus, FrameEvent, Topic};
pub use repository::{
    EntityRecord, FileSnapshotRepository, InMemorySnapshotRepository, RepositoryError,
    SnapshotMetadata, SnapshotRepository, WorldSnapshot, read_snapshot_file,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use simulation::{Simulation, StepReport};
pub use world::{World, WorldChange};
