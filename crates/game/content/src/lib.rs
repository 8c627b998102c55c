//! Concrete actions and commands built on the `game-core` action engine.
//!
//! - [`actions`]: wait, work-on-target and signal actions plus
//!   [`builtin_registry`] for snapshot decoding
//! - [`commands`]: idempotent orders that push those actions
//! - [`kinds`]: component kinds and message ids the actions rely on
//! - `loaders` (feature `loaders`): scenario files for the simulator

pub mod actions;
pub mod commands;
pub mod kinds;

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{
    SignalAction, SignalState, WaitAction, WaitState, WorkOnTargetAction, WorkState,
    builtin_registry,
};
pub use commands::{Command, CommandOutcome, WaitCommand, WorkOnTargetCommand, push_unless_queued};

#[cfg(feature = "loaders")]
pub use loaders::{ActionSpec, EntitySpec, PushSpec, Scenario, ScenarioLoader};
