//! Per-entity action plans: prioritized, resumable, serializable behaviour.
//!
//! `game-core` owns the execution model only. Concrete actions live in
//! `game-content`, and the tick loop that drives many components lives in the
//! `runtime` crate. Everything here is single-threaded and deterministic; the
//! collaborators an action needs are injected per call through
//! [`action::ActionContext`].
//!
//! # Module Structure
//!
//! - `action`: the [`Action`] trait, context, field reflection, type registry
//! - `plan`: ordering and insertion policies ([`ActionPlan`])
//! - `component`: the tick driver ([`ActionComponent`])
//! - `codec`: binary state serialization and plan snapshots
//! - `env`: collaborator traits with in-memory implementations
//! - `state`: ids, priorities, and the clock
pub mod action;
pub mod codec;
pub mod component;
pub mod config;
pub mod env;
pub mod error;
pub mod plan;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    Action, ActionContext, ActionFactory, ActionRegistry, ActionResult, ActionType, AsAny,
    FieldInfo, FieldValue, PlanRequest, Services, downcast_mut, downcast_ref,
};
pub use codec::{ActionState, BinarySerializer, CodecError, decode_plan, encode_plan};
pub use component::{ActionComponent, PlanEntry, PlanEvent, PlanStatus};
pub use config::PlanConfig;
pub use env::{
    Delivery, EntityIdAllocator, EntityLookup, EntitySet, ListenerId, Message, MessageBus,
    MessageConfig, MessageHub, ReservationRegistry, Reservations, WorldCommand, WorldCommands,
};
pub use error::{ErrorSeverity, GameError, PlanError};
pub use plan::{ActionPlan, InsertionPolicy, Slot, SlotFlags};
pub use state::{ActionId, ActionTypeId, Clock, ComponentKind, EntityId, MessageId, Priority};
