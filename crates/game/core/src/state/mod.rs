//! Identifiers, priorities, and time shared by every layer of the engine.
//!
//! Entity references are always plain ids resolved through the world on each
//! use; nothing in an action plan owns or points at another entity.
mod clock;
mod ids;
mod priority;

pub use clock::Clock;
pub use ids::{ActionId, ActionTypeId, ComponentKind, EntityId, MessageId, fnv1a32};
pub use priority::Priority;
