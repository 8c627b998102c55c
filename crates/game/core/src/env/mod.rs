//! Collaborators an action plan consumes from the surrounding engine.
//!
//! Actions never reach into global state. Everything they need beyond their
//! own fields (entity lookup, reservations, messaging, deferred world edits)
//! is injected per call through [`crate::action::ActionContext`]. Each
//! collaborator is a trait plus a small in-memory implementation that the
//! runtime embeds and tests use directly.
mod commands;
mod lookup;
mod message;
mod reservation;

pub use commands::{EntityIdAllocator, WorldCommand, WorldCommands};
pub use lookup::{EntityLookup, EntitySet};
pub use message::{
    Delivery, ListenerId, MAX_MESSAGE_PARAMS, Message, MessageBus, MessageConfig, MessageHub,
};
pub use reservation::{ReservationRegistry, Reservations};
