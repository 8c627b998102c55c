//! Topic-based event bus for runtime events.
//!
//! Plan lifecycle events and frame-level events are published on separate
//! topics so consumers subscribe only to what they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{EntityEvent, FrameEvent};
