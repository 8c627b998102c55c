//! Fall-through state machines for resumable, tick-driven behaviour.
//!
//! Long-running behaviour is written as a small explicit state machine that
//! is advanced once per simulation tick. Within one tick the machine may pass
//! through several states for free (zero-duration transitions), and it stops
//! as soon as a state has to wait for time or an external event.
//!
//! - **Free transitions**: [`Transition::Next`] runs the next state in the same tick
//! - **Tick-gated transitions**: [`Transition::Stay`] and [`Transition::Yield`] end the tick
//! - **Completion**: [`Transition::Finish`] reports [`Progress::Done`]
//!
//! # Architecture
//!
//! - [`StateMachine`]: Core trait for all machines
//! - [`Progress`]: Continue or Done, the per-tick outcome
//! - [`drive`]: Advances a machine until the first tick-gated transition
//! - [`Countdown`]: Remaining-time counter for timed states

pub mod countdown;
pub mod driver;
pub mod machine;
pub mod progress;

// Re-export core types for ergonomic API
pub use countdown::Countdown;
pub use driver::{MAX_FREE_TRANSITIONS, drive};
pub use machine::{StateMachine, Transition};
pub use progress::Progress;
