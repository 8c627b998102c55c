//! Core state machine trait.
//!
//! This module defines the [`StateMachine`] trait, the abstraction every
//! resumable behaviour implements. The trait is generic over a context type
//! `C`, allowing states to reach collaborators (world lookup, timers, message
//! bus) without the machine owning them.

use core::fmt::Debug;

/// What a state asks the driver to do after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// Enter `S` and run it immediately, within the same tick.
    Next(S),

    /// Keep the current state and yield until the next tick.
    Stay,

    /// Enter `S` but yield until the next tick before running it.
    Yield(S),

    /// The machine is finished.
    Finish,
}

impl<S> Transition<S> {
    /// Returns `true` if the transition ends the current tick.
    #[inline]
    pub fn is_tick_gated(&self) -> bool {
        !matches!(self, Transition::Next(_))
    }
}

/// A resumable machine advanced by [`crate::drive`].
///
/// The machine stores its own state so that it can be persisted and resumed;
/// the driver only reads it via [`StateMachine::state`] and writes it back via
/// [`StateMachine::set_state`] after each step.
pub trait StateMachine<C> {
    /// The machine's state enum.
    type State: Copy + Eq + Debug;

    /// Returns the state the machine is currently in.
    fn state(&self) -> Self::State;

    /// Overwrites the current state.
    fn set_state(&mut self, state: Self::State);

    /// Runs `state` once.
    ///
    /// # Arguments
    ///
    /// * `state` - The state to run (always equal to [`StateMachine::state`]).
    /// * `ctx` - Mutable reference to the collaborators of this tick.
    fn step(&mut self, state: Self::State, ctx: &mut C) -> Transition<Self::State>;
}
