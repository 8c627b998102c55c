//! Driver that advances a [`StateMachine`] for one tick.
//!
//! The driver reproduces switch-with-fall-through control flow: free
//! transitions run the next state immediately, tick-gated transitions stop
//! the loop. This keeps zero-duration phases from wasting a frame while
//! timed phases still block on the clock.

use crate::{Progress, StateMachine, Transition};

/// Upper bound on free transitions within a single tick.
///
/// Exceeding it means the machine has a cycle of zero-duration states, which
/// would otherwise spin forever inside one frame.
pub const MAX_FREE_TRANSITIONS: usize = 64;

/// Advances `machine` until a tick-gated transition or completion.
///
/// # Semantics
///
/// - `Next(s)`: store `s` and run it right away
/// - `Stay`: keep the state, return [`Progress::Continue`]
/// - `Yield(s)`: store `s`, return [`Progress::Continue`]
/// - `Finish`: return [`Progress::Done`]
///
/// # Panics
///
/// Panics if more than [`MAX_FREE_TRANSITIONS`] free transitions happen in
/// one call.
pub fn drive<C, M>(machine: &mut M, ctx: &mut C) -> Progress
where
    M: StateMachine<C> + ?Sized,
{
    let mut free = 0usize;
    loop {
        let state = machine.state();
        match machine.step(state, ctx) {
            Transition::Next(next) => {
                free += 1;
                assert!(
                    free <= MAX_FREE_TRANSITIONS,
                    "state machine exceeded {MAX_FREE_TRANSITIONS} free transitions in one tick (last state {state:?})"
                );
                machine.set_state(next);
            }
            Transition::Stay => return Progress::Continue,
            Transition::Yield(next) => {
                machine.set_state(next);
                return Progress::Continue;
            }
            Transition::Finish => return Progress::Done,
        }
    }
}
