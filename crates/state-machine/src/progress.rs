//! Per-tick outcome of a state machine.

/// The result of advancing a machine for one tick.
///
/// # Tick Semantics
///
/// A machine is advanced at most once per tick:
/// - `Continue` means the machine is parked in a state that waits on time or
///   an external event and must be advanced again next tick
/// - `Done` means the machine reached its terminal state and must not be
///   advanced again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Progress {
    /// Keep ticking next frame.
    Continue,

    /// Terminal state reached.
    Done,
}

impl Progress {
    /// Returns `true` if this progress is `Continue`.
    #[inline]
    pub fn is_continue(self) -> bool {
        matches!(self, Progress::Continue)
    }

    /// Returns `true` if this progress is `Done`.
    #[inline]
    pub fn is_done(self) -> bool {
        matches!(self, Progress::Done)
    }
}
