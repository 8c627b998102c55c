//! Tick-accurate countdown timer.
//!
//! Timed states hold a [`Countdown`] and decrement it with the time that
//! passed since the previous tick. The countdown expires on exactly the tick
//! where the accumulated elapsed time first reaches the configured duration.

use core::time::Duration;

/// Remaining-time counter for a timed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Countdown {
    duration: Duration,
    remaining: Duration,
}

impl Countdown {
    /// Creates a countdown that expires after `duration`.
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Subtracts `elapsed` and returns `true` once the countdown has expired.
    ///
    /// Saturates at zero; an expired countdown keeps returning `true`.
    #[inline]
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.remaining.is_zero()
    }

    /// Returns `true` if no time is left.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Time left until expiry.
    #[inline]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Configured total duration.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time consumed so far.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.duration - self.remaining
    }

    /// Resets the remaining time to the full duration.
    pub fn restart(&mut self) {
        self.remaining = self.duration;
    }
}
