use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Time source handed to actions once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Simulation frame counter.
    pub frame: u64,
    /// Time elapsed since the previous frame.
    pub time_passed: Duration,
}

impl Clock {
    pub const fn new(frame: u64, time_passed: Duration) -> Self {
        Self { frame, time_passed }
    }

    #[inline]
    pub const fn time_passed(&self) -> Duration {
        self.time_passed
    }

    /// Clock for the frame after this one, with the given delta.
    #[must_use]
    pub const fn advance(self, time_passed: Duration) -> Self {
        Self {
            frame: self.frame + 1,
            time_passed,
        }
    }
}
