use core::fmt;

use serde::{Deserialize, Serialize};

/// Priority of a queued action; higher values pre-empt lower ones.
///
/// Serialized as a single byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Priority(pub u8);

impl Priority {
    pub const IDLE: Self = Self(0);
    pub const AUTOMATISM_LOW: Self = Self(10);
    pub const AUTOMATISM_STD: Self = Self(20);
    pub const AUTOMATISM_HIGH: Self = Self(30);
    pub const COMMAND_LOW: Self = Self(40);
    pub const COMMAND_STD: Self = Self(50);
    pub const COMMAND_HIGH: Self = Self(60);
    pub const DANGER: Self = Self(80);
    /// Actions at or above this priority cannot be displaced by commands.
    pub const BLOCKING: Self = Self(100);

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_blocking(self) -> bool {
        self.0 >= Self::BLOCKING.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
