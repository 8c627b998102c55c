use core::fmt;

use serde::{Deserialize, Serialize};

/// 32-bit FNV-1a hash, usable in const context.
///
/// Stable across builds and platforms, so hashed names can be persisted.
pub const fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

/// Opaque identifier of an entity in the world.
///
/// Serialized as a fixed 8-byte integer. A stored id may outlive its entity;
/// resolving it through [`crate::env::EntityLookup`] is the only way to find out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Sentinel for "no entity".
    pub const NONE: Self = Self(u64::MAX);

    /// Returns true if this is the [`EntityId::NONE`] sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Identifier of an action slot within one entity's plan.
///
/// Allocated monotonically per plan; never reused while the plan lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u32);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Stable discriminator of a concrete action type.
///
/// Derived from the action's registered name, so it survives reordering of
/// code and is safe to write into save games and network packets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionTypeId(pub u32);

impl ActionTypeId {
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a32(name.as_bytes()))
    }
}

impl fmt::Display for ActionTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Kind of a component attached to an entity (hashed name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKind(pub u32);

impl ComponentKind {
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a32(name.as_bytes()))
    }
}

/// Identifier of a message on the message bus (hashed name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u32);

impl MessageId {
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a32(name.as_bytes()))
    }
}
