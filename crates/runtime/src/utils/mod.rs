//! Hashing helpers for snapshot integrity checks.

mod hash;

pub use hash::{sha256_hex, short_hash};
