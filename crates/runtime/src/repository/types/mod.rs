//! Persisted record types.

mod snapshot;

pub use snapshot::{EntityRecord, SnapshotMetadata, WorldSnapshot};
