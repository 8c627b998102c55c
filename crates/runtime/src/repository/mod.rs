//! Repository layer for world snapshots.
//!
//! A snapshot captures every entity, its component kinds and the encoded
//! action plan of each planning entity. Reservations and message
//! subscriptions are not persisted; restored actions re-acquire them when
//! they start again.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::{FileSnapshotRepository, SNAPSHOT_EXTENSION, read_snapshot_file};
pub use memory::InMemorySnapshotRepository;
pub use traits::SnapshotRepository;
pub use types::{EntityRecord, SnapshotMetadata, WorldSnapshot};
