//! File-backed repository implementations.

mod snapshot;

pub use snapshot::{FileSnapshotRepository, SNAPSHOT_EXTENSION, read_snapshot_file};
