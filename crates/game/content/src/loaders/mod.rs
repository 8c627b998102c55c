//! Content loaders for reading scenario files.
//!
//! Scenarios are plain data: entities, scheduled pushes and destructions. They
//! drive the developer simulator and integration tests.

pub mod scenario;

pub use scenario::{ActionSpec, DestroySpec, EntitySpec, PushSpec, Scenario, ScenarioLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
