//! Repository contract for saving and loading world snapshots.

use super::Result;
use super::types::{SnapshotMetadata, WorldSnapshot};

/// Named snapshot storage.
///
/// Names are flat identifiers (`[A-Za-z0-9_-]+`); saving under an existing
/// name overwrites it.
pub trait SnapshotRepository: Send + Sync {
    /// Stores `snapshot` under `name` and returns the metadata written with it.
    fn save(&self, name: &str, snapshot: &WorldSnapshot) -> Result<SnapshotMetadata>;

    /// Loads a snapshot, verifying its checksum.
    fn load(&self, name: &str) -> Result<Option<WorldSnapshot>>;

    /// Reads only the metadata of a snapshot.
    fn metadata(&self, name: &str) -> Result<Option<SnapshotMetadata>>;

    fn exists(&self, name: &str) -> bool;

    fn delete(&self, name: &str) -> Result<()>;

    /// All stored names in ascending order.
    fn list(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

/// Rejects names that would escape the repository directory.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(super::RepositoryError::InvalidName(name.to_string()))
    }
}
