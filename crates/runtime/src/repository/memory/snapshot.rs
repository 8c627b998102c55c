use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::repository::traits::validate_name;
use crate::repository::types::{SnapshotMetadata, WorldSnapshot};
use crate::repository::{RepositoryError, Result, SnapshotRepository};

/// In-memory implementation of [`SnapshotRepository`].
///
/// Records go through the same bincode encoding as the file repository so
/// checksums in the metadata match.
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<BTreeMap<String, (WorldSnapshot, SnapshotMetadata)>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, name: &str, snapshot: &WorldSnapshot) -> Result<SnapshotMetadata> {
        validate_name(name)?;
        let record = bincode::serialize(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let metadata = SnapshotMetadata::describe(name, snapshot, &record);

        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.insert(name.to_string(), (snapshot.clone(), metadata.clone()));
        Ok(metadata)
    }

    fn load(&self, name: &str) -> Result<Option<WorldSnapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots.get(name).map(|(snapshot, _)| snapshot.clone()))
    }

    fn metadata(&self, name: &str) -> Result<Option<SnapshotMetadata>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots.get(name).map(|(_, metadata)| metadata.clone()))
    }

    fn exists(&self, name: &str) -> bool {
        self.snapshots
            .read()
            .map(|snapshots| snapshots.contains_key(name))
            .unwrap_or(false)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots.keys().cloned().collect())
    }
}
