//! File-based SnapshotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::repository::traits::validate_name;
use crate::repository::types::{SnapshotMetadata, WorldSnapshot};
use crate::repository::{RepositoryError, Result, SnapshotRepository};
use crate::utils::{sha256_hex, short_hash};

/// Extension of snapshot record files.
pub const SNAPSHOT_EXTENSION: &str = "snap";

const METADATA_EXTENSION: &str = "json";
const LENGTH_PREFIX: usize = 4;

/// Stores each snapshot as a pair of files:
///
/// ```text
/// {name}.snap   [u32 length][bincode WorldSnapshot]
/// {name}.json   SnapshotMetadata (frame, counts, SHA-256 of the record)
/// ```
///
/// Both files are written to a temporary path first and renamed into place.
pub struct FileSnapshotRepository {
    base_dir: PathBuf,
}

impl FileSnapshotRepository {
    /// Create a new repository rooted at `base_dir`, creating it if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.{SNAPSHOT_EXTENSION}"))
    }

    fn metadata_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.{METADATA_EXTENSION}"))
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, name: &str, snapshot: &WorldSnapshot) -> Result<SnapshotMetadata> {
        validate_name(name)?;

        let record = bincode::serialize(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let length = u32::try_from(record.len()).map_err(|_| {
            RepositoryError::Serialization(format!("record of {} bytes", record.len()))
        })?;
        let metadata = SnapshotMetadata::describe(name, snapshot, &record);

        let mut framed = Vec::with_capacity(LENGTH_PREFIX + record.len());
        framed.extend_from_slice(&length.to_le_bytes());
        framed.extend_from_slice(&record);

        let json = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;

        let path = self.snapshot_path(name);
        write_atomic(&path, &framed)?;
        write_atomic(&self.metadata_path(name), &json)?;

        tracing::debug!(
            "Saved snapshot '{}' (frame {}, {} bytes, {}) to {}",
            name,
            snapshot.frame,
            record.len(),
            short_hash(&record),
            path.display()
        );

        Ok(metadata)
    }

    fn load(&self, name: &str) -> Result<Option<WorldSnapshot>> {
        validate_name(name)?;
        let path = self.snapshot_path(name);

        if !path.exists() {
            return Ok(None);
        }

        let (snapshot, _) = read_snapshot_file(&path)?;
        tracing::debug!("Loaded snapshot '{}' from {}", name, path.display());
        Ok(Some(snapshot))
    }

    fn metadata(&self, name: &str) -> Result<Option<SnapshotMetadata>> {
        validate_name(name)?;
        read_metadata(&self.metadata_path(name))
    }

    fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.snapshot_path(name).exists()
    }

    fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        for path in [self.snapshot_path(name), self.metadata_path(name)] {
            if path.exists() {
                fs::remove_file(&path).map_err(RepositoryError::Io)?;
            }
        }
        tracing::debug!("Deleted snapshot '{}'", name);

        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if path.extension().and_then(|ext| ext.to_str()) == Some(SNAPSHOT_EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }

        names.sort_unstable();
        Ok(names)
    }
}

/// Decodes a `.snap` file, verifying it against its metadata side-file when
/// one exists.
pub fn read_snapshot_file(path: &Path) -> Result<(WorldSnapshot, Option<SnapshotMetadata>)> {
    let bytes = fs::read(path).map_err(RepositoryError::Io)?;
    let record = unframe(&bytes)?;

    let metadata = read_metadata(&path.with_extension(METADATA_EXTENSION))?;
    if let Some(metadata) = &metadata {
        let actual = sha256_hex(record);
        if actual != metadata.checksum {
            return Err(RepositoryError::ChecksumMismatch {
                expected: metadata.checksum.clone(),
                actual,
            });
        }
    }

    let snapshot = bincode::deserialize(record)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    Ok((snapshot, metadata))
}

fn unframe(bytes: &[u8]) -> Result<&[u8]> {
    let Some((prefix, rest)) = bytes.split_first_chunk::<LENGTH_PREFIX>() else {
        return Err(RepositoryError::CorruptedData(format!(
            "file of {} bytes has no length prefix",
            bytes.len()
        )));
    };

    let expected = u32::from_le_bytes(*prefix) as usize;
    if rest.len() != expected {
        return Err(RepositoryError::PartialWrite {
            expected,
            actual: rest.len(),
        });
    }
    Ok(rest)
}

fn read_metadata(path: &Path) -> Result<Option<SnapshotMetadata>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(RepositoryError::Io)?;
    let metadata =
        serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Json(e.to_string()))?;
    Ok(Some(metadata))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp_path = PathBuf::from(temp);

    fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;
    fs::rename(&temp_path, path).map_err(RepositoryError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{ComponentKind, EntityId, EntityIdAllocator};
    use tempfile::TempDir;

    use crate::repository::EntityRecord;

    fn sample() -> WorldSnapshot {
        WorldSnapshot {
            frame: 12,
            allocator: EntityIdAllocator::starting_at(3),
            entities: vec![
                EntityRecord {
                    entity: EntityId(1),
                    components: vec![ComponentKind::from_name("actor")],
                    plan: Some(vec![0x41, 0x50, 0x4c, 0x4e, 1, 0, 0, 0, 0]),
                    active: true,
                },
                EntityRecord {
                    entity: EntityId(2),
                    components: vec![],
                    plan: None,
                    active: true,
                },
            ],
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();

        let metadata = repo.save("quick", &sample()).unwrap();
        assert_eq!(metadata.frame, 12);
        assert_eq!(metadata.entities, 2);
        assert_eq!(metadata.plans, 1);

        assert!(repo.exists("quick"));
        assert_eq!(repo.load("quick").unwrap(), Some(sample()));
        assert_eq!(repo.metadata("quick").unwrap(), Some(metadata));
        assert_eq!(repo.list().unwrap(), vec!["quick".to_string()]);
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();

        assert!(!repo.exists("absent"));
        assert_eq!(repo.load("absent").unwrap(), None);
        assert_eq!(repo.metadata("absent").unwrap(), None);
    }

    #[test]
    fn test_tampered_record_fails_checksum() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();
        repo.save("slot", &sample()).unwrap();

        let path = dir.path().join("slot.snap");
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            repo.load("slot"),
            Err(RepositoryError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_record_is_partial_write() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();
        repo.save("slot", &sample()).unwrap();

        let path = dir.path().join("slot.snap");
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        assert!(matches!(
            repo.load("slot"),
            Err(RepositoryError::PartialWrite { .. })
        ));
    }

    #[test]
    fn test_delete_removes_both_files() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();
        repo.save("slot", &sample()).unwrap();

        repo.delete("slot").unwrap();
        assert!(!dir.path().join("slot.snap").exists());
        assert!(!dir.path().join("slot.json").exists());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_path_like_names_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(dir.path()).unwrap();

        assert!(matches!(
            repo.save("../escape", &sample()),
            Err(RepositoryError::InvalidName(_))
        ));
        assert!(!repo.exists("../escape"));
    }
}
