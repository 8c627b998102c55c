use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use game_core::{ComponentKind, EntityId, EntityIdAllocator};

/// Full world state at a frame boundary.
///
/// Plans are stored as opaque `APLN` blobs produced by
/// [`game_core::ActionComponent::save`] so the record itself never depends on
/// which action types exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Frames completed when the snapshot was taken.
    pub frame: u64,
    /// Next id the entity allocator would hand out.
    pub allocator: EntityIdAllocator,
    /// Entities in ascending id order.
    pub entities: Vec<EntityRecord>,
}

impl WorldSnapshot {
    /// Number of entities that carry an action plan.
    pub fn plan_count(&self) -> usize {
        self.entities.iter().filter(|e| e.plan.is_some()).count()
    }

    pub fn entity(&self, entity: EntityId) -> Option<&EntityRecord> {
        self.entities.iter().find(|record| record.entity == entity)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity: EntityId,
    pub components: Vec<ComponentKind>,
    /// Encoded plan, `None` for entities without one.
    pub plan: Option<Vec<u8>>,
    pub active: bool,
}

/// Side-car description written next to each stored snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub name: String,
    pub frame: u64,
    pub entities: usize,
    pub plans: usize,
    /// Length of the bincode record in bytes.
    pub byte_len: u64,
    /// Hex SHA-256 of the bincode record.
    pub checksum: String,
    /// Unix timestamp (seconds).
    pub saved_at: u64,
}

impl SnapshotMetadata {
    pub(crate) fn describe(name: &str, snapshot: &WorldSnapshot, record: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            frame: snapshot.frame,
            entities: snapshot.entities.len(),
            plans: snapshot.plan_count(),
            byte_len: record.len() as u64,
            checksum: crate::utils::sha256_hex(record),
            saved_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default(),
        }
    }
}
