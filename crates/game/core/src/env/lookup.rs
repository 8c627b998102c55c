use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::{ComponentKind, EntityId};

/// Read-only entity resolution.
///
/// A queued action stores only ids; every use re-resolves them here and treats
/// a failed lookup as "target gone".
pub trait EntityLookup {
    /// Returns true if `entity` currently exists.
    fn is_alive(&self, entity: EntityId) -> bool;

    /// Returns true if `entity` exists and carries a component of `kind`.
    fn has_component(&self, entity: EntityId, kind: ComponentKind) -> bool;
}

/// Entity registry keyed by id, tracking the component kinds of each entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    entities: BTreeMap<EntityId, Vec<ComponentKind>>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) an entity with the given components.
    pub fn insert(&mut self, entity: EntityId, components: impl IntoIterator<Item = ComponentKind>) {
        let mut kinds: Vec<ComponentKind> = components.into_iter().collect();
        kinds.sort_unstable();
        kinds.dedup();
        self.entities.insert(entity, kinds);
    }

    /// Removes an entity. Returns false if it did not exist.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity).is_some()
    }

    /// Attaches a component kind. Returns false if the entity does not exist.
    pub fn add_component(&mut self, entity: EntityId, kind: ComponentKind) -> bool {
        let Some(kinds) = self.entities.get_mut(&entity) else {
            return false;
        };
        if let Err(index) = kinds.binary_search(&kind) {
            kinds.insert(index, kind);
        }
        true
    }

    /// Detaches a component kind. Returns false if it was not attached.
    pub fn remove_component(&mut self, entity: EntityId, kind: ComponentKind) -> bool {
        let Some(kinds) = self.entities.get_mut(&entity) else {
            return false;
        };
        match kinds.binary_search(&kind) {
            Ok(index) => {
                kinds.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn components(&self, entity: EntityId) -> Option<&[ComponentKind]> {
        self.entities.get(&entity).map(Vec::as_slice)
    }

    /// Entity ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityLookup for EntitySet {
    fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    fn has_component(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|kinds| kinds.binary_search(&kind).is_ok())
    }
}
