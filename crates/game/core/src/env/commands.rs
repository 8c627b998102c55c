use serde::{Deserialize, Serialize};

use crate::state::{ComponentKind, EntityId};

/// Hands out fresh entity ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub const fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// The id the next allocation will return.
    pub const fn peek(&self) -> EntityId {
        EntityId(self.next)
    }

    /// Makes sure future ids are strictly greater than `entity`.
    pub fn observe(&mut self, entity: EntityId) {
        if !entity.is_none() && entity.0 >= self.next {
            self.next = entity.0 + 1;
        }
    }
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

/// A structural world edit requested by an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldCommand {
    /// Create a helper entity (e.g. a transient effect) owned by `owner`.
    Spawn {
        entity: EntityId,
        owner: EntityId,
        components: Vec<ComponentKind>,
    },
    /// Destroy an entity.
    Destroy { entity: EntityId },
}

/// Deferred world edits.
///
/// Ids for spawned entities are allocated immediately so the requesting
/// action can remember them; the entities themselves appear once the owner
/// of the world applies the queue between ticks.
#[derive(Clone, Debug, Default)]
pub struct WorldCommands {
    allocator: EntityIdAllocator,
    queue: Vec<WorldCommand>,
}

impl WorldCommands {
    pub fn new(allocator: EntityIdAllocator) -> Self {
        Self {
            allocator,
            queue: Vec::new(),
        }
    }

    /// Queues a spawn and returns the id the entity will have.
    pub fn spawn(
        &mut self,
        owner: EntityId,
        components: impl IntoIterator<Item = ComponentKind>,
    ) -> EntityId {
        let entity = self.allocator.allocate();
        self.queue.push(WorldCommand::Spawn {
            entity,
            owner,
            components: components.into_iter().collect(),
        });
        entity
    }

    /// Queues destruction of `entity`.
    pub fn destroy(&mut self, entity: EntityId) {
        self.queue.push(WorldCommand::Destroy { entity });
    }

    /// Takes all queued commands in request order.
    pub fn drain(&mut self) -> Vec<WorldCommand> {
        std::mem::take(&mut self.queue)
    }

    pub fn allocator(&self) -> &EntityIdAllocator {
        &self.allocator
    }

    pub fn allocator_mut(&mut self) -> &mut EntityIdAllocator {
        &mut self.allocator
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_allocates_ids_before_apply() {
        let mut commands = WorldCommands::new(EntityIdAllocator::starting_at(100));

        let a = commands.spawn(EntityId(1), []);
        let b = commands.spawn(EntityId(1), []);
        commands.destroy(a);

        assert_eq!(a, EntityId(100));
        assert_eq!(b, EntityId(101));
        assert_eq!(commands.drain().len(), 3);
        assert!(commands.is_empty());
    }

    #[test]
    fn observe_skips_past_existing_ids() {
        let mut allocator = EntityIdAllocator::default();
        allocator.observe(EntityId(41));
        assert_eq!(allocator.allocate(), EntityId(42));

        allocator.observe(EntityId::NONE);
        assert_eq!(allocator.peek(), EntityId(43));
    }
}
