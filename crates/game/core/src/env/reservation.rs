use std::collections::HashMap;

use crate::state::EntityId;

/// Soft locks on target entities.
///
/// Actions acquire a reservation in `on_startup` after validating their target
/// and release it in `on_shutdown`. Both operations are idempotent for the
/// holder, so a second release is harmless.
pub trait Reservations {
    /// Acquires `target` for `holder`.
    ///
    /// Returns true if the reservation is now held by `holder` (including when
    /// it already was), false if another entity holds it.
    fn try_acquire(&mut self, target: EntityId, holder: EntityId) -> bool;

    /// Releases `target` if `holder` holds it. Returns true if released.
    fn release(&mut self, target: EntityId, holder: EntityId) -> bool;

    /// Current holder of `target`, if any.
    fn holder(&self, target: EntityId) -> Option<EntityId>;
}

/// Reservation registry keyed by target entity id.
#[derive(Debug, Default, Clone)]
pub struct ReservationRegistry {
    held: HashMap<EntityId, EntityId>,
}

impl ReservationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases every reservation owned by `holder` and returns the count.
    pub fn release_all(&mut self, holder: EntityId) -> usize {
        let before = self.held.len();
        self.held.retain(|_, owner| *owner != holder);
        before - self.held.len()
    }

    /// Drops any reservation on `target`, whoever holds it.
    pub fn forget_target(&mut self, target: EntityId) -> Option<EntityId> {
        self.held.remove(&target)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl Reservations for ReservationRegistry {
    fn try_acquire(&mut self, target: EntityId, holder: EntityId) -> bool {
        match self.held.get(&target) {
            Some(owner) => *owner == holder,
            None => {
                self.held.insert(target, holder);
                true
            }
        }
    }

    fn release(&mut self, target: EntityId, holder: EntityId) -> bool {
        if self.held.get(&target) == Some(&holder) {
            self.held.remove(&target);
            true
        } else {
            false
        }
    }

    fn holder(&self, target: EntityId) -> Option<EntityId> {
        self.held.get(&target).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: EntityId = EntityId(10);
    const WORKER_A: EntityId = EntityId(1);
    const WORKER_B: EntityId = EntityId(2);

    #[test]
    fn second_holder_is_denied() {
        let mut registry = ReservationRegistry::new();

        assert!(registry.try_acquire(TREE, WORKER_A));
        assert!(!registry.try_acquire(TREE, WORKER_B));
        assert_eq!(registry.holder(TREE), Some(WORKER_A));
    }

    #[test]
    fn acquire_is_reentrant_and_release_idempotent() {
        let mut registry = ReservationRegistry::new();

        assert!(registry.try_acquire(TREE, WORKER_A));
        assert!(registry.try_acquire(TREE, WORKER_A));
        assert!(registry.release(TREE, WORKER_A));
        assert!(!registry.release(TREE, WORKER_A));
        assert!(registry.is_empty());
    }

    #[test]
    fn foreign_release_is_ignored() {
        let mut registry = ReservationRegistry::new();
        registry.try_acquire(TREE, WORKER_A);

        assert!(!registry.release(TREE, WORKER_B));
        assert_eq!(registry.holder(TREE), Some(WORKER_A));
    }

    #[test]
    fn release_all_drops_only_holders_reservations() {
        let mut registry = ReservationRegistry::new();
        registry.try_acquire(EntityId(10), WORKER_A);
        registry.try_acquire(EntityId(11), WORKER_A);
        registry.try_acquire(EntityId(12), WORKER_B);

        assert_eq!(registry.release_all(WORKER_A), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.holder(EntityId(12)), Some(WORKER_B));
    }
}
