use std::collections::HashMap;

use super::{Action, ActionType};
use crate::error::PlanError;
use crate::state::ActionTypeId;

/// Creates a default-constructed action ready to be filled by the codec.
pub type ActionFactory = fn() -> Box<dyn Action>;

fn create_default<T: ActionType>() -> Box<dyn Action> {
    Box::new(T::default())
}

#[derive(Clone, Copy)]
struct Entry {
    name: &'static str,
    factory: ActionFactory,
}

/// Maps persisted type ids to constructors.
///
/// Registration rejects two names hashing to the same id, so a snapshot can
/// never be decoded into the wrong type.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    entries: HashMap<ActionTypeId, Entry>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under [`ActionType::TYPE_ID`].
    ///
    /// Registering the same type twice is a no-op.
    pub fn register<T: ActionType>(&mut self) -> Result<(), PlanError> {
        if let Some(existing) = self.entries.get(&T::TYPE_ID) {
            if existing.name == T::NAME {
                return Ok(());
            }
            return Err(PlanError::TypeIdCollision {
                id: T::TYPE_ID,
                existing: existing.name,
                new: T::NAME,
            });
        }

        self.entries.insert(
            T::TYPE_ID,
            Entry {
                name: T::NAME,
                factory: create_default::<T>,
            },
        );
        Ok(())
    }

    /// Builder-style [`ActionRegistry::register`].
    pub fn with<T: ActionType>(mut self) -> Result<Self, PlanError> {
        self.register::<T>()?;
        Ok(self)
    }

    pub fn create(&self, id: ActionTypeId) -> Option<Box<dyn Action>> {
        self.entries.get(&id).map(|entry| (entry.factory)())
    }

    pub fn name(&self, id: ActionTypeId) -> Option<&'static str> {
        self.entries.get(&id).map(|entry| entry.name)
    }

    pub fn contains(&self, id: ActionTypeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered `(id, name)` pairs sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (ActionTypeId, &'static str)> + '_ {
        let mut pairs: Vec<_> = self
            .entries
            .iter()
            .map(|(id, entry)| (*id, entry.name))
            .collect();
        pairs.sort_by_key(|(_, name)| *name);
        pairs.into_iter()
    }
}

impl core::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
