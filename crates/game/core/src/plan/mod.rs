//! Ordered, prioritized storage of an entity's actions.
//!
//! [`ActionPlan`] only decides *where* an action goes and keeps slot metadata.
//! It never calls lifecycle hooks; that is the job of
//! [`crate::component::ActionComponent`], which owns the plan.
//!
//! Slots are kept sorted by non-increasing priority. Index 0 is the current
//! action.
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::action::{Action, downcast_mut, downcast_ref};
use crate::state::{ActionId, Priority};

/// Where a pushed action lands relative to slots of the same priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsertionPolicy {
    /// After the last slot with priority greater than or equal to the new one.
    #[default]
    AppendToBack,
    /// Before the first slot with priority less than or equal to the new one.
    InsertAtFront,
    /// At index 0 regardless of priority.
    InsertBeforeCurrent,
    /// Evicts every slot with priority less than or equal to the new one,
    /// then appends.
    Replace,
}

bitflags! {
    /// Lifecycle bookkeeping of a slot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SlotFlags: u8 {
        /// `on_startup` succeeded and `on_shutdown` has not run since.
        const STARTED     = 1 << 0;
        /// Was started once and then displaced from the front.
        const INTERRUPTED = 1 << 1;
    }
}

/// A queued action with its plan metadata.
#[derive(Debug)]
pub struct Slot {
    pub(crate) id: ActionId,
    pub(crate) priority: Priority,
    pub(crate) flags: SlotFlags,
    pub(crate) action: Box<dyn Action>,
}

impl Slot {
    #[inline]
    pub fn id(&self) -> ActionId {
        self.id
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn flags(&self) -> SlotFlags {
        self.flags
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.flags.contains(SlotFlags::STARTED)
    }

    #[inline]
    pub fn was_interrupted(&self) -> bool {
        self.flags.contains(SlotFlags::INTERRUPTED)
    }

    pub fn action(&self) -> &dyn Action {
        &*self.action
    }

    pub fn action_mut(&mut self) -> &mut dyn Action {
        &mut *self.action
    }

    /// Whether removing this slot must run `on_shutdown`.
    ///
    /// True for a running action and for one that never started. An action
    /// that was interrupted and not restarted has already been shut down.
    pub(crate) fn needs_shutdown(&self) -> bool {
        self.is_started() || !self.was_interrupted()
    }
}

/// Result of [`ActionPlan::insert`].
#[derive(Debug)]
pub struct Insertion {
    pub id: ActionId,
    pub index: usize,
    /// Slots removed by [`InsertionPolicy::Replace`], front to back.
    pub evicted: Vec<Slot>,
}

/// The ordered queue of one entity's actions.
#[derive(Debug, Default)]
pub struct ActionPlan {
    slots: Vec<Slot>,
    next_id: u32,
}

impl ActionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a new action would be inserted at.
    ///
    /// For [`InsertionPolicy::Replace`] this is the index after eviction.
    pub fn insertion_index(&self, priority: Priority, policy: InsertionPolicy) -> usize {
        match policy {
            InsertionPolicy::AppendToBack => self
                .slots
                .iter()
                .rposition(|slot| slot.priority >= priority)
                .map_or(0, |index| index + 1),
            InsertionPolicy::InsertAtFront => self
                .slots
                .iter()
                .position(|slot| slot.priority <= priority)
                .unwrap_or(self.slots.len()),
            InsertionPolicy::InsertBeforeCurrent => 0,
            InsertionPolicy::Replace => self
                .slots
                .iter()
                .filter(|slot| slot.priority > priority)
                .count(),
        }
    }

    /// Queues `action` and returns its new slot id and position.
    pub fn insert(
        &mut self,
        action: Box<dyn Action>,
        priority: Priority,
        policy: InsertionPolicy,
    ) -> Insertion {
        let evicted = if policy == InsertionPolicy::Replace {
            let (kept, evicted): (Vec<Slot>, Vec<Slot>) = std::mem::take(&mut self.slots)
                .into_iter()
                .partition(|slot| slot.priority > priority);
            self.slots = kept;
            evicted
        } else {
            Vec::new()
        };

        let index = self.insertion_index(priority, policy);
        let id = self.allocate_id();
        self.slots.insert(
            index,
            Slot {
                id,
                priority,
                flags: SlotFlags::empty(),
                action,
            },
        );
        Insertion { id, index, evicted }
    }

    /// Appends without reordering; used when rebuilding a plan from a snapshot
    /// whose order is already valid.
    pub(crate) fn push_restored(&mut self, action: Box<dyn Action>, priority: Priority) -> ActionId {
        let id = self.allocate_id();
        self.slots.push(Slot {
            id,
            priority,
            flags: SlotFlags::empty(),
            action,
        });
        id
    }

    fn allocate_id(&mut self) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn current(&self) -> Option<&Slot> {
        self.slots.first()
    }

    pub fn current_mut(&mut self) -> Option<&mut Slot> {
        self.slots.first_mut()
    }

    pub fn current_priority(&self) -> Option<Priority> {
        self.current().map(Slot::priority)
    }

    /// First queued action of type `T`, front to back.
    pub fn get_action<T: Action>(&self) -> Option<&T> {
        self.slots.iter().find_map(|slot| downcast_ref::<T>(&*slot.action))
    }

    pub fn get_action_mut<T: Action>(&mut self) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .find_map(|slot| downcast_mut::<T>(&mut *slot.action))
    }

    /// First slot whose action satisfies `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&dyn Action) -> bool) -> Option<&Slot> {
        self.slots.iter().find(|slot| predicate(&*slot.action))
    }

    pub fn index_of(&self, id: ActionId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    pub fn slot(&self, id: ActionId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn slot_mut(&mut self, id: ActionId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    pub(crate) fn slot_at_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// Removes and returns the slot with `id`.
    pub fn remove(&mut self, id: ActionId) -> Option<Slot> {
        let index = self.index_of(id)?;
        Some(self.slots.remove(index))
    }

    /// Removes every slot, front to back.
    pub fn take_all(&mut self) -> Vec<Slot> {
        std::mem::take(&mut self.slots)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;

    fn push(plan: &mut ActionPlan, name: &'static str, priority: u8, policy: InsertionPolicy) {
        plan.insert(Box::new(Probe::named(name)), Priority(priority), policy);
    }

    fn order(plan: &ActionPlan) -> Vec<&'static str> {
        plan.iter()
            .map(|slot| {
                downcast_ref::<Probe>(slot.action())
                    .map(|probe| probe.name)
                    .unwrap_or("?")
            })
            .collect()
    }

    #[test]
    fn ascending_pushes_put_highest_priority_first() {
        let mut plan = ActionPlan::new();
        for (name, priority) in [("a", 10), ("b", 10), ("c", 20), ("d", 20), ("e", 30)] {
            push(&mut plan, name, priority, InsertionPolicy::AppendToBack);
        }

        assert_eq!(order(&plan), ["e", "c", "d", "a", "b"]);
        assert_eq!(plan.current_priority(), Some(Priority(30)));
    }

    #[test]
    fn equal_priority_keeps_fifo_order() {
        let mut plan = ActionPlan::new();
        for name in ["first", "second", "third"] {
            push(&mut plan, name, 20, InsertionPolicy::AppendToBack);
        }

        assert_eq!(order(&plan), ["first", "second", "third"]);
    }

    #[test]
    fn front_insertion_jumps_ties_but_not_higher_priorities() {
        let mut plan = ActionPlan::new();
        push(&mut plan, "high", 50, InsertionPolicy::AppendToBack);
        push(&mut plan, "tie", 20, InsertionPolicy::AppendToBack);
        push(&mut plan, "low", 10, InsertionPolicy::AppendToBack);
        push(&mut plan, "jumper", 20, InsertionPolicy::InsertAtFront);

        assert_eq!(order(&plan), ["high", "jumper", "tie", "low"]);
    }

    #[test]
    fn before_current_always_lands_at_index_zero() {
        let mut plan = ActionPlan::new();
        push(&mut plan, "current", 50, InsertionPolicy::AppendToBack);
        push(&mut plan, "helper", 10, InsertionPolicy::InsertBeforeCurrent);

        assert_eq!(order(&plan), ["helper", "current"]);
    }

    #[test]
    fn replace_evicts_lower_or_equal_priorities() {
        let mut plan = ActionPlan::new();
        push(&mut plan, "danger", 80, InsertionPolicy::AppendToBack);
        push(&mut plan, "command", 50, InsertionPolicy::AppendToBack);
        push(&mut plan, "idle", 0, InsertionPolicy::AppendToBack);

        let insertion = plan.insert(
            Box::new(Probe::named("new")),
            Priority(50),
            InsertionPolicy::Replace,
        );

        assert_eq!(order(&plan), ["danger", "new"]);
        assert_eq!(insertion.index, 1);
        assert_eq!(insertion.evicted.len(), 2);
    }

    #[test]
    fn ids_are_unique_and_addressable() {
        let mut plan = ActionPlan::new();
        let a = plan
            .insert(Box::new(Probe::named("a")), Priority(10), InsertionPolicy::AppendToBack)
            .id;
        let b = plan
            .insert(Box::new(Probe::named("b")), Priority(20), InsertionPolicy::AppendToBack)
            .id;

        assert_ne!(a, b);
        assert_eq!(plan.index_of(b), Some(0));
        assert!(plan.remove(a).is_some());
        assert!(plan.remove(a).is_none());
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn typed_lookup_returns_first_match() {
        let mut plan = ActionPlan::new();
        push(&mut plan, "first", 20, InsertionPolicy::AppendToBack);
        push(&mut plan, "second", 20, InsertionPolicy::AppendToBack);

        assert_eq!(plan.get_action::<Probe>().map(|p| p.name), Some("first"));
        assert!(plan.find(|action| action.type_name() == "missing").is_none());
    }
}
