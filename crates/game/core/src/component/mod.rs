//! Per-entity driver of an [`ActionPlan`].
//!
//! # Tick protocol
//!
//! Each [`ActionComponent::update`]:
//! 1. settles pending changes: evicted slots and started actions that are no
//!    longer at the front receive `on_shutdown` (interruption happens here,
//!    between ticks, never inside a hook)
//! 2. starts the front action if it is not running; a rejected startup removes
//!    it and the next one is tried within the same tick (bounded by
//!    [`PlanConfig::max_startups_per_tick`])
//! 3. updates the running front action once; on `Done` it is shut down and
//!    removed, and its successor starts on the next tick
//!
//! Plan changes requested by hooks through the context are queued and applied
//! after the hook returns.
mod event;

pub use event::{PlanEntry, PlanEvent, PlanStatus};

use tracing::{debug, trace, warn};

use crate::action::{
    Action, ActionContext, ActionRegistry, ActionType, PlanRequest, Services, downcast_mut,
};
use crate::codec::{CodecError, decode_plan, encode_plan};
use crate::config::PlanConfig;
use crate::env::Message;
use crate::error::PlanError;
use crate::plan::{ActionPlan, InsertionPolicy, Slot, SlotFlags};
use crate::state::{ActionId, Clock, EntityId, Priority};

/// Owns and drives the action plan of one entity.
#[derive(Debug)]
pub struct ActionComponent {
    entity: EntityId,
    plan: ActionPlan,
    /// Slots evicted by a replacing push, awaiting `on_shutdown`.
    retired: Vec<Slot>,
    requests: Vec<PlanRequest>,
    events: Vec<PlanEvent>,
    active: bool,
    clock: Clock,
    config: PlanConfig,
}

/// Runs `on_shutdown` and clears the running flag.
fn shut_down(
    entity: EntityId,
    clock: Clock,
    slot: &mut Slot,
    services: &mut Services<'_>,
    requests: &mut Vec<PlanRequest>,
) {
    let mut ctx = ActionContext::new(entity, slot.id, clock, services, requests);
    slot.action.on_shutdown(&mut ctx);
    slot.flags.remove(SlotFlags::STARTED);
}

impl ActionComponent {
    pub fn new(entity: EntityId) -> Self {
        Self::with_config(entity, PlanConfig::default())
    }

    pub fn with_config(entity: EntityId, config: PlanConfig) -> Self {
        Self {
            entity,
            plan: ActionPlan::new(),
            retired: Vec::new(),
            requests: Vec::new(),
            events: Vec::new(),
            active: true,
            clock: Clock::default(),
            config,
        }
    }

    /// Rebuilds a component from [`ActionComponent::save`] output.
    ///
    /// No action is started; the front one starts on the next update.
    pub fn from_snapshot(
        entity: EntityId,
        bytes: &[u8],
        registry: &ActionRegistry,
        config: PlanConfig,
    ) -> Result<Self, CodecError> {
        let plan = decode_plan(bytes, registry)?;
        Ok(Self {
            plan,
            ..Self::with_config(entity, config)
        })
    }

    #[inline]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn plan(&self) -> &ActionPlan {
        &self.plan
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Clock of the most recent update.
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Inactive components are skipped by [`ActionComponent::update`].
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    // ------------------------------------------------------------------------
    // Plan mutation
    // ------------------------------------------------------------------------

    /// Queues `action` and returns it for further initialization.
    ///
    /// A push that lands in front of a running action interrupts it on the
    /// next update.
    pub fn push_action<T: Action>(
        &mut self,
        action: T,
        priority: Priority,
        policy: InsertionPolicy,
    ) -> &mut T {
        let id = self.push_boxed(Box::new(action), priority, policy);
        self.plan
            .slot_mut(id)
            .and_then(|slot| downcast_mut::<T>(&mut *slot.action))
            .expect("freshly pushed action must be queued under its own type")
    }

    /// Queues a default-constructed `T`.
    pub fn push_default<T: ActionType>(
        &mut self,
        priority: Priority,
        policy: InsertionPolicy,
    ) -> &mut T {
        self.push_action(T::default(), priority, policy)
    }

    /// Type-erased push.
    pub fn push_boxed(
        &mut self,
        action: Box<dyn Action>,
        priority: Priority,
        policy: InsertionPolicy,
    ) -> ActionId {
        let name = action.type_name();
        let insertion = self.plan.insert(action, priority, policy);
        trace!(
            target: "game_core::component",
            entity = %self.entity,
            action = %insertion.id,
            kind = name,
            %priority,
            index = insertion.index,
            ?policy,
            "action pushed"
        );
        self.events.push(PlanEvent::Pushed {
            action: insertion.id,
            name,
            priority,
            index: insertion.index,
        });
        self.retired.extend(insertion.evicted);
        insertion.id
    }

    /// Shuts down and removes every action, front to back.
    ///
    /// Plan requests raised by the shutdown hooks are discarded.
    pub fn clear_plan(&mut self, services: &mut Services<'_>) {
        let count = self.plan.len();
        let mut slots = std::mem::take(&mut self.retired);
        slots.extend(self.plan.take_all());

        for mut slot in slots {
            self.remove_slot(&mut slot, services);
        }
        self.requests.clear();

        debug!(
            target: "game_core::component",
            entity = %self.entity,
            count,
            "plan cleared"
        );
        self.events.push(PlanEvent::Cleared { count });
    }

    /// Removes a single action wherever it is queued.
    pub fn remove_action(
        &mut self,
        id: ActionId,
        services: &mut Services<'_>,
    ) -> Result<(), PlanError> {
        let mut slot = self.plan.remove(id).ok_or(PlanError::ActionNotFound(id))?;
        self.remove_slot(&mut slot, services);
        self.settle(services);
        Ok(())
    }

    /// Replaces the plan with a decoded snapshot after clearing the current one.
    pub fn restore(
        &mut self,
        bytes: &[u8],
        registry: &ActionRegistry,
        services: &mut Services<'_>,
    ) -> Result<(), CodecError> {
        let plan = decode_plan(bytes, registry)?;
        self.clear_plan(services);
        self.plan = plan;
        Ok(())
    }

    /// Encodes the queued actions in order.
    pub fn save(&mut self) -> Result<Vec<u8>, CodecError> {
        encode_plan(&mut self.plan)
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances the plan by one tick.
    pub fn update(&mut self, clock: Clock, services: &mut Services<'_>) -> PlanStatus {
        if !self.active {
            return PlanStatus::Inactive;
        }
        self.clock = clock;
        self.settle(services);

        let entity = self.entity;
        let mut startups = 0;
        loop {
            let Some(slot) = self.plan.current_mut() else {
                break;
            };
            let id = slot.id;
            let name = slot.action.type_name();

            if !slot.is_started() {
                if startups == self.config.max_startups_per_tick {
                    debug!(
                        target: "game_core::component",
                        %entity,
                        startups,
                        "startup budget exhausted for this tick"
                    );
                    break;
                }
                startups += 1;

                let resumed = slot.was_interrupted();
                let accepted = {
                    let mut ctx =
                        ActionContext::new(entity, id, clock, services, &mut self.requests);
                    slot.action.on_startup(&mut ctx)
                };

                if accepted {
                    slot.flags.insert(SlotFlags::STARTED);
                    trace!(
                        target: "game_core::component",
                        %entity,
                        action = %id,
                        kind = name,
                        resumed,
                        "action started"
                    );
                    self.events.push(PlanEvent::Started {
                        action: id,
                        name,
                        resumed,
                    });
                } else {
                    debug!(
                        target: "game_core::component",
                        %entity,
                        action = %id,
                        kind = name,
                        "startup rejected"
                    );
                    if let Some(mut slot) = self.plan.remove(id) {
                        shut_down(entity, clock, &mut slot, services, &mut self.requests);
                    }
                    self.events.push(PlanEvent::StartupRejected { action: id, name });
                }
                self.settle(services);
                continue;
            }

            let result = {
                let mut ctx = ActionContext::new(entity, id, clock, services, &mut self.requests);
                slot.action.update(&mut ctx)
            };
            if result.is_done() {
                if let Some(mut slot) = self.plan.remove(id) {
                    shut_down(entity, clock, &mut slot, services, &mut self.requests);
                }
                trace!(
                    target: "game_core::component",
                    %entity,
                    action = %id,
                    kind = name,
                    "action finished"
                );
                self.events.push(PlanEvent::Finished { action: id, name });
            }
            self.settle(services);
            break;
        }

        self.status()
    }

    /// Hands `message` to the action with `id`.
    ///
    /// Returns false if the action is no longer queued.
    pub fn deliver_message(
        &mut self,
        id: ActionId,
        message: &Message,
        services: &mut Services<'_>,
    ) -> bool {
        let entity = self.entity;
        let clock = self.clock;
        let Some(slot) = self.plan.slot_mut(id) else {
            trace!(
                target: "game_core::component",
                %entity,
                action = %id,
                "message for stale listener dropped"
            );
            return false;
        };
        {
            let mut ctx = ActionContext::new(entity, id, clock, services, &mut self.requests);
            slot.action.on_message(message, &mut ctx);
        }
        self.settle(services);
        true
    }

    /// Applies deferred requests and interrupts displaced actions until the
    /// plan is stable.
    fn settle(&mut self, services: &mut Services<'_>) {
        let mut rounds = 0;
        loop {
            for mut slot in std::mem::take(&mut self.retired) {
                self.remove_slot(&mut slot, services);
            }
            self.interrupt_displaced(services);

            if self.requests.is_empty() {
                break;
            }
            if rounds == self.config.max_request_rounds {
                warn!(
                    target: "game_core::component",
                    entity = %self.entity,
                    dropped = self.requests.len(),
                    "plan request rounds exhausted"
                );
                self.requests.clear();
                break;
            }
            rounds += 1;

            for request in std::mem::take(&mut self.requests) {
                match request {
                    PlanRequest::Push {
                        action,
                        priority,
                        policy,
                    } => {
                        self.push_boxed(action, priority, policy);
                    }
                    PlanRequest::Clear => self.clear_plan(services),
                }
            }
        }
    }

    fn interrupt_displaced(&mut self, services: &mut Services<'_>) {
        let entity = self.entity;
        let clock = self.clock;
        for slot in self.plan.iter_mut().skip(1) {
            if !slot.is_started() {
                continue;
            }
            shut_down(entity, clock, slot, services, &mut self.requests);
            slot.flags.insert(SlotFlags::INTERRUPTED);

            let name = slot.action.type_name();
            trace!(
                target: "game_core::component",
                %entity,
                action = %slot.id,
                kind = name,
                "action interrupted"
            );
            self.events.push(PlanEvent::Interrupted {
                action: slot.id,
                name,
            });
        }
    }

    /// Shutdown bookkeeping for a slot already taken out of the plan.
    fn remove_slot(&mut self, slot: &mut Slot, services: &mut Services<'_>) {
        let started = slot.is_started();
        if slot.needs_shutdown() {
            shut_down(self.entity, self.clock, slot, services, &mut self.requests);
        }
        self.events.push(PlanEvent::Removed {
            action: slot.id,
            name: slot.action.type_name(),
            started,
        });
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn status(&self) -> PlanStatus {
        if !self.active {
            PlanStatus::Inactive
        } else if self.plan.is_empty() {
            PlanStatus::Idle
        } else {
            PlanStatus::Running
        }
    }

    /// First queued action of type `T`.
    pub fn get_action<T: Action>(&self) -> Option<&T> {
        self.plan.get_action::<T>()
    }

    pub fn get_action_mut<T: Action>(&mut self) -> Option<&mut T> {
        self.plan.get_action_mut::<T>()
    }

    /// First queued action satisfying `predicate`.
    pub fn find_action(&self, predicate: impl FnMut(&dyn Action) -> bool) -> Option<&Slot> {
        self.plan.find(predicate)
    }

    /// The front action, whether or not it has started yet.
    pub fn current_action(&self) -> Option<&dyn Action> {
        self.plan.current().map(Slot::action)
    }

    pub fn current_action_id(&self) -> Option<ActionId> {
        self.plan.current().map(Slot::id)
    }

    pub fn current_priority(&self) -> Option<Priority> {
        self.plan.current_priority()
    }

    /// True if the current action has at least [`Priority::BLOCKING`].
    pub fn is_blocked(&self) -> bool {
        self.current_priority().is_some_and(Priority::is_blocking)
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PlanEntry> + '_ {
        self.plan.iter().map(|slot| PlanEntry {
            id: slot.id(),
            priority: slot.priority(),
            type_id: slot.action().action_type(),
            type_name: slot.action().type_name(),
            started: slot.is_started(),
        })
    }

    /// Takes all events emitted since the previous drain.
    pub fn drain_events(&mut self) -> Vec<PlanEvent> {
        std::mem::take(&mut self.events)
    }
}
