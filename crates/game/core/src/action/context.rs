//! Dependency injection for action hooks.

use core::time::Duration;

use super::Action;
use crate::env::{EntityLookup, ListenerId, Message, MessageBus, MessageConfig, Reservations, WorldCommands};
use crate::plan::InsertionPolicy;
use crate::state::{ActionId, Clock, EntityId, Priority};

/// Engine collaborators borrowed for the duration of one call into a plan.
pub struct Services<'a> {
    pub world: &'a dyn EntityLookup,
    pub reservations: &'a mut dyn Reservations,
    pub messages: &'a mut dyn MessageBus,
    pub commands: &'a mut WorldCommands,
}

impl<'a> Services<'a> {
    pub fn new(
        world: &'a dyn EntityLookup,
        reservations: &'a mut dyn Reservations,
        messages: &'a mut dyn MessageBus,
        commands: &'a mut WorldCommands,
    ) -> Self {
        Self {
            world,
            reservations,
            messages,
            commands,
        }
    }
}

/// A plan mutation requested from inside a hook.
///
/// Requests are applied by the owning component after the hook returns, so an
/// action is never interrupted in the middle of its own call.
#[derive(Debug)]
pub enum PlanRequest {
    Push {
        action: Box<dyn Action>,
        priority: Priority,
        policy: InsertionPolicy,
    },
    Clear,
}

/// Everything an action may touch while one of its hooks runs.
pub struct ActionContext<'a, 'b> {
    entity: EntityId,
    action: ActionId,
    clock: Clock,
    services: &'b mut Services<'a>,
    requests: &'b mut Vec<PlanRequest>,
}

impl<'a, 'b> ActionContext<'a, 'b> {
    pub fn new(
        entity: EntityId,
        action: ActionId,
        clock: Clock,
        services: &'b mut Services<'a>,
        requests: &'b mut Vec<PlanRequest>,
    ) -> Self {
        Self {
            entity,
            action,
            clock,
            services,
            requests,
        }
    }

    /// The entity owning the plan.
    #[inline]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The slot id of the running action.
    #[inline]
    pub fn action_id(&self) -> ActionId {
        self.action
    }

    /// Message listener id of the running action.
    #[inline]
    pub fn listener(&self) -> ListenerId {
        ListenerId {
            entity: self.entity,
            action: self.action,
        }
    }

    #[inline]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Time elapsed since the previous tick.
    #[inline]
    pub fn time_passed(&self) -> Duration {
        self.clock.time_passed
    }

    pub fn world(&self) -> &'a dyn EntityLookup {
        self.services.world
    }

    pub fn reservations(&mut self) -> &mut (dyn Reservations + 'a) {
        &mut *self.services.reservations
    }

    pub fn messages(&mut self) -> &mut (dyn MessageBus + 'a) {
        &mut *self.services.messages
    }

    pub fn commands(&mut self) -> &mut WorldCommands {
        &mut *self.services.commands
    }

    /// Subscribes the running action to `config`.
    pub fn register_message(&mut self, config: MessageConfig) {
        let listener = self.listener();
        self.services.messages.register(config, listener);
    }

    /// Drops every subscription of the running action.
    pub fn unregister_messages(&mut self) -> usize {
        let listener = self.listener();
        self.services.messages.unregister(listener)
    }

    /// Publishes a message with the owning entity as sender.
    pub fn publish(&mut self, message: Message) {
        let message = message.with_sender(self.entity);
        self.services.messages.publish(message);
    }

    /// Requests a push onto the owning plan once the current hook returns.
    pub fn push_action(&mut self, action: impl Action, priority: Priority, policy: InsertionPolicy) {
        self.requests.push(PlanRequest::Push {
            action: Box::new(action),
            priority,
            policy,
        });
    }

    /// Requests clearing the owning plan once the current hook returns.
    pub fn clear_plan(&mut self) {
        self.requests.push(PlanRequest::Clear);
    }
}
