//! Single-entity sandbox for exercising actions in unit tests.
use core::time::Duration;

use game_core::{
    ActionComponent, ActionContext, ActionId, Clock, EntityId, EntitySet, MessageHub, PlanRequest,
    PlanStatus, ReservationRegistry, Services, WorldCommand, WorldCommands,
};

use crate::kinds::components;

pub const WORKER: EntityId = EntityId(1);
pub const TREE: EntityId = EntityId(10);

pub struct Sandbox {
    pub world: EntitySet,
    pub reservations: ReservationRegistry,
    pub messages: MessageHub,
    pub commands: WorldCommands,
    pub requests: Vec<PlanRequest>,
    pub clock: Clock,
}

impl Sandbox {
    /// A worker actor and one workable target.
    pub fn new() -> Self {
        let mut world = EntitySet::new();
        world.insert(WORKER, [components::ACTOR]);
        world.insert(TREE, [components::WORKABLE]);
        Self {
            world,
            reservations: ReservationRegistry::new(),
            messages: MessageHub::new(),
            commands: WorldCommands::default(),
            requests: Vec::new(),
            clock: Clock::default(),
        }
    }

    pub fn services(&mut self) -> Services<'_> {
        Services::new(
            &self.world,
            &mut self.reservations,
            &mut self.messages,
            &mut self.commands,
        )
    }

    /// Calls `f` with a context for `entity` at the current clock.
    pub fn with_context<R>(
        &mut self,
        entity: EntityId,
        f: impl FnOnce(&mut ActionContext<'_, '_>) -> R,
    ) -> R {
        let mut services = Services::new(
            &self.world,
            &mut self.reservations,
            &mut self.messages,
            &mut self.commands,
        );
        let mut ctx = ActionContext::new(entity, ActionId(0), self.clock, &mut services, &mut self.requests);
        f(&mut ctx)
    }

    pub fn advance(&mut self, delta: Duration) {
        self.clock = self.clock.advance(delta);
    }

    /// One frame: tick the component, apply world commands, deliver messages.
    pub fn frame(&mut self, component: &mut ActionComponent, delta: Duration) -> PlanStatus {
        self.advance(delta);
        let clock = self.clock;
        let status = component.update(clock, &mut self.services());
        self.apply_commands();
        self.deliver(component);
        status
    }

    pub fn apply_commands(&mut self) {
        for command in self.commands.drain() {
            match command {
                WorldCommand::Spawn {
                    entity, components, ..
                } => self.world.insert(entity, components),
                WorldCommand::Destroy { entity } => {
                    self.world.remove(entity);
                }
            }
        }
    }

    pub fn deliver(&mut self, component: &mut ActionComponent) {
        for delivery in self.messages.drain_deliveries() {
            for listener in delivery.listeners {
                if listener.entity == component.entity() {
                    component.deliver_message(listener.action, &delivery.message, &mut self.services());
                }
            }
        }
    }
}
