//! Entity store and the collaborators every action plan runs against.
//!
//! [`World`] owns the entity registry, the reservation registry, the message
//! hub, the deferred world-command queue and one [`ActionComponent`] per
//! planning entity. Entities carrying the `actor` component get a plan
//! automatically.
use std::collections::BTreeMap;

use game_content::{Command, CommandOutcome};
use game_content::kinds::components::ACTOR;
use game_content::kinds::messages::ENTITY_DESTROYED;
use game_core::{
    Action, ActionComponent, ActionId, ActionRegistry, Clock, ComponentKind, EntityId,
    EntityLookup, EntitySet, InsertionPolicy, Message, MessageBus, MessageHub, PlanConfig,
    PlanEvent, Priority, ReservationRegistry, Services, WorldCommand, WorldCommands,
};
use tracing::{debug, trace, warn};

use crate::api::{Result, RuntimeError};
use crate::repository::{EntityRecord, WorldSnapshot};

/// Structural change applied to the world, reported once per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldChange {
    Spawned { entity: EntityId, owner: EntityId },
    Destroyed { entity: EntityId },
}

#[derive(Debug, Default)]
pub struct World {
    entities: EntitySet,
    reservations: ReservationRegistry,
    messages: MessageHub,
    commands: WorldCommands,
    plans: BTreeMap<EntityId, ActionComponent>,
    plan_config: PlanConfig,
    /// Events of components that no longer exist.
    orphaned_events: Vec<(EntityId, PlanEvent)>,
    changes: Vec<WorldChange>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan_config(plan_config: PlanConfig) -> Self {
        Self {
            plan_config,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------------

    /// Creates an entity with a freshly allocated id.
    pub fn spawn(&mut self, components: impl IntoIterator<Item = ComponentKind>) -> EntityId {
        let entity = self.commands.allocator_mut().allocate();
        self.insert_entity(entity, components);
        entity
    }

    /// Creates (or replaces) an entity under a caller-chosen id.
    pub fn insert_entity(
        &mut self,
        entity: EntityId,
        components: impl IntoIterator<Item = ComponentKind>,
    ) {
        self.commands.allocator_mut().observe(entity);
        self.entities.insert(entity, components);
        if self.entities.has_component(entity, ACTOR) {
            self.attach_plan(entity);
        }
    }

    /// Attaches a component kind; `actor` also attaches an action plan.
    pub fn add_component(&mut self, entity: EntityId, kind: ComponentKind) -> Result<()> {
        if !self.entities.add_component(entity, kind) {
            return Err(RuntimeError::UnknownEntity(entity));
        }
        if kind == ACTOR {
            self.attach_plan(entity);
        }
        Ok(())
    }

    fn attach_plan(&mut self, entity: EntityId) {
        let config = self.plan_config.clone();
        self.plans
            .entry(entity)
            .or_insert_with(|| ActionComponent::with_config(entity, config));
    }

    /// Destroys `entity` immediately.
    ///
    /// Its plan is cleared with shutdown, its reservations are released,
    /// its message proxies are dropped and `ENTITY_DESTROYED` is published so
    /// actions targeting it can abort. Returns false if it did not exist.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }

        if let Some(mut plan) = self.plans.remove(&entity) {
            let mut services = Services::new(
                &self.entities,
                &mut self.reservations,
                &mut self.messages,
                &mut self.commands,
            );
            plan.clear_plan(&mut services);
            self.orphaned_events
                .extend(plan.drain_events().into_iter().map(|event| (entity, event)));
        }

        let released = self.reservations.release_all(entity);
        let holder = self.reservations.forget_target(entity);
        let proxies = self.messages.unregister_entity(entity);
        self.entities.remove(entity);
        self.messages
            .publish(Message::new(ENTITY_DESTROYED).with_param(entity.0));
        self.changes.push(WorldChange::Destroyed { entity });

        debug!(
            %entity,
            released,
            reserved_by = ?holder,
            proxies,
            "entity destroyed"
        );
        true
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn reservations(&self) -> &ReservationRegistry {
        &self.reservations
    }

    pub fn messages(&self) -> &MessageHub {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ------------------------------------------------------------------------
    // Plans
    // ------------------------------------------------------------------------

    pub fn plan(&self, entity: EntityId) -> Option<&ActionComponent> {
        self.plans.get(&entity)
    }

    pub fn plan_mut(&mut self, entity: EntityId) -> Result<&mut ActionComponent> {
        if !self.entities.is_alive(entity) {
            return Err(RuntimeError::UnknownEntity(entity));
        }
        self.plans
            .get_mut(&entity)
            .ok_or(RuntimeError::NoPlan(entity))
    }

    /// Planning entities in ascending id order.
    pub fn plans(&self) -> impl Iterator<Item = &ActionComponent> {
        self.plans.values()
    }

    pub fn push(
        &mut self,
        entity: EntityId,
        action: Box<dyn Action>,
        priority: Priority,
        policy: InsertionPolicy,
    ) -> Result<ActionId> {
        Ok(self.plan_mut(entity)?.push_boxed(action, priority, policy))
    }

    /// Runs a command against the plan of `entity`.
    pub fn execute(&mut self, entity: EntityId, command: &dyn Command) -> Result<CommandOutcome> {
        if !self.entities.is_alive(entity) {
            return Err(RuntimeError::UnknownEntity(entity));
        }
        let plan = self
            .plans
            .get_mut(&entity)
            .ok_or(RuntimeError::NoPlan(entity))?;
        let outcome = command.execute(plan, &self.entities);
        trace!(%entity, command = command.name(), ?outcome, "command executed");
        Ok(outcome)
    }

    pub fn remove_action(&mut self, entity: EntityId, action: ActionId) -> Result<()> {
        let plan = self
            .plans
            .get_mut(&entity)
            .ok_or(RuntimeError::NoPlan(entity))?;
        let mut services = Services::new(
            &self.entities,
            &mut self.reservations,
            &mut self.messages,
            &mut self.commands,
        );
        plan.remove_action(action, &mut services)?;
        Ok(())
    }

    pub fn clear_plan(&mut self, entity: EntityId) -> Result<()> {
        let plan = self
            .plans
            .get_mut(&entity)
            .ok_or(RuntimeError::NoPlan(entity))?;
        let mut services = Services::new(
            &self.entities,
            &mut self.reservations,
            &mut self.messages,
            &mut self.commands,
        );
        plan.clear_plan(&mut services);
        Ok(())
    }

    /// Clears every plan, shutting down running actions.
    pub fn clear_all_plans(&mut self) {
        let mut services = Services::new(
            &self.entities,
            &mut self.reservations,
            &mut self.messages,
            &mut self.commands,
        );
        for plan in self.plans.values_mut() {
            plan.clear_plan(&mut services);
        }
    }

    pub fn set_active(&mut self, entity: EntityId, active: bool) -> Result<()> {
        self.plan_mut(entity)?.set_active(active);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Frame phases
    // ------------------------------------------------------------------------

    /// Ticks every active plan in ascending entity order.
    ///
    /// Returns how many plans ran an update.
    pub fn update(&mut self, clock: Clock) -> usize {
        let mut services = Services::new(
            &self.entities,
            &mut self.reservations,
            &mut self.messages,
            &mut self.commands,
        );
        let mut updated = 0;
        for plan in self.plans.values_mut() {
            if plan.is_active() {
                plan.update(clock, &mut services);
                updated += 1;
            }
        }
        updated
    }

    /// Applies deferred spawns and destroys in request order.
    ///
    /// Destroys may queue further commands (shutdown of the destroyed
    /// entity's actions); those are applied in the same call.
    pub fn apply_commands(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let batch = self.commands.drain();
            if batch.is_empty() {
                return applied;
            }
            for command in batch {
                applied += 1;
                match command {
                    WorldCommand::Spawn {
                        entity,
                        owner,
                        components,
                    } => {
                        self.insert_entity(entity, components);
                        self.changes.push(WorldChange::Spawned { entity, owner });
                        trace!(%entity, %owner, "entity spawned");
                    }
                    WorldCommand::Destroy { entity } => {
                        if !self.destroy(entity) {
                            trace!(%entity, "destroy of missing entity ignored");
                        }
                    }
                }
            }
        }
    }

    /// Delivers queued messages to their listeners.
    ///
    /// Messages published by listeners during delivery are handled in
    /// further rounds, up to `max_rounds`; anything left stays queued.
    pub fn deliver_messages(&mut self, max_rounds: usize) -> usize {
        let mut delivered = 0;
        for _ in 0..max_rounds {
            if self.messages.pending() == 0 {
                return delivered;
            }
            let deliveries = self.messages.drain_deliveries();
            let mut services = Services::new(
                &self.entities,
                &mut self.reservations,
                &mut self.messages,
                &mut self.commands,
            );
            for delivery in deliveries {
                for listener in delivery.listeners {
                    let Some(plan) = self.plans.get_mut(&listener.entity) else {
                        continue;
                    };
                    if plan.deliver_message(listener.action, &delivery.message, &mut services) {
                        delivered += 1;
                    }
                }
            }
        }
        if self.messages.pending() > 0 {
            warn!(
                pending = self.messages.pending(),
                max_rounds, "message delivery did not settle; remaining messages deferred"
            );
        }
        delivered
    }

    pub fn has_pending_work(&self) -> bool {
        !self.commands.is_empty() || self.messages.pending() > 0
    }

    /// Takes plan events of every component, in entity order.
    pub fn drain_events(&mut self) -> Vec<(EntityId, PlanEvent)> {
        let mut events = std::mem::take(&mut self.orphaned_events);
        for (entity, plan) in &mut self.plans {
            events.extend(plan.drain_events().into_iter().map(|event| (*entity, event)));
        }
        events
    }

    pub fn drain_changes(&mut self) -> Vec<WorldChange> {
        std::mem::take(&mut self.changes)
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// Captures every entity and encoded plan.
    ///
    /// Meant to be called at a frame boundary, after commands and messages
    /// have been applied.
    pub fn snapshot(&mut self, frame: u64) -> Result<WorldSnapshot> {
        let ids: Vec<EntityId> = self.entities.ids().collect();
        let mut entities = Vec::with_capacity(ids.len());
        for entity in ids {
            let components = self
                .entities
                .components(entity)
                .map(<[ComponentKind]>::to_vec)
                .unwrap_or_default();
            let (plan, active) = match self.plans.get_mut(&entity) {
                Some(plan) => (Some(plan.save()?), plan.is_active()),
                None => (None, true),
            };
            entities.push(EntityRecord {
                entity,
                components,
                plan,
                active,
            });
        }

        Ok(WorldSnapshot {
            frame,
            allocator: *self.commands.allocator(),
            entities,
        })
    }

    /// Rebuilds a world from a snapshot.
    ///
    /// Restored actions are unstarted; the front action of each plan starts
    /// on the next update and re-acquires reservations and subscriptions.
    pub fn from_snapshot(
        snapshot: &WorldSnapshot,
        registry: &ActionRegistry,
        plan_config: PlanConfig,
    ) -> Result<Self> {
        let mut world = Self::with_plan_config(plan_config.clone());
        *world.commands.allocator_mut() = snapshot.allocator;

        for record in &snapshot.entities {
            world
                .entities
                .insert(record.entity, record.components.iter().copied());
            world.commands.allocator_mut().observe(record.entity);

            if let Some(bytes) = &record.plan {
                let mut plan = ActionComponent::from_snapshot(
                    record.entity,
                    bytes,
                    registry,
                    plan_config.clone(),
                )?;
                plan.set_active(record.active);
                world.plans.insert(record.entity, plan);
            }
        }
        Ok(world)
    }
}

impl EntityLookup for World {
    fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    fn has_component(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.entities.has_component(entity, kind)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use game_content::kinds::components::WORKABLE;
    use game_content::{WaitAction, WorkOnTargetAction, builtin_registry};
    use game_core::Reservations;

    use super::*;

    fn clock(frame: u64, millis: u64) -> Clock {
        Clock::new(frame, Duration::from_millis(millis))
    }

    fn work(target: EntityId) -> Box<dyn Action> {
        Box::new(WorkOnTargetAction::new(
            target,
            Duration::from_millis(100),
            Duration::from_millis(500),
        ))
    }

    #[test]
    fn actors_get_a_plan() {
        let mut world = World::new();
        let worker = world.spawn([ACTOR]);
        let tree = world.spawn([WORKABLE]);

        assert!(world.plan(worker).is_some());
        assert!(world.plan(tree).is_none());
        assert!(matches!(
            world.push(tree, work(worker), Priority::COMMAND_STD, InsertionPolicy::default()),
            Err(RuntimeError::NoPlan(_))
        ));

        world.add_component(tree, ACTOR).unwrap();
        assert!(world.plan(tree).is_some());
    }

    #[test]
    fn destroying_a_worker_releases_its_reservation() {
        let mut world = World::new();
        let worker = world.spawn([ACTOR]);
        let tree = world.spawn([WORKABLE]);
        world
            .push(worker, work(tree), Priority::COMMAND_STD, InsertionPolicy::default())
            .unwrap();

        world.update(clock(0, 16));
        assert_eq!(world.reservations().holder(tree), Some(worker));

        assert!(world.destroy(worker));
        assert_eq!(world.reservations().holder(tree), None);
        assert!(!world.is_alive(worker));
        assert!(!world.destroy(worker));
    }

    #[test]
    fn destroying_a_target_aborts_the_worker() {
        let mut world = World::new();
        let worker = world.spawn([ACTOR]);
        let tree = world.spawn([WORKABLE]);
        world
            .push(worker, work(tree), Priority::COMMAND_STD, InsertionPolicy::default())
            .unwrap();
        world.update(clock(0, 16));
        world.apply_commands();
        world.drain_events();

        world.destroy(tree);
        assert!(world.deliver_messages(4) >= 1);
        world.update(clock(1, 16));
        world.apply_commands();

        let plan = world.plan(worker).unwrap();
        assert!(plan.is_empty());
        assert!(world.drain_events().iter().any(|(entity, event)| {
            *entity == worker && matches!(event, PlanEvent::Finished { .. })
        }));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn spawn_commands_apply_between_ticks() {
        let mut world = World::new();
        let worker = world.spawn([ACTOR]);
        let tree = world.spawn([WORKABLE]);
        world
            .push(worker, work(tree), Priority::COMMAND_STD, InsertionPolicy::default())
            .unwrap();

        // Prepare (100 ms) completes inside the first tick; the effect entity
        // is requested but not yet present.
        world.update(clock(0, 150));
        world.update(clock(1, 16));
        let before = world.len();
        assert!(world.apply_commands() >= 1);
        assert_eq!(world.len(), before + 1);
        assert!(
            world
                .drain_changes()
                .iter()
                .any(|change| matches!(change, WorldChange::Spawned { owner, .. } if *owner == worker))
        );
    }

    #[test]
    fn snapshot_restores_unstarted_plans() {
        let registry = builtin_registry().unwrap();
        let mut world = World::new();
        let worker = world.spawn([ACTOR]);
        let idle = world.spawn([ACTOR]);
        world.set_active(idle, false).unwrap();
        world
            .push(
                worker,
                Box::new(WaitAction::new(Duration::from_secs(10))),
                Priority::COMMAND_STD,
                InsertionPolicy::default(),
            )
            .unwrap();
        world.update(clock(0, 5_000));

        let snapshot = world.snapshot(1).unwrap();
        let mut restored = World::from_snapshot(&snapshot, &registry, PlanConfig::default()).unwrap();

        assert_eq!(restored.len(), 2);
        assert!(!restored.plan(idle).unwrap().is_active());
        let wait = restored.plan(worker).unwrap().get_action::<WaitAction>().unwrap();
        assert_eq!(wait.remaining(), Duration::from_secs(5));

        // Fresh ids continue past the restored ones.
        let next = restored.spawn([]);
        assert!(next > idle);
    }
}
