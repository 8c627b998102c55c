//! Reserve a target, prepare, work on it, then announce completion.
//!
//! | state      | leaves via                         | kind       |
//! |------------|------------------------------------|------------|
//! | `Init`     | timers reset, into `Prepare`       | free       |
//! | `Prepare`  | countdown expired, into `Working`  | tick-gated |
//! | `Working`  | countdown expired, into `Finished` | free       |
//! | `Finished` | publishes `WORK_FINISHED`, done    | free       |
//!
//! `Prepare` hands over to `Working` at the end of the tick so that one tick's
//! elapsed time is never counted against both countdowns.
use core::time::Duration;

use game_core::{
    Action, ActionContext, ActionResult, ActionState, ActionType, ActionTypeId, BinarySerializer,
    CodecError, EntityId, FieldInfo, FieldValue, Message, MessageConfig,
};
use state_machine::{Countdown, StateMachine, Transition, drive};
use strum::{EnumIter, FromRepr, IntoStaticStr};
use tracing::debug;

use crate::kinds::{components, messages};

/// States of [`WorkOnTargetAction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u16)]
pub enum WorkState {
    #[default]
    Init = 0,
    Prepare = 1,
    Working = 2,
    Finished = 3,
}

impl ActionState for WorkState {
    const NAME: &'static str = "WorkState";

    fn to_raw(self) -> u16 {
        self as u16
    }

    fn from_raw(raw: u16) -> Option<Self> {
        Self::from_repr(raw)
    }
}

/// Works on a reserved target entity for a fixed time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkOnTargetAction {
    state: WorkState,
    target: EntityId,
    prepare: Countdown,
    work: Countdown,
    // Persisted: a restored world still holds the effect entity.
    effect: EntityId,
    reserved: bool,
    target_lost: bool,
}

impl Default for WorkOnTargetAction {
    fn default() -> Self {
        Self {
            state: WorkState::Init,
            target: EntityId::NONE,
            prepare: Countdown::default(),
            work: Countdown::default(),
            effect: EntityId::NONE,
            reserved: false,
            target_lost: false,
        }
    }
}

impl WorkOnTargetAction {
    pub fn new(target: EntityId, prepare: Duration, work: Duration) -> Self {
        let mut action = Self::default();
        action.init(target, prepare, work);
        action
    }

    /// Second construction phase after a default push.
    pub fn init(&mut self, target: EntityId, prepare: Duration, work: Duration) -> &mut Self {
        self.state = WorkState::Init;
        self.target = target;
        self.prepare = Countdown::new(prepare);
        self.work = Countdown::new(work);
        self
    }

    pub fn state(&self) -> WorkState {
        self.state
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    /// Helper entity spawned while working, or [`EntityId::NONE`].
    pub fn effect(&self) -> EntityId {
        self.effect
    }

    /// Spawns the effect entity unless a live one is already attached.
    fn spawn_effect(&mut self, ctx: &mut ActionContext<'_, '_>) {
        if !self.effect.is_none() && ctx.world().has_component(self.effect, components::EFFECT) {
            return;
        }
        let owner = ctx.entity();
        self.effect = ctx.commands().spawn(owner, [components::EFFECT]);
    }
}

impl StateMachine<ActionContext<'_, '_>> for WorkOnTargetAction {
    type State = WorkState;

    fn state(&self) -> WorkState {
        self.state
    }

    fn set_state(&mut self, state: WorkState) {
        self.state = state;
    }

    fn step(&mut self, state: WorkState, ctx: &mut ActionContext<'_, '_>) -> Transition<WorkState> {
        match state {
            WorkState::Init => {
                self.prepare.restart();
                self.work.restart();
                Transition::Next(WorkState::Prepare)
            }
            WorkState::Prepare => {
                if !self.prepare.tick(ctx.time_passed()) {
                    return Transition::Stay;
                }
                self.spawn_effect(ctx);
                Transition::Yield(WorkState::Working)
            }
            WorkState::Working => {
                if self.work.tick(ctx.time_passed()) {
                    Transition::Next(WorkState::Finished)
                } else {
                    Transition::Stay
                }
            }
            WorkState::Finished => {
                let worker = ctx.entity();
                ctx.publish(
                    Message::new(messages::WORK_FINISHED)
                        .with_param(self.target.0)
                        .with_param(worker.0),
                );
                Transition::Finish
            }
        }
    }
}

impl Action for WorkOnTargetAction {
    fn action_type(&self) -> ActionTypeId {
        Self::TYPE_ID
    }

    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn on_startup(&mut self, ctx: &mut ActionContext<'_, '_>) -> bool {
        let worker = ctx.entity();
        let world = ctx.world();
        if !world.is_alive(self.target) {
            debug!(target: "game_content::work", %worker, target = %self.target, "target is gone");
            return false;
        }
        if !world.has_component(self.target, components::WORKABLE) {
            debug!(target: "game_content::work", %worker, target = %self.target, "target is not workable");
            return false;
        }
        if !ctx.reservations().try_acquire(self.target, worker) {
            debug!(target: "game_content::work", %worker, target = %self.target, "target reserved by another actor");
            return false;
        }
        self.reserved = true;
        self.target_lost = false;

        ctx.register_message(
            MessageConfig::new(messages::ENTITY_DESTROYED).with_filter(self.target.0),
        );
        if self.state == WorkState::Working {
            self.spawn_effect(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &mut ActionContext<'_, '_>) -> ActionResult {
        if self.target_lost || !ctx.world().is_alive(self.target) {
            debug!(target: "game_content::work", worker = %ctx.entity(), target = %self.target, "target lost, aborting");
            return ActionResult::Done;
        }
        drive(self, ctx)
    }

    fn on_shutdown(&mut self, ctx: &mut ActionContext<'_, '_>) {
        ctx.unregister_messages();
        if !self.effect.is_none() {
            ctx.commands().destroy(self.effect);
            self.effect = EntityId::NONE;
        }
        if self.reserved {
            let worker = ctx.entity();
            ctx.reservations().release(self.target, worker);
            self.reserved = false;
        }
    }

    fn on_message(&mut self, message: &Message, _ctx: &mut ActionContext<'_, '_>) {
        if message.id == messages::ENTITY_DESTROYED && message.param(0) == Some(self.target.0) {
            self.target_lost = true;
        }
    }

    fn serialize(&mut self, serializer: &mut BinarySerializer<'_>) -> Result<(), CodecError> {
        serializer.state(&mut self.state)?;
        serializer.value(&mut self.target)?;
        serializer.value(&mut self.prepare)?;
        serializer.value(&mut self.work)?;
        serializer.value(&mut self.effect)
    }

    fn describe_fields(&self) -> Vec<FieldInfo> {
        vec![
            FieldInfo::new("state", FieldValue::State(self.state.into())),
            FieldInfo::new("target", FieldValue::Entity(self.target)),
            FieldInfo::new("prepare_remaining", FieldValue::Duration(self.prepare.remaining())),
            FieldInfo::new("work_remaining", FieldValue::Duration(self.work.remaining())),
            FieldInfo::new("effect", FieldValue::Entity(self.effect)),
        ]
    }

    fn is_same_intent(&self, other: &dyn Action) -> bool {
        game_core::downcast_ref::<Self>(other).is_some_and(|other| other.target == self.target)
    }
}

impl ActionType for WorkOnTargetAction {
    const NAME: &'static str = "work_on_target";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Sandbox, TREE, WORKER};
    use game_core::{
        ActionComponent, EntityLookup, InsertionPolicy, ListenerId, MessageBus, PlanEvent,
        Priority, Reservations,
    };
    use strum::IntoEnumIterator;

    const MS_100: Duration = Duration::from_millis(100);

    fn work() -> WorkOnTargetAction {
        WorkOnTargetAction::new(TREE, Duration::from_millis(200), Duration::from_millis(300))
    }

    fn component_with(action: WorkOnTargetAction) -> ActionComponent {
        let mut component = ActionComponent::new(WORKER);
        component.push_action(action, Priority::COMMAND_STD, InsertionPolicy::AppendToBack);
        component
    }

    #[test]
    fn full_run_reserves_spawns_and_reports() {
        let mut sandbox = Sandbox::new();
        let mut component = component_with(work());

        sandbox.frame(&mut component, MS_100);
        assert_eq!(sandbox.reservations.holder(TREE), Some(WORKER));
        assert!(component.get_action::<WorkOnTargetAction>().unwrap().effect().is_none());

        sandbox.frame(&mut component, MS_100);
        let action = component.get_action::<WorkOnTargetAction>().unwrap();
        assert_eq!(action.state(), WorkState::Working);
        let effect = action.effect();
        assert!(sandbox.world.has_component(effect, components::EFFECT));

        sandbox.frame(&mut component, MS_100);
        sandbox.frame(&mut component, MS_100);
        assert!(!component.is_empty());
        sandbox.advance(MS_100);
        let clock = sandbox.clock;
        component.update(clock, &mut sandbox.services());

        assert!(component.is_empty());
        assert_eq!(sandbox.reservations.holder(TREE), None);
        let deliveries = sandbox.messages.drain_deliveries();
        assert!(deliveries.iter().any(|d| d.message.id == messages::WORK_FINISHED
            && d.message.param(0) == Some(TREE.0)
            && d.message.sender == WORKER));
        sandbox.apply_commands();
        assert!(!sandbox.world.is_alive(effect));
    }

    #[test]
    fn startup_rejections_are_quiet_and_complete() {
        let mut sandbox = Sandbox::new();
        sandbox.world.insert(EntityId(11), [components::ACTOR]);
        sandbox.reservations.try_acquire(EntityId(12), EntityId(99));
        sandbox.world.insert(EntityId(12), [components::WORKABLE]);

        for target in [EntityId(404), EntityId(11), EntityId(12)] {
            let action = WorkOnTargetAction::new(target, MS_100, MS_100);
            let mut component = component_with(action);
            sandbox.frame(&mut component, MS_100);

            assert!(component.is_empty(), "{target}");
            assert!(
                component
                    .drain_events()
                    .iter()
                    .any(|e| matches!(e, PlanEvent::StartupRejected { .. }))
            );
        }
        assert_eq!(sandbox.reservations.holder(EntityId(12)), Some(EntityId(99)));
        assert_eq!(sandbox.messages.subscriptions(), 0);
    }

    #[test]
    fn destroyed_target_aborts_on_next_update() {
        let mut sandbox = Sandbox::new();
        let mut component = component_with(work());
        sandbox.frame(&mut component, MS_100);
        sandbox.frame(&mut component, MS_100);
        let effect = component.get_action::<WorkOnTargetAction>().unwrap().effect();

        sandbox.world.remove(TREE);
        sandbox
            .messages
            .publish(Message::new(messages::ENTITY_DESTROYED).with_param(TREE.0));
        sandbox.deliver(&mut component);
        assert!(component.get_action::<WorkOnTargetAction>().unwrap().target_lost);

        sandbox.frame(&mut component, MS_100);
        assert!(component.is_empty());
        assert!(!sandbox.world.is_alive(effect));
        assert_eq!(sandbox.reservations.holder(TREE), None);
        let listener = ListenerId {
            entity: WORKER,
            action: game_core::ActionId(0),
        };
        assert!(!sandbox.messages.is_registered(listener));
    }

    #[test]
    fn interrupted_work_releases_and_reacquires() {
        let mut sandbox = Sandbox::new();
        let mut component = component_with(work());
        sandbox.frame(&mut component, MS_100);
        sandbox.frame(&mut component, MS_100);

        component.push_action(
            crate::WaitAction::new(MS_100),
            Priority::DANGER,
            InsertionPolicy::AppendToBack,
        );
        sandbox.frame(&mut component, MS_100);
        assert_eq!(sandbox.reservations.holder(TREE), None);
        assert_eq!(sandbox.world.len(), 2);

        sandbox.frame(&mut component, MS_100);
        let action = component.get_action::<WorkOnTargetAction>().unwrap();
        assert_eq!(action.state(), WorkState::Working);
        assert!(!action.effect().is_none());
        assert_eq!(sandbox.reservations.holder(TREE), Some(WORKER));
    }

    #[test]
    fn every_state_resumes_identically_after_round_trip() {
        for state in WorkState::iter() {
            let mut original = work();
            original.state = state;
            if state == WorkState::Working {
                original.prepare.tick(Duration::from_millis(200));
                original.work.tick(Duration::from_millis(100));
                original.effect = EntityId(77);
            }

            let mut bytes = Vec::new();
            original
                .serialize(&mut BinarySerializer::writer(&mut bytes))
                .unwrap();
            let mut restored = WorkOnTargetAction::default();
            restored
                .serialize(&mut BinarySerializer::reader(&bytes))
                .unwrap();

            let mut results = Vec::new();
            for action in [&mut original, &mut restored] {
                let mut sandbox = Sandbox::new();
                let mut sequence = Vec::new();
                assert!(sandbox.with_context(WORKER, |ctx| action.on_startup(ctx)));
                for _ in 0..6 {
                    sandbox.advance(MS_100);
                    sequence.push(sandbox.with_context(WORKER, |ctx| action.update(ctx)));
                }
                results.push((sequence, action.state()));
            }
            assert_eq!(results[0], results[1], "{state:?}");
        }
    }

    #[test]
    fn restored_work_reuses_its_live_effect() {
        let mut sandbox = Sandbox::new();
        let effect = EntityId(40);
        sandbox.world.insert(effect, [components::EFFECT]);

        let mut original = work();
        original.state = WorkState::Working;
        original.effect = effect;
        let mut bytes = Vec::new();
        original
            .serialize(&mut BinarySerializer::writer(&mut bytes))
            .unwrap();
        let mut restored = WorkOnTargetAction::default();
        restored
            .serialize(&mut BinarySerializer::reader(&bytes))
            .unwrap();
        assert_eq!(restored.effect(), effect);

        assert!(sandbox.with_context(WORKER, |ctx| restored.on_startup(ctx)));
        sandbox.apply_commands();
        assert_eq!(restored.effect(), effect);
        assert_eq!(sandbox.world.len(), 3);

        sandbox.with_context(WORKER, |ctx| restored.on_shutdown(ctx));
        sandbox.apply_commands();
        assert!(!sandbox.world.is_alive(effect));
    }

    #[test]
    fn restored_work_respawns_a_missing_effect() {
        let mut sandbox = Sandbox::new();
        let mut action = work();
        action.state = WorkState::Working;
        action.effect = EntityId(40);

        assert!(sandbox.with_context(WORKER, |ctx| action.on_startup(ctx)));
        assert_ne!(action.effect(), EntityId(40));
        assert!(!action.effect().is_none());
    }
}
