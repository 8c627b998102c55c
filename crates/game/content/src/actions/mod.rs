//! Builtin actions.
//!
//! Each action is a [`state_machine::StateMachine`] over its own `#[repr(u16)]`
//! state enum, driven once per `update`. The state enum is the first field of
//! every payload.
mod signal;
mod wait;
mod work;

pub use signal::{SignalAction, SignalState};
pub use wait::{WaitAction, WaitState};
pub use work::{WorkOnTargetAction, WorkState};

use game_core::{ActionRegistry, PlanError};

/// Registry containing every builtin action type.
pub fn builtin_registry() -> Result<ActionRegistry, PlanError> {
    ActionRegistry::new()
        .with::<WaitAction>()?
        .with::<WorkOnTargetAction>()?
        .with::<SignalAction>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::ActionType;

    #[test]
    fn builtin_type_ids_do_not_collide() {
        let registry = builtin_registry().unwrap();

        assert_eq!(registry.len(), 3);
        for id in [WaitAction::TYPE_ID, WorkOnTargetAction::TYPE_ID, SignalAction::TYPE_ID] {
            assert!(registry.contains(id));
        }
    }

    #[test]
    fn builtin_intents_compare_parameters_not_just_type() {
        use core::time::Duration;
        use game_core::{Action, EntityId, Message};

        use crate::kinds::messages;

        let second = Duration::from_secs(1);
        let work = |target| WorkOnTargetAction::new(EntityId(target), second, second);
        assert!(work(10).is_same_intent(&work(10)));
        assert!(!work(10).is_same_intent(&work(11)));

        assert!(WaitAction::new(second).is_same_intent(&WaitAction::new(second)));
        assert!(!WaitAction::new(second).is_same_intent(&WaitAction::new(2 * second)));

        let signal = |param| SignalAction::new(Message::new(messages::SIGNAL).with_param(param));
        assert!(signal(1).is_same_intent(&signal(1)));
        assert!(!signal(1).is_same_intent(&signal(2)));
        assert!(!signal(1).is_same_intent(&WaitAction::new(second)));
    }
}
