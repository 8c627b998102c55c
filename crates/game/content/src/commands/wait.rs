use core::time::Duration;

use game_core::{ActionComponent, EntityLookup, InsertionPolicy, Priority};

use super::{Command, CommandOutcome, push_unless_queued};
use crate::actions::WaitAction;

/// Orders an entity to idle for a while.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitCommand {
    pub duration: Duration,
    pub priority: Priority,
}

impl WaitCommand {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            priority: Priority::COMMAND_STD,
        }
    }
}

impl Command for WaitCommand {
    fn name(&self) -> &'static str {
        "wait"
    }

    fn execute(&self, component: &mut ActionComponent, _world: &dyn EntityLookup) -> CommandOutcome {
        push_unless_queued(
            component,
            WaitAction::new(self.duration),
            self.priority,
            InsertionPolicy::AppendToBack,
        )
    }
}
