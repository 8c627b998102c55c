use core::time::Duration;

use game_core::{ActionComponent, EntityId, EntityLookup, InsertionPolicy, Priority};

use super::{Command, CommandOutcome, push_unless_queued};
use crate::actions::WorkOnTargetAction;
use crate::kinds::components;

/// Orders an entity to work on a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkOnTargetCommand {
    pub target: EntityId,
    pub prepare: Duration,
    pub work: Duration,
    pub priority: Priority,
    pub policy: InsertionPolicy,
}

impl WorkOnTargetCommand {
    pub fn new(target: EntityId, prepare: Duration, work: Duration) -> Self {
        Self {
            target,
            prepare,
            work,
            priority: Priority::COMMAND_STD,
            policy: InsertionPolicy::AppendToBack,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: InsertionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Command for WorkOnTargetCommand {
    fn name(&self) -> &'static str {
        "work_on_target"
    }

    fn execute(&self, component: &mut ActionComponent, world: &dyn EntityLookup) -> CommandOutcome {
        if !world.has_component(self.target, components::WORKABLE) {
            return CommandOutcome::Rejected("target is not workable");
        }
        push_unless_queued(
            component,
            WorkOnTargetAction::new(self.target, self.prepare, self.work),
            self.priority,
            self.policy,
        )
    }
}
