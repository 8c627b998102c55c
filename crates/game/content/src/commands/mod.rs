//! Intent layer that turns player or AI orders into plan pushes.
//!
//! Commands are idempotent: re-issuing an order whose intent is already queued
//! leaves the plan untouched.
mod wait;
mod work;

pub use wait::WaitCommand;
pub use work::WorkOnTargetCommand;

use game_core::{Action, ActionComponent, ActionId, EntityLookup, InsertionPolicy, Priority};
use tracing::debug;

/// Result of executing a [`Command`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A new action was queued.
    Pushed(ActionId),
    /// An action with the same intent is already queued.
    AlreadyQueued(ActionId),
    /// The plan is running a blocking action.
    Blocked,
    /// The order cannot apply to the current world.
    Rejected(&'static str),
}

impl CommandOutcome {
    pub fn is_pushed(&self) -> bool {
        matches!(self, CommandOutcome::Pushed(_))
    }
}

/// An order addressed to one entity's plan.
pub trait Command {
    fn name(&self) -> &'static str;

    fn execute(&self, component: &mut ActionComponent, world: &dyn EntityLookup) -> CommandOutcome;
}

/// Pushes `action` unless the plan is blocked or already holds the same intent.
pub fn push_unless_queued(
    component: &mut ActionComponent,
    action: impl Action,
    priority: Priority,
    policy: InsertionPolicy,
) -> CommandOutcome {
    if component.is_blocked() && !priority.is_blocking() {
        debug!(
            target: "game_content::command",
            entity = %component.entity(),
            kind = action.type_name(),
            "plan is blocked"
        );
        return CommandOutcome::Blocked;
    }
    if let Some(slot) = component.find_action(|queued| action.is_same_intent(queued)) {
        return CommandOutcome::AlreadyQueued(slot.id());
    }
    CommandOutcome::Pushed(component.push_boxed(Box::new(action), priority, policy))
}
