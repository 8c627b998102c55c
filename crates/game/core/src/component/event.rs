use serde::Serialize;

use crate::state::{ActionId, ActionTypeId, Priority};

/// Lifecycle notifications emitted by an [`super::ActionComponent`].
///
/// Events accumulate in the component's outbox until drained by the owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlanEvent {
    Pushed {
        action: ActionId,
        name: &'static str,
        priority: Priority,
        index: usize,
    },
    Started {
        action: ActionId,
        name: &'static str,
        /// True if the action had been interrupted before.
        resumed: bool,
    },
    StartupRejected {
        action: ActionId,
        name: &'static str,
    },
    Finished {
        action: ActionId,
        name: &'static str,
    },
    Interrupted {
        action: ActionId,
        name: &'static str,
    },
    Removed {
        action: ActionId,
        name: &'static str,
        /// True if the action was running when removed.
        started: bool,
    },
    Cleared {
        count: usize,
    },
}

impl PlanEvent {
    /// The action the event is about, if any.
    pub fn action(&self) -> Option<ActionId> {
        match self {
            PlanEvent::Pushed { action, .. }
            | PlanEvent::Started { action, .. }
            | PlanEvent::StartupRejected { action, .. }
            | PlanEvent::Finished { action, .. }
            | PlanEvent::Interrupted { action, .. }
            | PlanEvent::Removed { action, .. } => Some(*action),
            PlanEvent::Cleared { .. } => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanEvent::Pushed { .. } => "pushed",
            PlanEvent::Started { .. } => "started",
            PlanEvent::StartupRejected { .. } => "startup_rejected",
            PlanEvent::Finished { .. } => "finished",
            PlanEvent::Interrupted { .. } => "interrupted",
            PlanEvent::Removed { .. } => "removed",
            PlanEvent::Cleared { .. } => "cleared",
        }
    }
}

/// What the scheduler learns from one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PlanStatus {
    /// Nothing queued.
    Idle,
    /// At least one action is queued or running.
    Running,
    /// The component is deactivated and was not ticked.
    Inactive,
}

/// Read-only summary of one queued action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub id: ActionId,
    pub priority: Priority,
    pub type_id: ActionTypeId,
    pub type_name: &'static str,
    pub started: bool,
}
