//! Component kinds and message ids understood by the builtin actions.

/// Component kinds attached to entities.
pub mod components {
    use game_core::ComponentKind;

    /// Marks an entity that actors can work on.
    pub const WORKABLE: ComponentKind = ComponentKind::from_name("workable");
    /// Transient helper entity spawned by a running action.
    pub const EFFECT: ComponentKind = ComponentKind::from_name("effect");
    /// An entity that owns an action plan.
    pub const ACTOR: ComponentKind = ComponentKind::from_name("actor");

    /// Resolves a component kind by its scenario-file name.
    pub fn by_name(name: &str) -> Option<ComponentKind> {
        match name {
            "workable" => Some(WORKABLE),
            "effect" => Some(EFFECT),
            "actor" => Some(ACTOR),
            _ => None,
        }
    }

    pub fn name(kind: ComponentKind) -> Option<&'static str> {
        match kind {
            WORKABLE => Some("workable"),
            EFFECT => Some("effect"),
            ACTOR => Some("actor"),
            _ => None,
        }
    }
}

/// Message ids published by the runtime and the builtin actions.
pub mod messages {
    use game_core::MessageId;

    /// `[destroyed entity]`, published by the world when an entity is destroyed.
    pub const ENTITY_DESTROYED: MessageId = MessageId::from_name("entity_destroyed");
    /// `[target, worker]`, published when a work action completes.
    pub const WORK_FINISHED: MessageId = MessageId::from_name("work_finished");
    /// Free-form message published by [`crate::SignalAction`].
    pub const SIGNAL: MessageId = MessageId::from_name("signal");

    pub fn name(id: MessageId) -> Option<&'static str> {
        match id {
            ENTITY_DESTROYED => Some("entity_destroyed"),
            WORK_FINISHED => Some("work_finished"),
            SIGNAL => Some("signal"),
            _ => None,
        }
    }
}
