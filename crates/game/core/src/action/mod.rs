//! The action abstraction: a resumable, prioritized unit of entity behaviour.
//!
//! # Lifecycle
//!
//! 1. Constructed and configured by the caller, then pushed onto a plan
//! 2. `on_startup` once it becomes the current action; `false` means
//!    "cannot run" and is an ordinary outcome, not an error
//! 3. `update` every tick while current, until it returns `Done`
//! 4. `on_shutdown` whenever it stops being current (completion,
//!    interruption, removal, plan clear) and once for actions that are removed
//!    without ever having started
//!
//! An interrupted action keeps its internal state and stays queued; it is
//! started again (another `on_startup`) when it reaches the front.
//!
//! # Module Structure
//!
//! - `context`: per-call dependency injection ([`ActionContext`], [`Services`])
//! - `fields`: reflection-style field listing for tooling
//! - `registry`: type id to factory table used by the codec

mod context;
mod fields;
mod registry;

pub use context::{ActionContext, PlanRequest, Services};
pub use fields::{FieldInfo, FieldValue};
pub use registry::{ActionFactory, ActionRegistry};

/// Per-tick result of an action: keep ticking or finished.
pub use state_machine::Progress as ActionResult;

use core::any::Any;
use core::fmt::Debug;

use crate::codec::{BinarySerializer, CodecError};
use crate::env::Message;
use crate::state::ActionTypeId;

/// Object-safe access to [`Any`] for downcasting queued actions.
///
/// Call it on `&dyn Action`, never on `Box<dyn Action>` (the box itself is
/// `Any` too).
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A resumable unit of behaviour owned by exactly one plan slot.
pub trait Action: AsAny + Send + Debug {
    /// Stable discriminator of the concrete type.
    fn action_type(&self) -> ActionTypeId;

    /// Registered name of the concrete type.
    fn type_name(&self) -> &'static str;

    /// Called once each time the action becomes current.
    ///
    /// Returns `false` if the action cannot run (target gone, out of range,
    /// reservation denied). `update` is then never called for this attempt,
    /// but `on_shutdown` still is.
    fn on_startup(&mut self, _ctx: &mut ActionContext<'_, '_>) -> bool {
        true
    }

    /// Advances the action by one tick.
    fn update(&mut self, ctx: &mut ActionContext<'_, '_>) -> ActionResult;

    /// Releases everything acquired since `on_startup`.
    ///
    /// Must be safe to call in any state, including before `on_startup` ever
    /// ran and after a previous `on_shutdown`.
    fn on_shutdown(&mut self, _ctx: &mut ActionContext<'_, '_>) {}

    /// Receives a message this action subscribed to.
    fn on_message(&mut self, _message: &Message, _ctx: &mut ActionContext<'_, '_>) {}

    /// Reads or writes the state enum followed by every field needed to
    /// resume. Entity references are persisted as ids; only handles owned by
    /// collaborators (reservations, subscriptions) are re-acquired in
    /// `on_startup`.
    fn serialize(&mut self, serializer: &mut BinarySerializer<'_>) -> Result<(), CodecError>;

    /// Ordered field listing for inspection tools.
    fn describe_fields(&self) -> Vec<FieldInfo> {
        Vec::new()
    }

    /// Returns true if `other` expresses the same intent as `self`, so that
    /// pushing it again would be redundant.
    ///
    /// The default only compares type ids, which treats every pair of
    /// same-type actions as one intent. Actions that carry a target or other
    /// parameters must override it and compare those too.
    fn is_same_intent(&self, other: &dyn Action) -> bool {
        self.action_type() == other.action_type()
    }
}

/// Static identity of a concrete action type.
///
/// Implemented by every action that can be reconstructed from a snapshot.
pub trait ActionType: Action + Default + Sized {
    /// Registered name; hashed into [`ActionType::TYPE_ID`].
    const NAME: &'static str;

    const TYPE_ID: ActionTypeId = ActionTypeId::from_name(Self::NAME);
}

/// Downcasts a queued action to its concrete type.
pub fn downcast_ref<T: Action>(action: &dyn Action) -> Option<&T> {
    action.as_any().downcast_ref::<T>()
}

/// Mutable variant of [`downcast_ref`].
pub fn downcast_mut<T: Action>(action: &mut dyn Action) -> Option<&mut T> {
    action.as_any_mut().downcast_mut::<T>()
}
