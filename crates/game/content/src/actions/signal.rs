use game_core::{
    Action, ActionContext, ActionResult, ActionState, ActionType, ActionTypeId, BinarySerializer,
    CodecError, FieldInfo, FieldValue, Message,
};
use state_machine::{StateMachine, Transition, drive};
use strum::{EnumIter, FromRepr, IntoStaticStr};

use crate::kinds::messages;

/// States of [`SignalAction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u16)]
pub enum SignalState {
    #[default]
    Init = 0,
    Sent = 1,
}

impl ActionState for SignalState {
    const NAME: &'static str = "SignalState";

    fn to_raw(self) -> u16 {
        self as u16
    }

    fn from_raw(raw: u16) -> Option<Self> {
        Self::from_repr(raw)
    }
}

/// Publishes one message and completes within the same tick.
///
/// Typically queued behind other actions as a follow-up marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalAction {
    state: SignalState,
    message: Message,
}

impl Default for SignalAction {
    fn default() -> Self {
        Self::new(Message::new(messages::SIGNAL))
    }
}

impl SignalAction {
    pub fn new(message: Message) -> Self {
        Self {
            state: SignalState::Init,
            message,
        }
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn message(&self) -> &Message {
        &self.message
    }
}

impl StateMachine<ActionContext<'_, '_>> for SignalAction {
    type State = SignalState;

    fn state(&self) -> SignalState {
        self.state
    }

    fn set_state(&mut self, state: SignalState) {
        self.state = state;
    }

    fn step(
        &mut self,
        state: SignalState,
        ctx: &mut ActionContext<'_, '_>,
    ) -> Transition<SignalState> {
        match state {
            SignalState::Init => {
                ctx.publish(self.message.clone());
                Transition::Next(SignalState::Sent)
            }
            SignalState::Sent => Transition::Finish,
        }
    }
}

impl Action for SignalAction {
    fn action_type(&self) -> ActionTypeId {
        Self::TYPE_ID
    }

    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn update(&mut self, ctx: &mut ActionContext<'_, '_>) -> ActionResult {
        drive(self, ctx)
    }

    fn serialize(&mut self, serializer: &mut BinarySerializer<'_>) -> Result<(), CodecError> {
        serializer.state(&mut self.state)?;
        serializer.value(&mut self.message)
    }

    fn describe_fields(&self) -> Vec<FieldInfo> {
        let mut fields = vec![
            FieldInfo::new("state", FieldValue::State(self.state.into())),
            FieldInfo::new("message", FieldValue::Number(u64::from(self.message.id.0))),
        ];
        fields.extend(
            self.message
                .params
                .iter()
                .map(|param| FieldInfo::new("param", FieldValue::Number(*param))),
        );
        fields
    }

    fn is_same_intent(&self, other: &dyn Action) -> bool {
        game_core::downcast_ref::<Self>(other).is_some_and(|other| other.message == self.message)
    }
}

impl ActionType for SignalAction {
    const NAME: &'static str = "signal";
}
