use core::time::Duration;

use game_core::{
    Action, ActionContext, ActionResult, ActionState, ActionType, ActionTypeId, BinarySerializer,
    CodecError, FieldInfo, FieldValue,
};
use state_machine::{Countdown, StateMachine, Transition, drive};
use strum::{EnumIter, FromRepr, IntoStaticStr};

/// States of [`WaitAction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromRepr, EnumIter, IntoStaticStr)]
#[repr(u16)]
pub enum WaitState {
    #[default]
    Init = 0,
    Waiting = 1,
}

impl ActionState for WaitState {
    const NAME: &'static str = "WaitState";

    fn to_raw(self) -> u16 {
        self as u16
    }

    fn from_raw(raw: u16) -> Option<Self> {
        Self::from_repr(raw)
    }
}

/// Does nothing for a fixed amount of time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaitAction {
    state: WaitState,
    timer: Countdown,
}

impl WaitAction {
    pub fn new(duration: Duration) -> Self {
        let mut action = Self::default();
        action.init(duration);
        action
    }

    /// Second construction phase after a default push.
    pub fn init(&mut self, duration: Duration) -> &mut Self {
        self.state = WaitState::Init;
        self.timer = Countdown::new(duration);
        self
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    pub fn duration(&self) -> Duration {
        self.timer.duration()
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }
}

impl StateMachine<ActionContext<'_, '_>> for WaitAction {
    type State = WaitState;

    fn state(&self) -> WaitState {
        self.state
    }

    fn set_state(&mut self, state: WaitState) {
        self.state = state;
    }

    fn step(&mut self, state: WaitState, ctx: &mut ActionContext<'_, '_>) -> Transition<WaitState> {
        match state {
            WaitState::Init => {
                self.timer.restart();
                Transition::Next(WaitState::Waiting)
            }
            WaitState::Waiting => {
                if self.timer.tick(ctx.time_passed()) {
                    Transition::Finish
                } else {
                    Transition::Stay
                }
            }
        }
    }
}

impl Action for WaitAction {
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
        serializer.value(&mut self.timer)
    }

    fn describe_fields(&self) -> Vec<FieldInfo> {
        vec![
            FieldInfo::new("state", FieldValue::State(self.state.into())),
            FieldInfo::new("duration", FieldValue::Duration(self.timer.duration())),
            FieldInfo::new("remaining", FieldValue::Duration(self.timer.remaining())),
        ]
    }

    fn is_same_intent(&self, other: &dyn Action) -> bool {
        game_core::downcast_ref::<Self>(other)
            .is_some_and(|other| other.duration() == self.duration())
    }
}

impl ActionType for WaitAction {
    const NAME: &'static str = "wait";
}
