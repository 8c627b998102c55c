//! Binary serialization of action state and whole plans.
//!
//! Every value is encoded with bincode's fixed-width little-endian integer
//! encoding, so the layout of a payload is exactly the sequence of fields an
//! action visits in [`crate::action::Action::serialize`]. The same method is
//! used for reading and writing: [`BinarySerializer`] carries the direction.
mod snapshot;

pub use snapshot::{FORMAT_VERSION, PLAN_MAGIC, decode_plan, encode_plan};

use core::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ErrorSeverity, GameError};
use crate::state::ActionTypeId;

/// Errors raised while encoding or decoding action state.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEnd { needed: usize, available: usize },

    #[error("snapshot does not start with the plan magic")]
    BadMagic,

    #[error("unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    #[error("unknown action type {0}")]
    UnknownActionType(ActionTypeId),

    #[error("invalid state discriminant {raw} for `{state}`")]
    InvalidState { raw: u16, state: &'static str },

    #[error("action `{action}` left {remaining} payload bytes unread")]
    TrailingBytes {
        action: &'static str,
        remaining: usize,
    },

    #[error("payload of {len} bytes exceeds the u32 length prefix")]
    PayloadTooLarge { len: usize },

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl GameError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            // A snapshot we cannot fully understand must be rejected as a whole;
            // loading part of it would desynchronize replicated sessions.
            CodecError::UnknownActionType(_)
            | CodecError::UnsupportedVersion { .. }
            | CodecError::BadMagic => ErrorSeverity::Fatal,
            CodecError::UnexpectedEnd { .. }
            | CodecError::InvalidState { .. }
            | CodecError::TrailingBytes { .. }
            | CodecError::Bincode(_) => ErrorSeverity::Validation,
            CodecError::PayloadTooLarge { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CodecError::UnexpectedEnd { .. } => "CODEC_UNEXPECTED_END",
            CodecError::BadMagic => "CODEC_BAD_MAGIC",
            CodecError::UnsupportedVersion { .. } => "CODEC_UNSUPPORTED_VERSION",
            CodecError::UnknownActionType(_) => "CODEC_UNKNOWN_ACTION_TYPE",
            CodecError::InvalidState { .. } => "CODEC_INVALID_STATE",
            CodecError::TrailingBytes { .. } => "CODEC_TRAILING_BYTES",
            CodecError::PayloadTooLarge { .. } => "CODEC_PAYLOAD_TOO_LARGE",
            CodecError::Bincode(_) => "CODEC_BINCODE",
        }
    }
}

/// State enum of an action, persisted as a 16-bit discriminant.
pub trait ActionState: Copy + Eq + Debug {
    /// Name used in error messages.
    const NAME: &'static str;

    fn to_raw(self) -> u16;

    fn from_raw(raw: u16) -> Option<Self>;
}

enum Direction<'a> {
    Write(&'a mut Vec<u8>),
    Read { bytes: &'a [u8], position: usize },
}

/// Symmetric reader/writer handed to [`crate::action::Action::serialize`].
///
/// Writing appends each visited value to the buffer; reading overwrites each
/// visited value with the next one from the input.
pub struct BinarySerializer<'a> {
    direction: Direction<'a>,
}

impl<'a> BinarySerializer<'a> {
    /// Serializer that appends to `buffer`.
    pub fn writer(buffer: &'a mut Vec<u8>) -> Self {
        Self {
            direction: Direction::Write(buffer),
        }
    }

    /// Serializer that reads from `bytes`.
    pub fn reader(bytes: &'a [u8]) -> Self {
        Self {
            direction: Direction::Read { bytes, position: 0 },
        }
    }

    pub fn is_reading(&self) -> bool {
        matches!(self.direction, Direction::Read { .. })
    }

    /// Visits a plain value.
    pub fn value<T>(&mut self, value: &mut T) -> Result<(), CodecError>
    where
        T: Serialize + DeserializeOwned,
    {
        match &mut self.direction {
            Direction::Write(buffer) => {
                bincode::serialize_into(&mut **buffer, value)?;
            }
            Direction::Read { bytes, position } => {
                let mut cursor = &bytes[*position..];
                let before = cursor.len();
                *value = bincode::deserialize_from(&mut cursor)?;
                *position += before - cursor.len();
            }
        }
        Ok(())
    }

    /// Visits a state enum as its 16-bit discriminant.
    pub fn state<S: ActionState>(&mut self, state: &mut S) -> Result<(), CodecError> {
        let mut raw = state.to_raw();
        self.value(&mut raw)?;
        if self.is_reading() {
            *state = S::from_raw(raw).ok_or(CodecError::InvalidState {
                raw,
                state: S::NAME,
            })?;
        }
        Ok(())
    }

    /// Bytes not yet consumed (always zero for writers).
    pub fn remaining(&self) -> usize {
        match &self.direction {
            Direction::Write(_) => 0,
            Direction::Read { bytes, position } => bytes.len() - position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityId;
    use core::time::Duration;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Phase {
        Init,
        Running,
    }

    impl ActionState for Phase {
        const NAME: &'static str = "Phase";

        fn to_raw(self) -> u16 {
            match self {
                Phase::Init => 0,
                Phase::Running => 1,
            }
        }

        fn from_raw(raw: u16) -> Option<Self> {
            match raw {
                0 => Some(Phase::Init),
                1 => Some(Phase::Running),
                _ => None,
            }
        }
    }

    #[test]
    fn fields_are_fixed_width_little_endian() {
        let mut buffer = Vec::new();
        let mut writer = BinarySerializer::writer(&mut buffer);
        let mut state = Phase::Running;
        let mut target = EntityId(0x0102);
        writer.state(&mut state).unwrap();
        writer.value(&mut target).unwrap();

        assert_eq!(hex::encode(&buffer), "01000201000000000000");
    }

    #[test]
    fn reader_restores_written_fields() {
        let mut buffer = Vec::new();
        {
            let mut writer = BinarySerializer::writer(&mut buffer);
            writer.state(&mut Phase::Running).unwrap();
            writer.value(&mut Duration::from_millis(1500)).unwrap();
        }

        let mut reader = BinarySerializer::reader(&buffer);
        let mut state = Phase::Init;
        let mut duration = Duration::ZERO;
        reader.state(&mut state).unwrap();
        reader.value(&mut duration).unwrap();

        assert_eq!(state, Phase::Running);
        assert_eq!(duration, Duration::from_millis(1500));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn unknown_state_discriminant_is_rejected() {
        let buffer = 7u16.to_le_bytes().to_vec();
        let mut reader = BinarySerializer::reader(&buffer);
        let mut state = Phase::Init;

        let err = reader.state(&mut state).unwrap_err();
        assert!(matches!(err, CodecError::InvalidState { raw: 7, .. }));
    }

    #[test]
    fn short_input_fails() {
        let buffer = [1u8];
        let mut reader = BinarySerializer::reader(&buffer);
        let mut value = 0u64;
        assert!(reader.value(&mut value).is_err());
    }
}
