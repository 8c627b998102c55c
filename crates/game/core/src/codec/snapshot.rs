//! Whole-plan snapshot layout.
//!
//! ```text
//! plan    := "APLN" · version u8 · count u32 · slot*
//! slot    := priority u8 · type_id u32 · payload_len u32 · payload
//! payload := state u16 · fields...
//! ```
//!
//! Slot ids are not persisted. Actions come back unstarted, in queue order.
use tracing::warn;

use super::{BinarySerializer, CodecError};
use crate::action::ActionRegistry;
use crate::plan::ActionPlan;
use crate::state::{ActionTypeId, Priority};

pub const PLAN_MAGIC: [u8; 4] = *b"APLN";
pub const FORMAT_VERSION: u8 = 1;

fn length_prefix(len: usize) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::PayloadTooLarge { len })
}

/// Encodes every queued action front to back.
pub fn encode_plan(plan: &mut ActionPlan) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(16 + plan.len() * 32);
    out.extend_from_slice(&PLAN_MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&length_prefix(plan.len())?.to_le_bytes());

    let mut payload = Vec::new();
    for slot in plan.iter_mut() {
        payload.clear();
        slot.action
            .serialize(&mut BinarySerializer::writer(&mut payload))?;

        out.push(slot.priority.value());
        out.extend_from_slice(&slot.action.action_type().0.to_le_bytes());
        out.extend_from_slice(&length_prefix(payload.len())?.to_le_bytes());
        out.extend_from_slice(&payload);
    }
    Ok(out)
}

/// Decodes a snapshot, rejecting it as a whole on any unknown or malformed
/// action.
pub fn decode_plan(bytes: &[u8], registry: &ActionRegistry) -> Result<ActionPlan, CodecError> {
    decode(bytes, registry).inspect_err(|error| {
        warn!(target: "game_core::codec", %error, "plan snapshot rejected");
    })
}

fn decode(bytes: &[u8], registry: &ActionRegistry) -> Result<ActionPlan, CodecError> {
    let mut reader = Reader { bytes, position: 0 };

    if reader.take(PLAN_MAGIC.len())? != PLAN_MAGIC {
        return Err(CodecError::BadMagic);
    }
    let version = reader.u8()?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let count = reader.u32()?;
    let mut plan = ActionPlan::new();
    for _ in 0..count {
        let priority = Priority(reader.u8()?);
        let type_id = ActionTypeId(reader.u32()?);
        let len = reader.u32()? as usize;
        let payload = reader.take(len)?;

        let mut action = registry
            .create(type_id)
            .ok_or(CodecError::UnknownActionType(type_id))?;
        let mut serializer = BinarySerializer::reader(payload);
        action.serialize(&mut serializer)?;
        if serializer.remaining() != 0 {
            return Err(CodecError::TrailingBytes {
                action: action.type_name(),
                remaining: serializer.remaining(),
            });
        }

        plan.push_restored(action, priority);
    }

    if reader.remaining() != 0 {
        return Err(CodecError::TrailingBytes {
            action: "plan",
            remaining: reader.remaining(),
        });
    }
    Ok(plan)
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let available = self.remaining();
        if needed > available {
            return Err(CodecError::UnexpectedEnd { needed, available });
        }
        let slice = &self.bytes[self.position..self.position + needed];
        self.position += needed;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }
}
