use core::fmt;
use core::time::Duration;

use serde::Serialize;

use crate::state::EntityId;

/// A single inspectable field value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FieldValue {
    Entity(EntityId),
    Duration(Duration),
    State(&'static str),
    Number(u64),
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Entity(entity) => write!(f, "entity {entity}"),
            FieldValue::Duration(duration) => write!(f, "{:.3}s", duration.as_secs_f64()),
            FieldValue::State(state) => f.write_str(state),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Flag(value) => write!(f, "{value}"),
        }
    }
}

/// Named field of an action, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: &'static str,
    pub value: FieldValue,
}

impl FieldInfo {
    pub fn new(name: &'static str, value: FieldValue) -> Self {
        Self { name, value }
    }
}

impl fmt::Display for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}
