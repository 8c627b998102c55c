//! Common error infrastructure for game-core.
//!
//! This module provides the severity classification shared by every error
//! type in the crate, plus [`PlanError`] for plan and registry operations.
//! Codec failures live next to the codec in [`crate::codec::CodecError`].
//!
//! # Design Principles
//!
//! - **Expected failures are not errors**: an action whose `on_startup`
//!   returns `false` simply does not run; nothing here models that case
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Contract violations panic**: broken invariants are asserted, not returned

use crate::state::{ActionId, ActionTypeId};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed on retry
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable; continuing would desynchronize or corrupt state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised by plan and registry operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("action {0} is not in the plan")]
    ActionNotFound(ActionId),

    #[error("action type {0} is not registered")]
    UnregisteredType(ActionTypeId),

    #[error("action type id {id} of `{new}` collides with `{existing}`")]
    TypeIdCollision {
        id: ActionTypeId,
        existing: &'static str,
        new: &'static str,
    },
}

impl GameError for PlanError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PlanError::ActionNotFound(_) => ErrorSeverity::Validation,
            PlanError::UnregisteredType(_) => ErrorSeverity::Validation,
            PlanError::TypeIdCollision { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PlanError::ActionNotFound(_) => "PLAN_ACTION_NOT_FOUND",
            PlanError::UnregisteredType(_) => "PLAN_UNREGISTERED_TYPE",
            PlanError::TypeIdCollision { .. } => "PLAN_TYPE_ID_COLLISION",
        }
    }
}
