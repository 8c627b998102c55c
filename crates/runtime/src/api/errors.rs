//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, plan operations, the snapshot
//! codec and repositories so clients can bubble them up with one type.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{CodecError, EntityId, ErrorSeverity, GameError, PlanError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("entity {0} has no action plan")]
    NoPlan(EntityId),

    #[error("snapshot '{0}' not found")]
    SnapshotNotFound(String),

    #[error("no snapshot repository configured")]
    RepositoryNotConfigured,

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::UnknownEntity(_) | RuntimeError::NoPlan(_) => ErrorSeverity::Validation,
            RuntimeError::SnapshotNotFound(_) | RuntimeError::RepositoryNotConfigured => {
                ErrorSeverity::Recoverable
            }
            RuntimeError::Plan(err) => err.severity(),
            RuntimeError::Codec(err) => err.severity(),
            RuntimeError::Repository(_) => ErrorSeverity::Recoverable,
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::UnknownEntity(_) => "RUNTIME_UNKNOWN_ENTITY",
            RuntimeError::NoPlan(_) => "RUNTIME_NO_PLAN",
            RuntimeError::SnapshotNotFound(_) => "RUNTIME_SNAPSHOT_NOT_FOUND",
            RuntimeError::RepositoryNotConfigured => "RUNTIME_NO_REPOSITORY",
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::Plan(err) => err.error_code(),
            RuntimeError::Codec(err) => err.error_code(),
            RuntimeError::Repository(_) => "RUNTIME_REPOSITORY",
        }
    }
}
