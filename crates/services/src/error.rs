//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by session services.
///
/// Every variant reports an operation the session refused; the session is
/// left exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no multiple-choice exercises to play")]
    NothingToPlay,
    #[error("session already started")]
    AlreadyStarted,
    #[error("session has not started")]
    NotStarted,
    #[error("round {index} is not accepting answers")]
    NotAnswering { index: usize },
    #[error("session already completed")]
    Completed,
    #[error("session was cancelled")]
    Cancelled,
}
