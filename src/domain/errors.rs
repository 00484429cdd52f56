//! Domain errors for the automation engine.
//!
//! Per-action failures during dispatch are not errors: they are reported
//! individually inside `ExecutionReport`. Condition evaluation never fails
//! at all; malformed pairings degrade to `false`. Exhausted recurrence is
//! an expected terminal state (`None`), not an error.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to callers of the engine's API.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("Recurring config not found: {0}")]
    ConfigNotFound(Uuid),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(Uuid),

    #[error("Suggestion {0} was already applied")]
    SuggestionAlreadyApplied(Uuid),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
