//! Error taxonomy for the vesting engine

use thiserror::Error;

/// Errors raised by schedule calculation, condition evaluation and status reporting
#[derive(Debug, Error)]
pub enum VestingError {
    /// Malformed vesting terms or condition bands. Raised before any output is produced.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// No grant with this identifier exists in the grant store
    #[error("grant not found: {grant_id}")]
    NotFound { grant_id: String },

    /// Failure reported by a grant store client
    #[error("grant store error: {message}")]
    Store { message: String, transient: bool },

    /// Persisted counters do not reconcile to the granted share count
    #[error(
        "grant {grant_id} counters do not reconcile: vested {vested} + forfeited {forfeited} + remaining {remaining} != granted {granted}"
    )]
    CounterMismatch {
        grant_id: String,
        granted: u64,
        vested: u64,
        forfeited: u64,
        remaining: u64,
    },

    /// Date arithmetic left the representable calendar range
    #[error("date overflow adding {months} months")]
    DateOverflow { months: u32 },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl VestingError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        VestingError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the caller may retry the failed operation with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, VestingError::Store { transient: true, .. })
    }
}

pub type Result<T> = std::result::Result<T, VestingError>;
