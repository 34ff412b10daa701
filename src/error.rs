//! Error types for the guru pipeline.

use guru_search::SearchError;

/// Reply sent when resolution fails for any reason other than the deadline.
pub const UNKNOWN_ERROR_REPLY: &str = "Something went wrong.";

/// Reply sent when the per-request deadline elapses.
pub const DEADLINE_REPLY: &str = "The search took too long, please try again later.";

/// Top-level error type for query resolution.
#[derive(Debug, thiserror::Error)]
pub enum GuruError {
    /// A request for the same (operation, user) is already in flight.
    #[error("request already in progress for {key}")]
    AdmissionRejected {
        /// Composite admission key.
        key: String,
    },

    /// The caller's deadline elapsed before an answer was ready.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(std::time::Duration),

    /// Search or document provider failure.
    #[error("provider error: {0}")]
    Search(#[from] SearchError),

    /// The resolver was shut down while the request was running.
    #[error("resolution cancelled")]
    Cancelled,

    /// The background resolution task ended without reporting an outcome.
    #[error("resolution task failed: {0}")]
    TaskFailed(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuruError {
    /// Text to send back to the user, or `None` when the request should be
    /// dropped silently.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::AdmissionRejected { .. } => None,
            Self::DeadlineExceeded(_) => Some(DEADLINE_REPLY),
            _ => Some(UNKNOWN_ERROR_REPLY),
        }
    }
}

/// Errors raised by [`crate::cache::ResultCache`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// A cache must hold at least one entry.
    #[error("cache capacity must be greater than 0")]
    ZeroCapacity,

    /// The store lock was poisoned by a panicking writer.
    #[error("cache store poisoned")]
    Poisoned,
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, GuruError>;
