//! Error types for the guru-search crate.
//!
//! Provider failures are kept distinct from "found nothing": an empty link
//! list or an empty answer is a successful outcome, never an error.

/// Errors that can occur while searching for links or fetching answers.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a search engine or document host failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a search results page or a question page.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The caller's cancellation token fired before the work finished.
    #[error("search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Whether this error is the cancellation signal rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Convenience type alias for guru-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
