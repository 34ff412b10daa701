//! Provider contracts consumed by the query-resolution pipeline.
//!
//! A [`SearchProvider`] turns a query into ordered candidate links; a
//! [`DocumentProvider`] turns one link into an answer. Both receive the
//! caller's [`CancellationToken`] and must stop issuing network work once
//! it fires, reporting [`SearchError::Cancelled`] instead of an empty result.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::SearchError;

/// Produces candidate question links for a query.
///
/// All implementations must be `Send + Sync` so one instance can be shared
/// across concurrent request tasks.
pub trait SearchProvider: Send + Sync {
    /// Return at most `limit` links in result order.
    ///
    /// An empty vector means "nothing found" and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `cancel` fires, and
    /// [`SearchError::Http`] / [`SearchError::Parse`] for provider faults.
    fn find_candidate_links(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send;
}

/// Fetches a document and extracts an answer from it.
pub trait DocumentProvider: Send + Sync {
    /// Fetch `url` and return the extracted answer, or `""` when the
    /// document holds nothing usable.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `cancel` fires, and
    /// [`SearchError::Http`] / [`SearchError::Parse`] for fetch or parse faults.
    fn fetch_answer(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<String, SearchError>> + Send;
}
