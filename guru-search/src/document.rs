//! Question-page document provider.
//!
//! Fetches a question page with answers sorted by votes and hands the HTML
//! to [`crate::content::extract_answer`].

use tokio_util::sync::CancellationToken;

use crate::config::SearchConfig;
use crate::content;
use crate::error::SearchError;
use crate::http;
use crate::provider::DocumentProvider;

/// Query string that orders answers by score.
const VOTES_ORDER: &str = "answertab=votes";

/// Fetches Stack Exchange style question pages and extracts the top answer.
pub struct StackOverflowDocuments {
    client: reqwest::Client,
}

impl StackOverflowDocuments {
    /// Create a provider with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = http::build_client(config)?;
        Ok(Self { client })
    }
}

/// Append the vote-ordering parameter, respecting an existing query string.
fn votes_url(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{VOTES_ORDER}")
}

impl DocumentProvider for StackOverflowDocuments {
    async fn fetch_answer(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SearchError> {
        let target = votes_url(url);
        tracing::trace!(url = %target, "fetching question page");

        let html = http::fetch_text(self.client.get(&target), "question page", cancel).await?;
        content::extract_answer(&html)
    }
}
