//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which backend produces candidate links, the
//! target site filter, timeouts, and request behaviour. The defaults are
//! tuned for polite scraping of a single question-and-answer site.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::SearchBackend;

/// Configuration for link search and document fetching.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Which search engine produces candidate links.
    pub backend: SearchBackend,
    /// Site filter appended to every query as `site:{site}`.
    pub site: String,
    /// Path fragment that marks a link as a question page.
    pub link_marker: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Overrides the backend's endpoint (scheme + host). Used for mirrors
    /// and for pointing the scrapers at a local mock server.
    pub search_base_url: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::Google,
            site: "stackoverflow.com".into(),
            link_marker: "/questions/".into(),
            timeout_seconds: 8,
            user_agent: None,
            search_base_url: None,
        }
    }
}

impl SearchConfig {
    /// Endpoint the configured backend is scraped from, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.search_base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
            .trim_end_matches('/')
    }

    /// Build the query string sent to the search engine.
    pub fn site_query(&self, query: &str) -> String {
        format!("site:{} {}", self.site, query.trim())
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `site` and `link_marker` must not be empty
    /// - `search_base_url`, when set, must be an absolute URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.site.trim().is_empty() {
            return Err(SearchError::Config("site must not be empty".into()));
        }
        if self.link_marker.is_empty() {
            return Err(SearchError::Config("link_marker must not be empty".into()));
        }
        if let Some(ref base) = self.search_base_url {
            url::Url::parse(base).map_err(|e| {
                SearchError::Config(format!("search_base_url is not a valid URL: {e}"))
            })?;
        }
        Ok(())
    }
}
