//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::provider::SearchProvider`]
//! that scrapes a specific search engine's HTML results page. [`LinkSearch`]
//! dispatches to whichever backend the config selects.

pub mod duckduckgo;
pub mod google;

pub use duckduckgo::DuckDuckGoLinks;
pub use google::GoogleLinks;

use tokio_util::sync::CancellationToken;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::SearchBackend;

/// Search provider selected at runtime from [`SearchConfig::backend`].
pub enum LinkSearch {
    /// Google results page scraper.
    Google(GoogleLinks),
    /// DuckDuckGo HTML endpoint scraper.
    DuckDuckGo(DuckDuckGoLinks),
}

impl LinkSearch {
    /// Build the backend named by `config.backend`.
    ///
    /// # Errors
    ///
    /// Same as the backend constructors.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        match config.backend {
            SearchBackend::Google => GoogleLinks::new(config.clone()).map(Self::Google),
            SearchBackend::DuckDuckGo => DuckDuckGoLinks::new(config.clone()).map(Self::DuckDuckGo),
        }
    }

    /// Which backend this provider scrapes.
    pub fn backend(&self) -> SearchBackend {
        match self {
            Self::Google(_) => SearchBackend::Google,
            Self::DuckDuckGo(_) => SearchBackend::DuckDuckGo,
        }
    }
}

impl SearchProvider for LinkSearch {
    async fn find_candidate_links(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SearchError> {
        match self {
            Self::Google(engine) => engine.find_candidate_links(query, limit, cancel).await,
            Self::DuckDuckGo(engine) => engine.find_candidate_links(query, limit, cancel).await,
        }
    }
}
