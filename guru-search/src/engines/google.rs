//! Google link search. Best coverage, but aggressive bot detection.
//!
//! Scrapes the plain HTML results page. Organic result anchors point at
//! Google's `/url?q=` redirector; the real target is recovered from the
//! `q` value with the tracking suffix (`&sa=...`) removed.

use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;

/// Google HTML search scraper restricted to the configured site.
pub struct GoogleLinks {
    client: reqwest::Client,
    config: SearchConfig,
}

impl GoogleLinks {
    /// Create a scraper with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid config and
    /// [`SearchError::Http`] if the client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Recover the target URL from a result anchor's `href`.
    fn extract_url(href: &str) -> Option<String> {
        let stripped = href.strip_prefix("/url?q=").unwrap_or(href);
        let link = stripped.split("&sa").next().unwrap_or(stripped);
        let parsed = Url::parse(link).ok()?;
        match parsed.scheme() {
            "http" | "https" => Some(link.to_owned()),
            _ => None,
        }
    }
}

impl SearchProvider for GoogleLinks {
    async fn find_candidate_links(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SearchError> {
        tracing::trace!(query, "Google search");

        let endpoint = format!("{}/search", self.config.base_url());
        let q = self.config.site_query(query);
        let request = self.client.get(&endpoint).query(&[("q", q.as_str())]);
        let html = http::fetch_text(request, "Google", cancel).await?;

        tracing::trace!(bytes = html.len(), "Google response received");

        Ok(parse_google_links(&html, &self.config.link_marker, limit))
    }
}

/// Parse question links from a Google results page.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn parse_google_links(html: &str, marker: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchor_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for anchor in document.select(&anchor_sel) {
        if links.len() >= limit {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(marker) {
            continue;
        }
        let Some(link) = GoogleLinks::extract_url(href) else {
            continue;
        };
        if !links.contains(&link) {
            links.push(link);
        }
    }

    tracing::debug!(count = links.len(), "Google links parsed");
    links
}
