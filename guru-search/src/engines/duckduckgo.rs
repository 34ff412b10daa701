//! DuckDuckGo link search.
//!
//! Posts the site-restricted query to the JavaScript-free `/html/` endpoint
//! and keeps organic results whose target looks like a question page.

use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;

/// DuckDuckGo HTML search scraper restricted to the configured site.
pub struct DuckDuckGoLinks {
    client: reqwest::Client,
    config: SearchConfig,
}

impl DuckDuckGoLinks {
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

    /// Unwrap a `//duckduckgo.com/l/?uddg=<encoded>` redirect into its target.
    /// Plain hrefs are returned as-is.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

impl SearchProvider for DuckDuckGoLinks {
    async fn find_candidate_links(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let endpoint = format!("{}/html/", self.config.base_url());
        let q = self.config.site_query(query);
        let request = self.client.post(&endpoint).form(&[("q", q.as_str())]);
        let html = http::fetch_text(request, "DuckDuckGo", cancel).await?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_links(&html, &self.config.link_marker, limit)
    }
}

/// Parse question links from a DuckDuckGo HTML response.
///
/// Ads (`.result--ad`) are skipped.
pub(crate) fn parse_duckduckgo_links(
    html: &str,
    marker: &str,
    limit: usize,
) -> Result<Vec<String>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;

    let mut links = Vec::new();

    for element in document.select(&result_sel) {
        if links.len() >= limit {
            break;
        }
        let Some(href) = element
            .select(&title_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
        else {
            continue;
        };
        let Some(url) = DuckDuckGoLinks::extract_url(href) else {
            continue;
        };
        if url.contains(marker) && !links.contains(&url) {
            links.push(url);
        }
    }

    tracing::debug!(count = links.len(), "DuckDuckGo links parsed");
    Ok(links)
}
