//! Scripted in-memory providers shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use guru::config::ResolverConfig;
use guru_search::{DocumentProvider, SearchError, SearchProvider};
use tokio_util::sync::CancellationToken;

/// How often a provider was called and how often its work ran to completion.
/// Readable after the provider has been moved into a resolver.
#[derive(Default)]
pub struct Probe {
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl Probe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Sleep for `latency` unless `cancel` fires first.
    async fn work(&self, latency: Duration, cancel: &CancellationToken) -> Result<(), SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            () = cancel.cancelled() => Err(SearchError::Cancelled),
            () = tokio::time::sleep(latency) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

/// Search provider returning fixed links (or a fixed failure) after a latency.
pub struct ScriptedSearch {
    pub links: Vec<String>,
    pub fail: Option<String>,
    pub latency: Duration,
    pub probe: Arc<Probe>,
}

impl ScriptedSearch {
    pub fn returning(links: &[&str]) -> Self {
        Self {
            links: links.iter().map(|l| (*l).to_owned()).collect(),
            fail: None,
            latency: Duration::from_millis(10),
            probe: Arc::new(Probe::default()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_owned()),
            ..Self::returning(&[])
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl SearchProvider for ScriptedSearch {
    async fn find_candidate_links(
        &self,
        _query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SearchError> {
        self.probe.work(self.latency, cancel).await?;
        if let Some(ref message) = self.fail {
            return Err(SearchError::Http(message.clone()));
        }
        Ok(self.links.iter().take(limit).cloned().collect())
    }
}

/// Document provider answering from a url → text table after a latency.
pub struct ScriptedDocuments {
    pub answers: HashMap<String, String>,
    pub latency: Duration,
    pub probe: Arc<Probe>,
}

impl ScriptedDocuments {
    pub fn answering(pairs: &[(&str, &str)]) -> Self {
        Self {
            answers: pairs
                .iter()
                .map(|(url, text)| ((*url).to_owned(), (*text).to_owned()))
                .collect(),
            latency: Duration::from_millis(10),
            probe: Arc::new(Probe::default()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl DocumentProvider for ScriptedDocuments {
    async fn fetch_answer(&self, url: &str, cancel: &CancellationToken) -> Result<String, SearchError> {
        self.probe.work(self.latency, cancel).await?;
        self.answers
            .get(url)
            .cloned()
            .ok_or_else(|| SearchError::Http(format!("404 for {url}")))
    }
}

pub const LINK: &str = "https://stackoverflow.com/questions/4192440/binary-search-in-go";

pub const ANSWER_TTL: Duration = Duration::from_secs(3_600);
pub const NO_RESULTS_TTL: Duration = Duration::from_secs(1_800);

pub fn resolver_config() -> ResolverConfig {
    ResolverConfig {
        deadline_ms: 3_000,
        answer_ttl_secs: ANSWER_TTL.as_secs(),
        no_results_ttl_secs: NO_RESULTS_TTL.as_secs(),
        question_cache_capacity: 16,
        link_cache_capacity: 16,
    }
}
