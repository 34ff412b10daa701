//! Question → answer resolution with two-level caching.
//!
//! # Workflow
//!
//! ```text
//! QuestionLookup ──hit──────────────────────────────────────────► Done
//!       │ miss
//!       ▼
//!    Search ──► LinkExtraction ──no links──► Done(NO_RESULTS)
//!                     │ first link
//!                     ▼
//!               LinkLookup ──hit (backfill question cache)──────► Done
//!                     │ miss
//!                     ▼
//!                  Fetch ──► AnswerExtraction ──► Done(answer | NO_RESULTS)
//! ```
//!
//! The workflow runs as a spawned task and reports through a `oneshot`
//! channel that [`Resolver::resolve`] races against the caller's deadline.
//! Every provider call inside the task is raced against a per-request
//! [`CancellationToken`], which is cancelled when the deadline elapses, so
//! no further network work is issued and in-flight requests are dropped.

use std::sync::Arc;
use std::time::Duration;

use guru_search::http::cancellable;
use guru_search::{DocumentProvider, SearchError, SearchProvider};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::config::ResolverConfig;
use crate::error::{GuruError, Result};

/// Sentinel answer meaning "resolution finished but found nothing usable".
pub const NO_RESULTS: &str = "Could not find what you were looking for.";

/// Only the top search result is followed.
const LINK_LIMIT: usize = 1;

/// State shared between the resolver handle and its background tasks.
struct Workflow<S, D> {
    search: S,
    documents: D,
    question_cache: ResultCache,
    link_cache: ResultCache,
    answer_ttl: Duration,
    no_results_ttl: Duration,
}

impl<S, D> Workflow<S, D>
where
    S: SearchProvider,
    D: DocumentProvider,
{
    async fn run(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<String, SearchError> {
        if let Some(cached) = self.question_cache.get(question) {
            info!(question, "hit question cache");
            return Ok(cached);
        }

        let links = cancellable(
            cancel,
            self.search.find_candidate_links(question, LINK_LIMIT, cancel),
        )
        .await?;

        let Some(link) = links.into_iter().next() else {
            debug!(question, "search returned no links");
            self.store(&self.question_cache, question, NO_RESULTS);
            return Ok(NO_RESULTS.to_owned());
        };

        if let Some(cached) = self.link_cache.get(&link) {
            info!(link = %link, "hit link cache");
            self.store(&self.question_cache, question, &cached);
            return Ok(cached);
        }

        let answer = cancellable(cancel, self.documents.fetch_answer(&link, cancel)).await?;

        if answer.trim().is_empty() {
            debug!(link = %link, "document had no usable answer");
            self.store(&self.question_cache, question, NO_RESULTS);
            self.store(&self.link_cache, &link, NO_RESULTS);
            return Ok(NO_RESULTS.to_owned());
        }

        self.store(&self.question_cache, question, &answer);
        self.store(&self.link_cache, &link, &answer);
        Ok(answer)
    }

    fn ttl_for(&self, value: &str) -> Duration {
        if value == NO_RESULTS {
            self.no_results_ttl
        } else {
            self.answer_ttl
        }
    }

    /// Cache writes never affect the outcome; failures are only logged.
    fn store(&self, cache: &ResultCache, key: &str, value: &str) {
        if let Err(e) = cache.put(key, value, self.ttl_for(value)) {
            warn!(key, error = %e, "cache write failed");
        }
    }
}

/// Resolves questions under a deadline, caching by question and by link.
pub struct Resolver<S, D> {
    workflow: Arc<Workflow<S, D>>,
    shutdown: CancellationToken,
}

impl<S, D> Resolver<S, D>
where
    S: SearchProvider + 'static,
    D: DocumentProvider + 'static,
{
    /// Create a resolver with fresh question and link caches.
    ///
    /// # Errors
    ///
    /// Returns [`GuruError::Config`] if a cache capacity is zero.
    pub fn new(search: S, documents: D, config: &ResolverConfig) -> Result<Self> {
        let question_cache = ResultCache::new("question", config.question_cache_capacity)
            .map_err(|e| GuruError::Config(format!("question cache: {e}")))?;
        let link_cache = ResultCache::new("link", config.link_cache_capacity)
            .map_err(|e| GuruError::Config(format!("link cache: {e}")))?;

        Ok(Self {
            workflow: Arc::new(Workflow {
                search,
                documents,
                question_cache,
                link_cache,
                answer_ttl: config.answer_ttl(),
                no_results_ttl: config.no_results_ttl(),
            }),
            shutdown: CancellationToken::new(),
        })
    }

    /// Resolve `question`, giving up after `deadline`.
    ///
    /// The answer may be [`NO_RESULTS`], which is a successful outcome.
    ///
    /// # Errors
    ///
    /// - [`GuruError::DeadlineExceeded`] when `deadline` elapses first; the
    ///   background work is cancelled.
    /// - [`GuruError::Search`] for provider failures.
    /// - [`GuruError::Cancelled`] if the resolver was shut down.
    /// - [`GuruError::TaskFailed`] if the background task died.
    pub async fn resolve(&self, question: &str, deadline: Duration) -> Result<String> {
        let cancel = self.shutdown.child_token();
        // Also cancels the background work if this future is dropped early.
        let _cancel_on_exit = cancel.clone().drop_guard();

        let (done_tx, done_rx) = oneshot::channel();
        let workflow = Arc::clone(&self.workflow);
        let owned_question = question.to_owned();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let outcome = workflow.run(&owned_question, &task_cancel).await;
            // The receiver is gone once the deadline has fired.
            let _ = done_tx.send(outcome);
        });

        tokio::select! {
            outcome = done_rx => match outcome {
                Ok(Ok(answer)) => Ok(answer),
                Ok(Err(SearchError::Cancelled)) => Err(GuruError::Cancelled),
                Ok(Err(e)) => {
                    warn!(question, error = %e, "resolution failed");
                    Err(GuruError::Search(e))
                }
                Err(_) => Err(GuruError::TaskFailed(
                    "resolution task ended without a result".into(),
                )),
            },
            () = tokio::time::sleep(deadline) => {
                cancel.cancel();
                warn!(question, ?deadline, "resolution deadline exceeded");
                Err(GuruError::DeadlineExceeded(deadline))
            }
        }
    }

    pub fn question_cache(&self) -> &ResultCache {
        &self.workflow.question_cache
    }

    pub fn link_cache(&self) -> &ResultCache {
        &self.workflow.link_cache
    }

    /// Cancel every in-flight resolution.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
