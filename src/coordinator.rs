//! Single entry point for transports: admission, then resolution.

use std::time::Duration;

use guru_search::{DocumentProvider, LinkSearch, SearchProvider, StackOverflowDocuments};
use tracing::{debug, error, warn};

use crate::admission::AdmissionLimiter;
use crate::config::{GuruConfig, LimiterConfig};
use crate::error::{GuruError, Result};
use crate::resolver::Resolver;

/// Coordinator wired to the scraping providers.
pub type WebCoordinator = Coordinator<LinkSearch, StackOverflowDocuments>;

/// Wires the [`AdmissionLimiter`] to a [`Resolver`].
///
/// Shared by every request task; all state lives in the limiter and the
/// resolver's caches.
pub struct Coordinator<S, D> {
    limiter: AdmissionLimiter,
    resolver: Resolver<S, D>,
    limiter_config: LimiterConfig,
}

impl WebCoordinator {
    /// Build a coordinator backed by the configured search backend.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`GuruError::Config`] / [`GuruError::Search`] if the
    /// configuration is invalid or the HTTP clients cannot be built.
    pub fn from_config(config: &GuruConfig) -> Result<Self> {
        config.validate()?;
        let (search, documents) = guru_search::providers(&config.search)?;
        let resolver = Resolver::new(search, documents, &config.resolver)?;
        Ok(Self::new(resolver, config.limiter.clone()))
    }
}

impl<S, D> Coordinator<S, D>
where
    S: SearchProvider + 'static,
    D: DocumentProvider + 'static,
{
    /// Must be called inside a tokio runtime (the limiter spawns its reaper).
    pub fn new(resolver: Resolver<S, D>, limiter_config: LimiterConfig) -> Self {
        Self {
            limiter: AdmissionLimiter::new(),
            resolver,
            limiter_config,
        }
    }

    /// Handle one normalised query for `user_id` under `deadline`.
    ///
    /// # Errors
    ///
    /// - [`GuruError::AdmissionRejected`] if a request for the same
    ///   (operation, user) is already in flight; callers drop it silently.
    /// - Any error from [`Resolver::resolve`].
    pub async fn handle_query(
        &self,
        operation: &str,
        user_id: &str,
        query: &str,
        deadline: Duration,
    ) -> Result<String> {
        let Some(permit) = self
            .limiter
            .allow(operation, user_id, self.limiter_config.timeout())
        else {
            warn!(operation, user_id, "request already in progress, dropping");
            return Err(GuruError::AdmissionRejected {
                key: AdmissionLimiter::key(operation, user_id),
            });
        };

        debug!(key = permit.key(), query, "request admitted");
        let outcome = self.resolver.resolve(query, deadline).await;
        permit.release();
        outcome
    }

    /// [`Self::handle_query`] with the configured operation name.
    ///
    /// # Errors
    ///
    /// Same as [`Self::handle_query`].
    pub async fn handle_request(
        &self,
        user_id: &str,
        query: &str,
        deadline: Duration,
    ) -> Result<String> {
        self.handle_query(&self.limiter_config.operation, user_id, query, deadline)
            .await
    }

    /// [`Self::handle_request`] mapped to the text a transport should send.
    ///
    /// Returns `None` when the request was dropped by admission and nothing
    /// should be sent.
    pub async fn reply(&self, user_id: &str, query: &str, deadline: Duration) -> Option<String> {
        match self.handle_request(user_id, query, deadline).await {
            Ok(answer) => Some(answer),
            // Already logged by `handle_query`.
            Err(GuruError::AdmissionRejected { .. }) => None,
            Err(e) => {
                error!(user_id, error = %e, "failed to run query");
                e.user_message().map(str::to_owned)
            }
        }
    }

    pub fn limiter(&self) -> &AdmissionLimiter {
        &self.limiter
    }

    pub fn resolver(&self) -> &Resolver<S, D> {
        &self.resolver
    }

    /// Cancel all outstanding resolutions.
    pub fn shutdown(&self) {
        self.resolver.shutdown();
    }
}
