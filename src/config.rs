//! Configuration types for the query pipeline.
//!
//! Every section uses `#[serde(default)]`, so a TOML file only needs the
//! keys it overrides.

use std::path::Path;
use std::time::Duration;

use guru_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::cache::MAX_TTL;
use crate::error::{GuruError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuruConfig {
    /// Admission limiter settings.
    pub limiter: LimiterConfig,
    /// Resolver deadline and cache settings.
    pub resolver: ResolverConfig,
    /// Inbound query validation.
    pub query: QueryConfig,
    /// Search backend and HTTP settings.
    pub search: SearchConfig,
}

/// Admission limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Operation name used in admission keys.
    pub operation: String,
    /// Safety-net timeout after which an unreleased slot frees itself.
    pub timeout_ms: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            operation: "request".into(),
            timeout_ms: 10_000,
        }
    }
}

impl LimiterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Per-request deadline.
    pub deadline_ms: u64,
    /// TTL for genuine answers.
    pub answer_ttl_secs: u64,
    /// TTL for the "no results" sentinel. Shorter, so misses are retried sooner.
    pub no_results_ttl_secs: u64,
    /// Capacity of the question → answer cache.
    pub question_cache_capacity: usize,
    /// Capacity of the link → answer cache.
    pub link_cache_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 3_000,
            answer_ttl_secs: 3_600,
            no_results_ttl_secs: 1_800,
            question_cache_capacity: 1_000,
            link_cache_capacity: 1_000,
        }
    }
}

impl ResolverConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn answer_ttl(&self) -> Duration {
        Duration::from_secs(self.answer_ttl_secs)
    }

    pub fn no_results_ttl(&self) -> Duration {
        Duration::from_secs(self.no_results_ttl_secs)
    }
}

/// Inbound query validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum query length in bytes after normalisation.
    pub max_len: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_len: 150 }
    }
}

impl GuruConfig {
    /// Load and validate a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`GuruError::Io`] if the file cannot be read and
    /// [`GuruError::Config`] if it does not parse or validate.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| GuruError::Config(format!("invalid config {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GuruError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.limiter.operation.trim().is_empty() {
            return Err(GuruError::Config("limiter.operation must not be empty".into()));
        }
        if self.limiter.timeout_ms == 0 {
            return Err(GuruError::Config("limiter.timeout_ms must be greater than 0".into()));
        }
        let resolver = &self.resolver;
        if resolver.deadline_ms == 0 {
            return Err(GuruError::Config("resolver.deadline_ms must be greater than 0".into()));
        }
        if resolver.question_cache_capacity == 0 || resolver.link_cache_capacity == 0 {
            return Err(GuruError::Config("cache capacities must be greater than 0".into()));
        }
        if resolver.answer_ttl_secs == 0 || resolver.no_results_ttl_secs == 0 {
            return Err(GuruError::Config("cache TTLs must be greater than 0".into()));
        }
        if resolver.answer_ttl() > MAX_TTL {
            return Err(GuruError::Config(format!(
                "resolver.answer_ttl_secs must not exceed {}",
                MAX_TTL.as_secs()
            )));
        }
        if resolver.no_results_ttl_secs > resolver.answer_ttl_secs {
            return Err(GuruError::Config(
                "resolver.no_results_ttl_secs must not exceed answer_ttl_secs".into(),
            ));
        }
        if self.query.max_len == 0 {
            return Err(GuruError::Config("query.max_len must be greater than 0".into()));
        }
        self.search.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use guru_search::SearchBackend;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = GuruConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limiter.operation, "request");
        assert_eq!(config.limiter.timeout(), Duration::from_secs(10));
        assert_eq!(config.resolver.deadline(), Duration::from_secs(3));
        assert_eq!(config.resolver.answer_ttl(), Duration::from_secs(3600));
        assert_eq!(config.resolver.no_results_ttl(), Duration::from_secs(1800));
        assert_eq!(config.query.max_len, 150);
    }

    #[test]
    fn no_results_ttl_must_be_shorter() {
        let mut config = GuruConfig::default();
        config.resolver.no_results_ttl_secs = 7_200;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no_results_ttl_secs"));
    }

    #[test]
    fn oversized_ttl_rejected() {
        let mut config = GuruConfig::default();
        config.resolver.answer_ttl_secs = u64::MAX;
        config.resolver.no_results_ttl_secs = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("answer_ttl_secs"));
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut config = GuruConfig::default();
        config.resolver.link_cache_capacity = 0;
        assert!(config.validate().unwrap_err().to_string().contains("capacities"));
    }

    #[test]
    fn search_errors_surface() {
        let mut config = GuruConfig::default();
        config.search.timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GuruError::Search(_)));
    }

    #[test]
    fn load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guru.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[resolver]\ndeadline_ms = 1500\n\n[search]\nbackend = \"duckduckgo\""
        )
        .unwrap();

        let config = GuruConfig::load(&path).unwrap();
        assert_eq!(config.resolver.deadline_ms, 1_500);
        assert_eq!(config.resolver.answer_ttl_secs, 3_600);
        assert_eq!(config.search.backend, SearchBackend::DuckDuckGo);
        assert_eq!(config.limiter.timeout_ms, 10_000);
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guru.toml");
        std::fs::write(&path, "resolver = 12").unwrap();
        assert!(matches!(GuruConfig::load(&path), Err(GuruError::Config(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(GuruConfig::load(&path), Err(GuruError::Io(_))));
    }
}
