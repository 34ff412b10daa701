//! # guru-search
//!
//! Candidate-link search and answer extraction for the guru query pipeline.
//!
//! The crate scrapes public search engines for question links on a single
//! target site and pulls the best answer out of the linked question page.
//! No API keys and no external services are required.
//!
//! ## Design
//!
//! - [`SearchProvider`] / [`DocumentProvider`] are the only contracts the
//!   pipeline sees; everything else is an implementation detail
//! - Every network call is raced against a caller-owned
//!   [`tokio_util::sync::CancellationToken`], so an expired deadline drops
//!   in-flight requests instead of letting them finish unobserved
//! - Answers are extracted by an ordered list of [`AnswerRule`]s
//!
//! ## Security
//!
//! - Queries are logged only at trace level
//! - Outbound HTTP only; the crate opens no listeners

pub mod config;
pub mod content;
pub mod document;
pub mod engines;
pub mod error;
pub mod http;
pub mod provider;
pub mod types;

pub use config::SearchConfig;
pub use content::{extract_answer, AnswerRule};
pub use document::StackOverflowDocuments;
pub use engines::{DuckDuckGoLinks, GoogleLinks, LinkSearch};
pub use error::{Result, SearchError};
pub use provider::{DocumentProvider, SearchProvider};
pub use types::SearchBackend;

/// Build the configured search backend and the question-page provider.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` fails validation, or
/// [`SearchError::Http`] if an HTTP client cannot be constructed.
///
/// # Examples
///
/// ```no_run
/// # fn example() -> guru_search::Result<()> {
/// let (search, documents) = guru_search::providers(&guru_search::SearchConfig::default())?;
/// # let _ = (search, documents);
/// # Ok(())
/// # }
/// ```
pub fn providers(config: &SearchConfig) -> Result<(LinkSearch, StackOverflowDocuments)> {
    config.validate()?;
    let search = LinkSearch::from_config(config)?;
    let documents = StackOverflowDocuments::new(config)?;
    Ok((search, documents))
}
