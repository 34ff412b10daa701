//! Guru: deadline-bound question answering.
//!
//! This crate turns a plain-text programming question into an answer:
//! Coordinator → Admission → Resolver → (caches | search → fetch → extract)
//!
//! # Architecture
//!
//! - **Admission**: at most one in-flight request per (operation, user),
//!   with self-expiring grants serviced by a single reaper task
//! - **Result cache**: bounded TTL + LFU store, one instance keyed by
//!   question and one keyed by link
//! - **Resolver**: cache lookups, then search and document fetch through the
//!   `guru-search` providers, all cancelled when the deadline elapses
//! - **Coordinator**: the single entry point transports call
//!
//! Everything is process-memory only; nothing survives a restart.

pub mod admission;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod query;
pub mod resolver;

pub use admission::{AdmissionLimiter, AdmissionPermit};
pub use cache::{CacheStats, ResultCache};
pub use config::GuruConfig;
pub use coordinator::{Coordinator, WebCoordinator};
pub use error::{CacheError, GuruError, Result};
pub use query::{Input, QueryError, normalize_query, parse_input};
pub use resolver::{NO_RESULTS, Resolver};
