//! Per-(operation, user) admission control with self-expiring grants.
//!
//! [`AdmissionLimiter::allow`] hands out at most one live [`AdmissionPermit`]
//! per composite key. A permit is removed by whichever happens first:
//!
//! - an explicit [`AdmissionPermit::release`] (or dropping the permit)
//! - its timeout elapsing
//!
//! Timeouts are serviced by a single reaper task that keeps every pending
//! deadline in a min-heap, instead of one timer task per grant.
//!
//! Each grant carries a unique sequence number and removal only deletes the
//! token when the number still matches, so a late timer or a late release
//! is a no-op and can never remove a newer grant for the same key.
//!
//! # Usage
//!
//! ```rust,ignore
//! let limiter = AdmissionLimiter::new();
//! let Some(permit) = limiter.allow("request", "42", Duration::from_secs(10)) else {
//!     return; // already in flight
//! };
//! // ... work ...
//! permit.release();
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Token set shared by the limiter, its permits, and the reaper.
#[derive(Default)]
struct TokenSet {
    /// Live tokens: composite key → grant sequence number.
    tokens: RwLock<HashMap<String, u64>>,
    next_grant: AtomicU64,
}

impl TokenSet {
    // Every mutation is a single insert or remove, so a poisoned map is
    // still consistent and is recovered rather than failing closed.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, u64>> {
        self.tokens.read().unwrap_or_else(|poisoned| {
            tracing::warn!("admission token set poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, u64>> {
        self.tokens.write().unwrap_or_else(|poisoned| {
            tracing::warn!("admission token set poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Insert a token for `key` unless one is live. Returns the grant number.
    fn try_insert(&self, key: &str) -> Option<u64> {
        let mut tokens = self.write();
        if tokens.contains_key(key) {
            return None;
        }
        let grant = self.next_grant.fetch_add(1, AtomicOrdering::Relaxed);
        tokens.insert(key.to_owned(), grant);
        Some(grant)
    }

    /// Remove the token for `key` if it still belongs to `grant`.
    fn remove(&self, key: &str, grant: u64) -> bool {
        let mut tokens = self.write();
        if tokens.get(key) == Some(&grant) {
            tokens.remove(key);
            true
        } else {
            false
        }
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}

/// A pending timeout, ordered by deadline.
struct Expiry {
    deadline: Instant,
    grant: u64,
    key: String,
}

impl PartialEq for Expiry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.grant == other.grant
    }
}

impl Eq for Expiry {}

impl PartialOrd for Expiry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expiry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.grant).cmp(&(other.deadline, other.grant))
    }
}

/// Dedup gate allowing one in-flight request per (operation, user).
///
/// Must be created inside a tokio runtime; the reaper task stops when the
/// limiter is dropped.
pub struct AdmissionLimiter {
    tokens: Arc<TokenSet>,
    schedule_tx: mpsc::UnboundedSender<Expiry>,
}

impl AdmissionLimiter {
    /// Create a limiter and spawn its reaper task.
    pub fn new() -> Self {
        let tokens = Arc::new(TokenSet::default());
        let (schedule_tx, schedule_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_reaper(Arc::clone(&tokens), schedule_rx));
        Self {
            tokens,
            schedule_tx,
        }
    }

    /// Composite key for an (operation, user) pair.
    pub fn key(operation: &str, user_id: &str) -> String {
        format!("{operation}.{user_id}")
    }

    /// Try to admit a request.
    ///
    /// Returns `None` when a request for the same key is already in flight.
    /// Rejection is a normal outcome, not an error.
    pub fn allow(
        &self,
        operation: &str,
        user_id: &str,
        timeout: Duration,
    ) -> Option<AdmissionPermit> {
        let key = Self::key(operation, user_id);
        if self.tokens.contains(&key) {
            return None;
        }
        let grant = self.tokens.try_insert(&key)?;

        let expiry = Expiry {
            deadline: Instant::now() + timeout,
            grant,
            key: key.clone(),
        };
        if self.schedule_tx.send(expiry).is_err() {
            tracing::warn!(key = %key, "admission reaper stopped; grant relies on explicit release");
        }

        Some(AdmissionPermit {
            tokens: Arc::clone(&self.tokens),
            key,
            grant,
            released: false,
        })
    }

    /// Whether a request for (operation, user) is currently admitted.
    pub fn is_in_flight(&self, operation: &str, user_id: &str) -> bool {
        self.tokens.contains(&Self::key(operation, user_id))
    }

    /// Number of live admission tokens.
    pub fn in_flight(&self) -> usize {
        self.tokens.len()
    }
}

impl Default for AdmissionLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of admission. Releasing or dropping it frees the slot.
#[must_use = "dropping a permit releases the admission slot immediately"]
pub struct AdmissionPermit {
    tokens: Arc<TokenSet>,
    key: String,
    grant: u64,
    released: bool,
}

impl AdmissionPermit {
    /// Composite key this permit was granted for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Free the slot now. A no-op if the timeout already freed it.
    pub fn release(mut self) {
        self.release_slot();
    }

    fn release_slot(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.tokens.remove(&self.key, self.grant) {
            tracing::trace!(key = %self.key, "admission released");
        }
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.release_slot();
    }
}

/// Service every pending timeout from one min-heap until the limiter is dropped.
async fn run_reaper(tokens: Arc<TokenSet>, mut schedule_rx: mpsc::UnboundedReceiver<Expiry>) {
    let mut pending: BinaryHeap<Reverse<Expiry>> = BinaryHeap::new();

    loop {
        let next_deadline = pending.peek().map(|Reverse(expiry)| expiry.deadline);

        tokio::select! {
            scheduled = schedule_rx.recv() => {
                match scheduled {
                    Some(expiry) => pending.push(Reverse(expiry)),
                    None => break,
                }
            }
            () = tokio::time::sleep_until(next_deadline.unwrap_or_else(Instant::now)), if next_deadline.is_some() => {
                let now = Instant::now();
                while pending.peek().is_some_and(|Reverse(expiry)| expiry.deadline <= now) {
                    let Some(Reverse(expiry)) = pending.pop() else {
                        break;
                    };
                    if tokens.remove(&expiry.key, expiry.grant) {
                        tracing::warn!(key = %expiry.key, "admission timed out before release");
                    }
                }
            }
        }
    }

    tracing::debug!(pending = pending.len(), "admission reaper stopped");
}
