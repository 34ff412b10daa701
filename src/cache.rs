//! Bounded in-memory result cache with per-entry TTL and LFU eviction.
//!
//! Two independent instances back the resolver: question → answer and
//! link → answer. Both share this implementation.
//!
//! ## Expiry
//!
//! Every entry carries an absolute expiry instant. Lookups check it, so an
//! expired entry is never returned even if it is still physically resident.
//! Expired entries are dropped lazily: on insertion under capacity pressure
//! and by [`ResultCache::purge_expired`].
//!
//! ## Eviction
//!
//! Inserting a new key into a full cache removes the resident entry with the
//! lowest access count. Ties go to the oldest insertion.
//!
//! ## Locking
//!
//! The store sits behind an [`RwLock`]. [`ResultCache::get`] only takes the
//! shared lock; access counts are atomics so hits never need exclusive
//! access. Writes (`put`, `remove`, `purge_expired`) take the exclusive lock.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::CacheError;

/// Longest TTL an entry can carry; longer requests are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

struct CacheEntry {
    value: String,
    expires_at: Instant,
    access_count: AtomicU64,
    /// Insertion order, used to break access-count ties.
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
struct Store {
    entries: HashMap<String, CacheEntry>,
    next_seq: u64,
}

/// Point-in-time counters for one cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

/// Capacity-bounded key → value store with TTL expiry and LFU eviction.
pub struct ResultCache {
    name: &'static str,
    capacity: usize,
    store: RwLock<Store>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl ResultCache {
    /// Create a cache that holds at most `capacity` entries.
    ///
    /// `name` only labels log lines.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(name: &'static str, capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(Self {
            name,
            capacity,
            store: RwLock::new(Store::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        })
    }

    /// Look up `key`. Returns `None` on a miss or when the entry has expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let Ok(store) = self.store.read() else {
            tracing::warn!(cache = self.name, "cache lock poisoned, treating as miss");
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        match store.entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                entry.access_count.fetch_add(1, Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`, capped at [`MAX_TTL`].
    ///
    /// Overwriting a live key replaces its value and expiry but keeps its
    /// access count. Writing over an expired key starts a fresh entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Poisoned`] if the store lock is poisoned.
    pub fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let expires_at = now + ttl.min(MAX_TTL);
        let mut store = self.store.write().map_err(|_| CacheError::Poisoned)?;

        if store.entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            store.entries.remove(key);
            self.expirations.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(entry) = store.entries.get_mut(key) {
            entry.value = value.to_owned();
            entry.expires_at = expires_at;
            return Ok(());
        }

        if store.entries.len() >= self.capacity {
            let expired = self.drop_expired(&mut store, now);
            if expired == 0 {
                self.evict_least_frequent(&mut store);
            }
        }

        let seq = store.next_seq;
        store.next_seq += 1;
        store.entries.insert(
            key.to_owned(),
            CacheEntry {
                value: value.to_owned(),
                expires_at,
                access_count: AtomicU64::new(0),
                seq,
            },
        );
        Ok(())
    }

    /// Remove `key`, returning whether it was resident.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Poisoned`] if the store lock is poisoned.
    pub fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let mut store = self.store.write().map_err(|_| CacheError::Poisoned)?;
        Ok(store.entries.remove(key).is_some())
    }

    /// Physically drop every expired entry. Returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Poisoned`] if the store lock is poisoned.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut store = self.store.write().map_err(|_| CacheError::Poisoned)?;
        Ok(self.drop_expired(&mut store, Instant::now()))
    }

    /// Number of resident entries, expired ones included.
    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }

    fn drop_expired(&self, store: &mut Store, now: Instant) -> usize {
        let before = store.entries.len();
        store.entries.retain(|_, entry| !entry.is_expired(now));
        let dropped = before - store.entries.len();
        if dropped > 0 {
            self.expirations.fetch_add(dropped as u64, Ordering::Relaxed);
            tracing::debug!(cache = self.name, dropped, "expired entries purged");
        }
        dropped
    }

    fn evict_least_frequent(&self, store: &mut Store) {
        let victim = store
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.access_count.load(Ordering::Relaxed), entry.seq))
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            store.entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(cache = self.name, key = %key, "evicted least frequently used entry");
        }
    }
}
