//! TTL-keyed request cache
//!
//! [`RequestCache`] memoizes the result of any named operation for a bounded
//! time. Expired entries are evicted lazily by the read that finds them or in
//! bulk by [`RequestCache::sweep_expired`]. There is no size bound: the cache
//! lives as long as the host process and is never persisted.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::key::{CacheArgs, CacheKey};
use crate::core::error::DomainError;

/// Default time-to-live for entries stored without an override (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A single memoized result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub created_at: Instant,
    pub expires_at: Instant,
    pub operation: String,
}

impl CacheEntry {
    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    pub live_entries: usize,
    pub hit_rate_percent: f64,
}

/// Thread-safe memoization table shared by the gateway and the estimator.
pub struct RequestCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    total_requests: AtomicU64,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache whose entries live for `default_ttl` unless overridden.
    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            total_requests: AtomicU64::new(0),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a live entry.
    pub fn get(&self, operation: &str, args: &CacheArgs) -> Option<Value> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let key = CacheKey::derive(operation, args);
        let now = Instant::now();

        let expired = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                Some(entry) if !entry.is_expired_at(now) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(operation, key = %key, "cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            // Re-check under the write lock; a concurrent set may have refreshed it
            if entries.get(&key).is_some_and(|e| e.is_expired_at(now)) {
                entries.remove(&key);
                tracing::debug!(operation, key = %key, "evicted expired entry");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `value`, replacing any previous entry for the same key.
    pub fn set(&self, operation: &str, value: Value, ttl: Option<Duration>, args: &CacheArgs) {
        let key = CacheKey::derive(operation, args);
        let created_at = Instant::now();
        let entry = CacheEntry {
            value,
            created_at,
            expires_at: created_at + ttl.unwrap_or(self.default_ttl),
            operation: operation.to_string(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Typed lookup; an entry that no longer decodes counts as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, operation: &str, args: &CacheArgs) -> Option<T> {
        let value = self.get(operation, args)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(
                    operation,
                    error = %DomainError::CacheDecode(e.to_string()),
                    "discarding undecodable cache entry"
                );
                None
            }
        }
    }

    /// Typed store. Values that fail to serialize are not cached.
    pub fn set_serialized<T: Serialize>(
        &self,
        operation: &str,
        value: &T,
        ttl: Option<Duration>,
        args: &CacheArgs,
    ) {
        match serde_json::to_value(value) {
            Ok(v) => self.set(operation, v, ttl, args),
            Err(e) => tracing::warn!(operation, error = %e, "value not cacheable"),
        }
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.total_requests.store(0, Ordering::Relaxed);
    }

    /// Remove all expired entries, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let live_entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| !e.is_expired_at(now))
            .count();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let hit_rate_percent = if total_requests == 0 {
            0.0
        } else {
            hits as f64 / total_requests as f64 * 100.0
        };

        CacheStats {
            hits,
            misses,
            total_requests,
            live_entries,
            hit_rate_percent,
        }
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}
