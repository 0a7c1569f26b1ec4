//! In-memory value cache with TTL expiry.

use crate::cache::types::{CacheError, CacheKey};
use crate::cache::{CacheFuture, CacheStats, ValueCache};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Entry in the memory cache.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: f64,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process value cache.
///
/// Entries expire after the TTL given on `put`. Expired entries are dropped
/// lazily on lookup and in bulk when the cache is full; if the cache is still
/// full after purging, the entry closest to expiry is evicted.
pub struct MemoryValueCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    max_entries: usize,
    stats: Mutex<CacheStats>,
}

impl MemoryValueCache {
    /// Create a new memory cache holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Number of entries currently held, including expired ones not yet purged.
    pub fn entry_count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    fn with_stats(&self, f: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }

    /// Make room for one more entry. Returns the number of entries removed.
    fn make_room(entries: &mut HashMap<CacheKey, CacheEntry>, max_entries: usize) -> u64 {
        if entries.len() < max_entries {
            return 0;
        }

        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let mut removed = (before - entries.len()) as u64;

        while entries.len() >= max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                    removed += 1;
                }
                None => break,
            }
        }

        removed
    }
}

impl MemoryValueCache {
    fn lookup(&self, key: &CacheKey) -> Option<f64> {
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };

        let now = Instant::now();
        match entries.get(key).copied() {
            Some(entry) if !entry.is_expired(now) => {
                drop(entries);
                self.with_stats(|s| s.record_hit());
                Some(entry.value)
            }
            Some(_) => {
                entries.remove(key);
                let count = entries.len();
                drop(entries);
                trace!(key = %key, "Cache entry expired");
                self.with_stats(|s| {
                    s.record_miss(true);
                    s.entry_count = count;
                });
                None
            }
            None => {
                drop(entries);
                self.with_stats(|s| s.record_miss(false));
                None
            }
        }
    }

    fn store(&self, key: CacheKey, value: f64, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::LockError)?;

        let evicted = if entries.contains_key(&key) {
            0
        } else {
            Self::make_room(&mut entries, self.max_entries)
        };

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        let count = entries.len();
        drop(entries);

        self.with_stats(|s| {
            if evicted > 0 {
                s.record_evictions(evicted, count);
            }
            s.record_write(count);
        });

        Ok(())
    }

    fn holds(&self, key: &CacheKey) -> bool {
        let Ok(entries) = self.entries.lock() else {
            return false;
        };
        entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(Instant::now()))
    }

    fn remove_all(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::LockError)?;
        entries.clear();
        drop(entries);
        self.with_stats(|s| s.entry_count = 0);
        Ok(())
    }
}

impl ValueCache for MemoryValueCache {
    fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<f64>> {
        Box::pin(async move { self.lookup(key) })
    }

    fn put(&self, key: CacheKey, value: f64, ttl: Duration) -> CacheFuture<'_, Result<(), CacheError>> {
        Box::pin(async move { self.store(key, value, ttl) })
    }

    fn contains<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, bool> {
        Box::pin(async move { self.holds(key) })
    }

    fn clear(&self) -> CacheFuture<'_, Result<(), CacheError>> {
        Box::pin(async move { self.remove_all() })
    }

    fn stats(&self) -> CacheStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn backend(&self) -> &str {
        "memory"
    }
}
