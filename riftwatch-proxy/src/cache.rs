//! In-memory expiring cache for upstream responses.
//!
//! Entries carry their own deadline, so operations with different freshness
//! needs share one map. Nothing is persisted; a restart starts cold.

use std::time::{Duration, Instant};

use scc::HashMap;
use scc::hash_map::Entry;

/// Fallback TTL for `set` when the caller does not pick one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Key/value store with a per-entry time-to-live.
/// Uses scc::HashMap for lock-free concurrent access.
pub struct ExpiringCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> ExpiringCache<V> {
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now()).await
    }

    /// Read `key` as of `now`. An expired entry reads as absent and is dropped.
    pub async fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let hit = self
            .entries
            .read_async(key, |_, entry| {
                (!entry.is_expired(now)).then(|| entry.value.clone())
            })
            .await?;

        if hit.is_none() {
            self.evict_if_expired(key, now).await;
        }
        hit
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now()).await;
    }

    /// Store `value` so that it expires `ttl` after `now`. Last write wins.
    pub async fn set_at(&self, key: impl Into<String>, value: V, ttl: Duration, now: Instant) {
        let entry = CacheEntry {
            value,
            expires_at: now + ttl,
        };
        match self.entries.entry_async(key.into()).await {
            Entry::Occupied(mut occupied) => {
                *occupied.get_mut() = entry;
            }
            Entry::Vacant(vacant) => {
                vacant.insert_entry(entry);
            }
        }
    }

    /// Drop every entry that has expired. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now()).await
    }

    pub async fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain_async(|_, entry| !entry.is_expired(now))
            .await;
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including ones that expired but were not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Re-checks under the entry lock so a concurrent fresh write survives.
    async fn evict_if_expired(&self, key: &str, now: Instant) {
        if let Entry::Occupied(occupied) = self.entries.entry_async(key.to_string()).await {
            if occupied.get().is_expired(now) {
                let _ = occupied.remove();
            }
        }
    }
}

impl<V: Clone> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
