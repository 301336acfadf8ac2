//! In-memory key/value store with per-entry expiry.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// TTL applied when the caller does not pass one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Point-in-time counters, taken without evicting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}

/// Key/value cache where every entry carries an absolute expiry.
///
/// A lookup never returns an entry whose expiry has passed: expired entries
/// are evicted lazily by [`get`](Self::get) and [`has`](Self::has), and
/// eagerly by [`size`](Self::size).
///
/// The cache is an explicit instance, usually shared through an `Arc`
/// between the controllers that read and populate it. The internal lock is
/// never held across an `.await`.
///
/// Time comes from [`tokio::time::Instant`], so tests can drive expiry with
/// a paused clock.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Stores `value` for the default TTL, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` until `now + ttl`, replacing any previous entry.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let expires_at = Instant::now() + ttl;
        debug!("Cache SET: {} (TTL: {}s)", key, ttl.as_secs());
        self.lock().insert(key, CacheEntry { value, expires_at });
    }

    /// Returns the stored value, evicting it first if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                debug!("Cache EXPIRED: {}", key);
                None
            }
            Some(entry) => {
                debug!("Cache HIT: {}", key);
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS: {}", key);
                None
            }
        }
    }

    /// Same expiry check as [`get`](Self::get), without cloning the value.
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn delete(&self, key: &str) {
        if self.lock().remove(key).is_some() {
            debug!("Cache INVALIDATE: {}", key);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of live entries. Evicts every expired entry as a side effect.
    pub fn size(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.len()
    }

    /// Counts entries by state without mutating the cache.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.lock();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();

        CacheStats {
            total: entries.len(),
            valid: entries.len() - expired,
            expired,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // Entries stay consistent even if a holder panicked mid-operation.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_get_before_expiry_returns_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("page_1_10", 42);

        advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("page_1_10"), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_at_exact_expiry_still_returns_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("k", "v");

        advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get("k"), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_expiry_returns_none_and_evicts() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("k", "v");

        advance(Duration::from_millis(60_001)).await;
        assert_eq!(cache.stats().expired, 1);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl_overrides_default() {
        let cache = TtlCache::new(Duration::from_secs(300));
        cache.set_with_ttl("short", 1, Duration::from_secs(1));
        cache.set("long", 2);

        advance(Duration::from_secs(2)).await;
        assert!(!cache.has("short"));
        assert!(cache.has("long"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_and_refreshes_expiry() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.set("k", 1);

        advance(Duration::from_secs(8)).await;
        cache.set("k", 2);

        advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_size_never_counts_expired_entries() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.set_with_ttl("a", 1, Duration::from_secs(1));
        cache.set_with_ttl("b", 2, Duration::from_secs(5));
        cache.set("c", 3);
        assert_eq!(cache.size(), 3);

        advance(Duration::from_secs(2)).await;
        assert_eq!(cache.size(), 2);

        advance(Duration::from_secs(4)).await;
        assert_eq!(cache.size(), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                total: 1,
                valid: 1,
                expired: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_does_not_evict() {
        let cache = TtlCache::new(Duration::from_secs(1));
        cache.set("a", 1);
        cache.set_with_ttl("b", 2, Duration::from_secs(100));

        advance(Duration::from_secs(2)).await;
        let stats = cache.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(cache.stats(), stats);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache: TtlCache<u32> = TtlCache::default();
        cache.set("a", 1);
        cache.set("b", 2);

        cache.delete("a");
        assert!(!cache.has("a"));
        assert!(cache.has("b"));

        cache.clear();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_default_ttl_is_five_minutes() {
        let cache: TtlCache<()> = TtlCache::default();
        assert_eq!(cache.default_ttl(), Duration::from_secs(300));
    }
}
