//! In-memory TTL cache for weather results.
//!
//! `TtlCache` maps string keys to clonable values with an absolute expiry.
//! Expired entries are dropped lazily when read, or in bulk by
//! [`TtlCache::cleanup_expired`] which the scheduler calls periodically.
//!
//! A single `parking_lot::Mutex` guards the map. It is held for one map
//! operation at a time and never across an `.await`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::weather::types::WeatherData;

/// Cache port used by the weather lookup.
pub trait WeatherCache: Send + Sync {
    /// Returns the stored value if present and unexpired.
    fn get(&self, key: &str) -> Option<WeatherData>;

    /// Stores `value` for `ttl`, replacing any existing entry.
    fn set(&self, key: &str, value: WeatherData, ttl: Duration);

    fn delete(&self, key: &str);

    fn clear(&self);
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Mutex-guarded map of entries with per-entry expiry.
#[derive(Debug)]
pub struct TtlCache<V: Clone> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value only while it is within its TTL.
    /// An expired entry is removed as part of the same read.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        match entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
        }

        entries.remove(key);
        None
    }

    /// Last write wins.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl WeatherCache for TtlCache<WeatherData> {
    fn get(&self, key: &str) -> Option<WeatherData> {
        TtlCache::get(self, key)
    }

    fn set(&self, key: &str, value: WeatherData, ttl: Duration) {
        TtlCache::set(self, key, value, ttl)
    }

    fn delete(&self, key: &str) {
        TtlCache::delete(self, key)
    }

    fn clear(&self) {
        TtlCache::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn get_returns_none_when_cache_is_empty() {
        let cache = TtlCache::<u64>::new();
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn get_returns_value_when_entry_is_fresh() {
        let cache = TtlCache::new();
        cache.set("answer", 42_u64, Duration::from_secs(1));

        assert_eq!(cache.get("answer"), Some(42));
    }

    #[test]
    fn expired_entry_is_removed_on_read() {
        let cache = TtlCache::new();
        cache.set("answer", 42_u64, Duration::from_millis(10));
        cache.set("other", 7_u64, Duration::from_secs(60));
        thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("answer").is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("other"), Some(7));
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = TtlCache::new();
        cache.set("k", 1_u64, Duration::from_secs(5));
        cache.set("k", 2_u64, Duration::from_secs(5));

        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn overwrite_resets_expiry() {
        let cache = TtlCache::new();
        cache.set("k", 1_u64, Duration::from_millis(10));
        cache.set("k", 2_u64, Duration::from_secs(5));
        thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn delete_removes_entry_and_ignores_missing_keys() {
        let cache = TtlCache::new();
        cache.set("k", 1_u64, Duration::from_secs(5));

        cache.delete("k");
        cache.delete("k");
        cache.delete("never-set");

        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_on_empty_cache_is_a_no_op() {
        let cache = TtlCache::<u64>::new();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_all_entries() {
        let cache = TtlCache::new();
        cache.set("a", 1_u64, Duration::from_secs(5));
        cache.set("b", 2_u64, Duration::from_secs(5));
        cache.clear();

        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn cleanup_expired_counts_removed_entries() {
        let cache = TtlCache::new();
        cache.set("stale-1", 1_u64, Duration::from_millis(5));
        cache.set("stale-2", 2_u64, Duration::from_millis(5));
        cache.set("fresh", 3_u64, Duration::from_secs(60));
        thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.cleanup_expired(), 0);
    }

    #[test]
    fn concurrent_writers_leave_one_entry_per_key() {
        let cache = Arc::new(TtlCache::new());
        let handles: Vec<_> = (0..8_u64)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..100 {
                        cache.set("shared", i, Duration::from_secs(5));
                        let _ = cache.get("shared");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("writer thread panicked");
        }

        assert_eq!(cache.len(), 1);
        assert!(cache.get("shared").is_some());
    }

    proptest! {
        #[test]
        fn get_after_set_round_trips(key in "[a-z:]{1,32}", value in any::<u64>()) {
            let cache = TtlCache::new();
            cache.set(&key, value, Duration::from_secs(60));
            prop_assert_eq!(cache.get(&key), Some(value));
        }
    }
}
