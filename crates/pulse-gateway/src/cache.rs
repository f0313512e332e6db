use std::{
    collections::HashMap,
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};

use parking_lot::RwLock;
use serde_json::Value;

use crate::clock::Clock;

/// Cached upstream response together with the instant it was stored.
#[derive(Debug, Clone)]
struct CachedResponse {
    data: Value,
    inserted_at: Instant,
}

/// Process-wide cache of upstream responses, keyed by `method:params`.
///
/// Expiry is lazy: an expired entry is never served but stays in the map
/// until it is overwritten or [`ResponseCache::sweep_expired`] runs. The
/// server drives the sweep from a background task so the key space stays
/// bounded over process lifetime.
///
/// Concurrent inserts to the same key are last-writer-wins; every writer
/// computed equivalent data, so the race has no correctness impact.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CachedResponse>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Canonical cache key for a call.
    pub fn key(method: &str, params: &Value) -> String {
        format!("{method}:{params}")
    }

    /// Fetch a value while its TTL window is open.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if self.clock.now().duration_since(entry.inserted_at) < self.ttl => {
                metrics::counter!("pulse_rpc_cache_hit_total").increment(1);
                Some(entry.data.clone())
            }
            Some(_) => {
                metrics::counter!("pulse_rpc_cache_miss_total", "reason" => "expired")
                    .increment(1);
                None
            }
            None => {
                metrics::counter!("pulse_rpc_cache_miss_total", "reason" => "absent").increment(1);
                None
            }
        }
    }

    /// Store a value, overwriting any existing entry for the key.
    pub fn insert(&self, key: String, data: Value) {
        let inserted_at = self.clock.now();
        self.entries
            .write()
            .insert(key, CachedResponse { data, inserted_at });
    }

    /// Drop entries whose TTL has elapsed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
        let swept = before - entries.len();
        if swept > 0 {
            metrics::counter!("pulse_rpc_cache_swept_total").increment(swept as u64);
        }
        swept
    }

    /// Cache statistics for observability.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.read().len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entry_count: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;

    fn cache_with_clock(ttl_ms: u64) -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::new(Duration::from_millis(ttl_ms), clock.clone());
        (cache, clock)
    }

    #[test]
    fn fresh_entries_are_served() {
        let (cache, _clock) = cache_with_clock(1_500);
        cache.insert("getSlot:[]".to_string(), json!(1234));
        assert_eq!(cache.get("getSlot:[]"), Some(json!(1234)));
    }

    #[test]
    fn expired_entries_are_not_served_but_linger() {
        let (cache, clock) = cache_with_clock(1_500);
        cache.insert("getSlot:[]".to_string(), json!(1234));

        clock.advance(Duration::from_millis(1_501));

        assert_eq!(cache.get("getSlot:[]"), None);
        // Lazy expiry: the entry is still in the map until swept.
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let (cache, clock) = cache_with_clock(1_500);
        cache.insert("getSlot:[]".to_string(), json!(1));
        clock.advance(Duration::from_millis(1_000));
        cache.insert("getSupply:[]".to_string(), json!(2));
        clock.advance(Duration::from_millis(600));

        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.stats().entry_count, 1);
        assert_eq!(cache.get("getSupply:[]"), Some(json!(2)));
    }

    #[test]
    fn insert_overwrites_and_refreshes() {
        let (cache, clock) = cache_with_clock(1_500);
        cache.insert("getSlot:[]".to_string(), json!(1));
        clock.advance(Duration::from_millis(1_400));
        cache.insert("getSlot:[]".to_string(), json!(2));
        clock.advance(Duration::from_millis(200));

        // The overwrite restarted the TTL window.
        assert_eq!(cache.get("getSlot:[]"), Some(json!(2)));
    }

    #[test]
    fn keys_distinguish_params() {
        let a = ResponseCache::key("getBlockTime", &json!([100]));
        let b = ResponseCache::key("getBlockTime", &json!([200]));
        assert_ne!(a, b);
    }
}
