//! In-memory TTL cache.
//!
//! Short-lived caching for upstream API payloads to reduce rate-limit
//! pressure. Expiry is checked lazily on access; there is no background
//! sweeper task.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default time-to-live for entries inserted without an explicit TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of entries held at once.
pub const DEFAULT_MAX_SIZE: usize = 1024;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// A size-capped map of values with per-entry expiry.
///
/// When the cache is full, inserting evicts the entry closest to expiry
/// (not LRU). An expired entry is treated as absent and removed the next
/// time it is looked up.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    max_size: usize,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given default TTL and size cap.
    pub fn new(default_ttl: Duration, max_size: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            max_size: max_size.max(1),
        }
    }

    /// Look up a value, purging it if its expiry has passed.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a value with the default TTL.
    pub fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Insert a value with an explicit TTL.
    pub fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        if entries.len() >= self.max_size && !entries.contains_key(key) {
            // Evict the entry closest to expiry.
            let nearest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());
            if let Some(nearest) = nearest {
                entries.remove(&nearest);
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop every entry whose expiry has passed.
    ///
    /// `get` purges lazily, so entries nothing looks up again linger
    /// until eviction; long-lived processes can call this to reclaim
    /// them sooner.
    pub fn purge_expired(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries currently held, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_SIZE)
    }
}
