//! Resolution cache store
//!
//! The resolver only needs `get`/`set` on a thread-safe store whose entries
//! expire on their own. [`MokaPlacementCache`] provides that with an
//! in-process Moka cache.

use super::key::CacheKey;
use super::policy::PlacementPolicy;
use std::time::Duration;
use tracing::debug;

/// Cached outcome of a resolution: `None` is a cached "no match"
pub type CachedPlacement = Option<PlacementPolicy>;

/// Thread-safe TTL store consulted by the resolver
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedPlacement>;
    fn set(&self, key: CacheKey, value: CachedPlacement);
}

/// In-memory cache service using Moka
///
/// All entries share the TTL configured at construction time.
#[derive(Clone)]
pub struct MokaPlacementCache {
    cache: moka::sync::Cache<CacheKey, CachedPlacement>,
    ttl: Duration,
}

impl std::fmt::Debug for MokaPlacementCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaPlacementCache")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entry_count", &self.cache.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl MokaPlacementCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = moka::sync::Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        debug!(
            max_capacity,
            ttl_seconds = ttl.as_secs(),
            "Placement cache created"
        );

        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl CacheStore for MokaPlacementCache {
    fn get(&self, key: &CacheKey) -> Option<CachedPlacement> {
        let result = self.cache.get(key);

        if result.is_some() {
            debug!(key = %key, "Cache HIT");
        } else {
            debug!(key = %key, "Cache MISS");
        }

        result
    }

    fn set(&self, key: CacheKey, value: CachedPlacement) {
        debug!(key = %key, ttl_seconds = self.ttl.as_secs(), "Cache SET");
        self.cache.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::key::cache_key;
    use crate::placement::PlacementSelectorTerm;

    fn key(name: &str) -> CacheKey {
        cache_key(&[PlacementSelectorTerm::new(name)]).unwrap()
    }

    fn policy(name: &str) -> PlacementPolicy {
        PlacementPolicy {
            name: name.to_string(),
            id: "1".to_string(),
            region: "us-central1".to_string(),
            self_link: String::new(),
            status: "READY".to_string(),
            collocation: "COLLOCATED".to_string(),
            vm_count: Some(2),
            availability_domain_count: None,
        }
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let cache = MokaPlacementCache::new(100, Duration::from_secs(60));
        assert_eq!(cache.ttl(), Duration::from_secs(60));
        assert_eq!(cache.get(&key("a")), None);
    }

    #[test]
    fn test_stores_match_and_no_match() {
        let cache = MokaPlacementCache::new(100, Duration::from_secs(60));
        cache.set(key("a"), Some(policy("a")));
        cache.set(key("b"), None);

        assert_eq!(cache.get(&key("a")), Some(Some(policy("a"))));
        assert_eq!(cache.get(&key("b")), Some(None));
    }

    #[test]
    fn test_set_overwrites() {
        let cache = MokaPlacementCache::new(100, Duration::from_secs(60));
        cache.set(key("a"), None);
        cache.set(key("a"), Some(policy("a")));
        assert_eq!(cache.get(&key("a")), Some(Some(policy("a"))));
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache = MokaPlacementCache::new(100, Duration::from_millis(50));
        cache.set(key("a"), Some(policy("a")));
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.get(&key("a")), None);
    }
}
