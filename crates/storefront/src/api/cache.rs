//! Tag-invalidated query cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use super::endpoint::Tag;

const MAX_ENTRIES: u64 = 1000;

/// A cached response body and the tags its query provided.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: serde_json::Value,
    tags: &'static [Tag],
}

/// Query results keyed by endpoint name and arguments.
///
/// Every invalidation bumps an epoch. A query records the epoch before it
/// goes to the network and only stores its result if no invalidation ran in
/// between, so a response fetched before a mutation never outlives it.
pub struct QueryCache {
    entries: Cache<String, CacheEntry>,
    epoch: AtomicU64,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
            epoch: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).await.map(|entry| entry.data)
    }

    /// Current invalidation epoch, taken before a query is sent.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Store a query result unless an invalidation happened since `epoch`.
    pub async fn insert(
        &self,
        key: String,
        data: serde_json::Value,
        tags: &'static [Tag],
        epoch: u64,
    ) {
        if self.epoch() != epoch {
            debug!(key = %key, "Skipping cache insert after invalidation");
            return;
        }

        self.entries
            .insert(key.clone(), CacheEntry { data, tags })
            .await;

        // An invalidation may have run between the check and the insert
        if self.epoch() != epoch {
            self.entries.invalidate(&key).await;
        }
    }

    /// Drop every entry carrying one of `tags`.
    pub async fn invalidate_tags(&self, tags: &[Tag]) {
        if tags.is_empty() {
            return;
        }
        self.epoch.fetch_add(1, Ordering::AcqRel);

        let stale: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.tags.iter().any(|t| tags.contains(t)))
            .map(|(key, _)| key)
            .collect();

        debug!(tags = ?tags, entries = stale.len(), "Invalidating cache tags");
        for key in stale {
            self.entries.invalidate(key.as_str()).await;
        }
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_invalidate_only_matching_tags() {
        let cache = cache();
        let epoch = cache.epoch();
        cache
            .insert("getCart(u1)".to_string(), json!([1]), &[Tag::Cart], epoch)
            .await;
        cache
            .insert("getProducts()".to_string(), json!([2]), &[Tag::Product], epoch)
            .await;

        cache.invalidate_tags(&[Tag::Cart, Tag::Order]).await;

        assert!(cache.get("getCart(u1)").await.is_none());
        assert_eq!(cache.get("getProducts()").await, Some(json!([2])));
    }

    #[tokio::test]
    async fn test_stale_epoch_is_not_stored() {
        let cache = cache();
        let epoch = cache.epoch();
        cache.invalidate_tags(&[Tag::Cart]).await;
        cache
            .insert("getCart(u1)".to_string(), json!([]), &[Tag::Cart], epoch)
            .await;
        assert!(cache.get("getCart(u1)").await.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache();
        let epoch = cache.epoch();
        cache
            .insert("getWishlist()".to_string(), json!([]), &[Tag::Wishlist], epoch)
            .await;
        cache.clear();
        assert!(cache.get("getWishlist()").await.is_none());
    }
}
