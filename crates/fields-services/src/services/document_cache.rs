//! Write-through document cache.
//!
//! Every save and read refreshes the entry; deletes drop it. Backed by an
//! in-process LRU with a TTL, sized from configuration.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value as JsonValue;

/// Cache key for a custom-field document.
pub fn cache_key(custom_field_id: &str) -> String {
    format!("CUSTOM_FIELD_{}", custom_field_id)
}

#[async_trait]
pub trait DocumentCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<JsonValue>;
    async fn put(&self, key: &str, document: JsonValue);
    async fn remove(&self, key: &str);
}

pub struct LruDocumentCache {
    entries: Mutex<LruCache<String, (Instant, JsonValue)>>,
    ttl: Duration,
}

impl LruDocumentCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, (Instant, JsonValue)>> {
        // A poisoned lock means a panic mid-insert; the cache content is
        // still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DocumentCache for LruDocumentCache {
    async fn get(&self, key: &str) -> Option<JsonValue> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some((stored_at, _)) => stored_at.elapsed() > self.ttl,
            None => return None,
        };
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|(_, document)| document.clone())
    }

    async fn put(&self, key: &str, document: JsonValue) {
        self.lock().put(key.to_string(), (Instant::now(), document));
    }

    async fn remove(&self, key: &str) {
        self.lock().pop(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_remove() {
        let cache = LruDocumentCache::new(4, Duration::from_secs(60));
        let key = cache_key("cf-1");
        assert_eq!(cache.get(&key).await, None);

        cache.put(&key, json!({"name": "Department"})).await;
        assert_eq!(cache.get(&key).await, Some(json!({"name": "Department"})));

        cache.remove(&key).await;
        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_read_as_absent() {
        let cache = LruDocumentCache::new(4, Duration::from_millis(0));
        cache.put("k", json!(1)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cache = LruDocumentCache::new(2, Duration::from_secs(60));
        cache.put("a", json!(1)).await;
        cache.put("b", json!(2)).await;
        cache.put("c", json!(3)).await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("c").await, Some(json!(3)));
    }

    #[test]
    fn test_cache_key_prefix() {
        assert_eq!(cache_key("abc"), "CUSTOM_FIELD_abc");
    }
}
