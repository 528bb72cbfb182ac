use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Short id for `url`, used in callback data instead of the URL itself.
///
/// 12 hex digits of the 64-bit hash.
pub fn generate_url_id(url: &str) -> String {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    let hash = hasher.finish();
    let mut id = format!("{:016x}", hash);
    id.truncate(12);
    id
}

struct CachedItem {
    url: String,
    cached_at: Instant,
}

/// In-memory map from short ids to URLs behind the format keyboards.
pub struct UrlCache {
    cache: Arc<Mutex<HashMap<String, CachedItem>>>,
    ttl: Duration,
}

impl UrlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Stores `url` and returns its id. Storing again refreshes the TTL.
    pub async fn store(&self, url: &str) -> String {
        let id = generate_url_id(url);
        let mut cache = self.cache.lock().await;
        cache.insert(
            id.clone(),
            CachedItem {
                url: url.to_string(),
                cached_at: Instant::now(),
            },
        );
        id
    }

    pub async fn get(&self, id: &str) -> Option<String> {
        let mut cache = self.cache.lock().await;
        if let Some(item) = cache.get(id) {
            if item.cached_at.elapsed() < self.ttl {
                return Some(item.url.clone());
            }
            cache.remove(id);
        }
        None
    }

    /// Removes expired entries and returns how many were dropped.
    pub async fn cleanup(&self) -> usize {
        let mut cache = self.cache.lock().await;
        let before = cache.len();
        cache.retain(|_, item| item.cached_at.elapsed() < self.ttl);
        before - cache.len()
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Sweeps expired entries every `interval` for the lifetime of the process.
    pub fn spawn_cleanup_task(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = self.cleanup().await;
                if removed > 0 {
                    log::debug!("URL cache: removed {} expired entries", removed);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_id_is_stable_and_short() {
        let a = generate_url_id("https://youtu.be/dQw4w9WgXcQ");
        let b = generate_url_id("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, generate_url_id("https://youtu.be/aaaaaaaaaaa"));
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let cache = UrlCache::new(Duration::from_secs(60));
        let id = cache.store("https://youtu.be/dQw4w9WgXcQ").await;

        assert_eq!(cache.get(&id).await.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(cache.get("000000000000").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = UrlCache::new(Duration::ZERO);
        let id = cache.store("https://youtu.be/dQw4w9WgXcQ").await;

        assert_eq!(cache.get(&id).await, None);
        assert!(cache.is_empty().await);

        cache.store("https://youtu.be/aaaaaaaaaaa").await;
        assert_eq!(cache.cleanup().await, 1);
    }
}
