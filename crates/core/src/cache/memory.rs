//! In-process response cache tier.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{RequestSignature, ResponseCache};

struct Entry {
    body: String,
    expires_at: Instant,
}

/// In-memory cache with per-entry TTL. Expired entries are dropped lazily on
/// lookup and swept opportunistically on insert.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live (possibly expired, not yet swept) entries.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

// Sweep at most this often relative to insert count.
const SWEEP_EVERY: usize = 256;

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, signature: &RequestSignature) -> Option<String> {
        let key = signature.key();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, signature: &RequestSignature, body: String, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() % SWEEP_EVERY == SWEEP_EVERY - 1 {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);
        }
        entries.insert(
            signature.key(),
            Entry {
                body,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        let sig = RequestSignature::new("search", [("q", "neon")]);
        cache
            .set(&sig, "body".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get(&sig).await.as_deref(), Some("body"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        let sig = RequestSignature::new("search", [("q", "neon")]);
        cache
            .set(&sig, "body".to_string(), Duration::ZERO)
            .await;
        assert!(cache.get(&sig).await.is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new();
        let sig = RequestSignature::new("search", [("q", "neon")]);
        cache
            .set(&sig, "old".to_string(), Duration::from_secs(60))
            .await;
        cache
            .set(&sig, "new".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get(&sig).await.as_deref(), Some("new"));
    }
}
