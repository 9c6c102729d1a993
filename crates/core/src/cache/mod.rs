//! Response cache for upstream API calls.
//!
//! Every upstream request is keyed by a [`RequestSignature`] built from the
//! endpoint identity and its canonicalized (sorted-key) query parameters, so
//! semantically identical requests hit the same entry regardless of parameter
//! order. Entries carry a TTL and are immutable once written; a later `set`
//! for the same signature replaces the entry wholesale.
//!
//! Two tiers sit behind the [`ResponseCache`] trait: an optional shared
//! SQLite-backed store consulted first, and an in-process store that is
//! always active. A failing shared tier degrades to the local tier and never
//! fails the request.

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Canonical identity of an upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    endpoint: String,
    params: Vec<(String, String)>,
}

impl RequestSignature {
    /// Build a signature from an endpoint name and its query parameters.
    /// Parameters are sorted by key (then value) so insertion order does not
    /// change the identity. Secrets such as API keys must not be passed in.
    pub fn new<I, K, V>(endpoint: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        params.sort();
        Self {
            endpoint: endpoint.to_string(),
            params,
        }
    }

    /// The canonical textual form, `endpoint?k1=v1&k2=v2`.
    pub fn canonical(&self) -> String {
        let mut out = self.endpoint.clone();
        for (i, (k, v)) in self.params.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        out
    }

    /// Compact storage key: SHA-256 digest of the canonical form, hex-encoded.
    pub fn key(&self) -> String {
        let digest = Sha256::digest(self.canonical().as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// One cache tier.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Look up a fresh entry. Tier failures are logged internally and
    /// reported as a miss.
    async fn get(&self, signature: &RequestSignature) -> Option<String>;

    /// Store a response body under the signature with the given TTL.
    /// Tier failures are logged internally and swallowed.
    async fn set(&self, signature: &RequestSignature, body: String, ttl: Duration);
}

/// Shared-then-local tier stack.
pub struct TieredCache {
    shared: Option<Arc<dyn ResponseCache>>,
    local: MemoryCache,
}

impl TieredCache {
    pub fn new(shared: Option<Arc<dyn ResponseCache>>) -> Self {
        Self {
            shared,
            local: MemoryCache::new(),
        }
    }

    /// Local tier only.
    pub fn local_only() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ResponseCache for TieredCache {
    async fn get(&self, signature: &RequestSignature) -> Option<String> {
        if let Some(shared) = &self.shared {
            if let Some(body) = shared.get(signature).await {
                debug!(endpoint = %signature.canonical(), tier = "shared", "cache hit");
                return Some(body);
            }
        }
        let hit = self.local.get(signature).await;
        if hit.is_some() {
            debug!(endpoint = %signature.canonical(), tier = "local", "cache hit");
        }
        hit
    }

    async fn set(&self, signature: &RequestSignature, body: String, ttl: Duration) {
        if let Some(shared) = &self.shared {
            shared.set(signature, body.clone(), ttl).await;
        }
        self.local.set(signature, body, ttl).await;
    }
}
