//! SQLite-backed shared response cache tier.
//!
//! Intended for several service processes on one host sharing warm entries.
//! All failures are logged and surfaced as misses so a broken shared store
//! never takes a request down with it.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::warn;

use super::{RequestSignature, ResponseCache};

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for CacheStoreError {
    fn from(e: rusqlite::Error) -> Self {
        CacheStoreError::Database(e.to_string())
    }
}

/// SQLite-backed response cache.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path`.
    pub fn new(path: &Path) -> Result<Self, CacheStoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self, CacheStoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheStoreError> {
        conn.execute_batch(
            r#"
            -- One row per canonical request signature
            CREATE TABLE IF NOT EXISTS response_cache (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_response_cache_expires ON response_cache(expires_at);
            "#,
        )?;
        Ok(())
    }

    fn get_inner(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().timestamp();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT body, expires_at FROM response_cache WHERE key = ?",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((body, expires_at)) if expires_at > now => Ok(Some(body)),
            Some(_) => {
                conn.execute("DELETE FROM response_cache WHERE key = ?", params![key])?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set_inner(&self, key: &str, body: &str, ttl: Duration) -> Result<(), CacheStoreError> {
        let conn = self.conn.lock().unwrap();
        let expires_at = Utc::now().timestamp() + ttl.as_secs() as i64;
        conn.execute(
            "INSERT OR REPLACE INTO response_cache (key, body, expires_at) VALUES (?, ?, ?)",
            params![key, body, expires_at],
        )?;
        // Sweep anything already expired while we hold the connection.
        conn.execute(
            "DELETE FROM response_cache WHERE expires_at <= ?",
            params![Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ResponseCache for SqliteCache {
    async fn get(&self, signature: &RequestSignature) -> Option<String> {
        match self.get_inner(&signature.key()) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "shared cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, signature: &RequestSignature, body: String, ttl: Duration) {
        if let Err(e) = self.set_inner(&signature.key(), &body, ttl) {
            warn!(error = %e, "shared cache write failed, entry dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = SqliteCache::in_memory().unwrap();
        let sig = RequestSignature::new("discover/movie", [("page", "1")]);
        cache
            .set(&sig, "{\"page\":1}".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get(&sig).await.as_deref(), Some("{\"page\":1}"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = SqliteCache::in_memory().unwrap();
        let sig = RequestSignature::new("discover/movie", [("page", "1")]);
        cache.set(&sig, "body".to_string(), Duration::ZERO).await;
        assert!(cache.get(&sig).await.is_none());
    }

    #[tokio::test]
    async fn test_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let sig = RequestSignature::new("discover/tv", [("page", "2")]);

        {
            let cache = SqliteCache::new(&path).unwrap();
            cache
                .set(&sig, "body".to_string(), Duration::from_secs(60))
                .await;
        }

        let reopened = SqliteCache::new(&path).unwrap();
        assert_eq!(reopened.get(&sig).await.as_deref(), Some("body"));
    }
}
