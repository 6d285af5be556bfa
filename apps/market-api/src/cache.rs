//! # Response Cache
//!
//! Flat key/value cache for serialized list responses.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  redis_url configured ──► Redis (shared between API instances)          │
//! │  redis_url unset      ──► moka (per-process, TTL fixed at startup)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cache is an optimization only: backend failures are logged and
//! reported as a miss, never as a request error.

use std::fmt;
use std::time::Duration;

use moka::future::Cache;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{info, warn};

const MEMORY_CAPACITY: u64 = 10_000;

#[derive(Clone)]
pub enum ResponseCache {
    Memory(Cache<String, String>),
    Redis(ConnectionManager),
}

impl ResponseCache {
    pub fn memory(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MEMORY_CAPACITY)
            .time_to_live(ttl)
            .build();
        ResponseCache::Memory(cache)
    }

    pub async fn redis(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        info!("Connected to Redis");
        Ok(ResponseCache::Redis(manager))
    }

    /// Redis when `redis_url` is set and reachable, memory otherwise.
    pub async fn from_url(redis_url: Option<&str>, ttl: Duration) -> Self {
        let Some(url) = redis_url else {
            return ResponseCache::memory(ttl);
        };

        match ResponseCache::redis(url).await {
            Ok(cache) => cache,
            Err(e) => {
                warn!(error = %e, "Failed to connect to Redis, using in-process cache");
                ResponseCache::memory(ttl)
            }
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self {
            ResponseCache::Memory(cache) => cache.get(key).await,
            ResponseCache::Redis(manager) => {
                let mut conn = manager.clone();
                match conn.get::<_, Option<String>>(key).await {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cache read failed");
                        None
                    }
                }
            }
        }
    }

    pub async fn set(&self, key: &str, value: String, ttl: Duration) {
        match self {
            ResponseCache::Memory(cache) => cache.insert(key.to_string(), value).await,
            ResponseCache::Redis(manager) => {
                let mut conn = manager.clone();
                let seconds = ttl.as_secs().max(1);
                if let Err(e) = conn.set_ex::<_, _, ()>(key, value, seconds).await {
                    warn!(key = %key, error = %e, "Cache write failed");
                }
            }
        }
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCache::Memory(cache) => f
                .debug_struct("Memory")
                .field("entries", &cache.entry_count())
                .finish(),
            ResponseCache::Redis(_) => f.write_str("Redis"),
        }
    }
}
