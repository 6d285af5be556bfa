//! Shared application state.

use std::sync::Arc;

use market_db::Database;

use crate::cache::ResponseCache;
use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: ResponseCache,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, cache: ResponseCache, config: AppConfig) -> Self {
        AppState {
            db,
            cache,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory database, in-process cache, default configuration.
    pub(crate) async fn for_tests() -> Self {
        use market_db::DbConfig;

        let config = AppConfig::default();
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = ResponseCache::memory(config.list_cache_ttl());
        AppState::new(db, cache, config)
    }
}
