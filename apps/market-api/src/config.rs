//! Market API configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional
//! `market.toml` next to the binary, then `MARKET_*` environment variables.
//! A `.env` file is loaded into the environment first when present.
//!
//! | key | env | default |
//! |---|---|---|
//! | `http_host` | `MARKET_HTTP_HOST` | `0.0.0.0` |
//! | `http_port` | `MARKET_HTTP_PORT` | `8080` |
//! | `database_path` | `MARKET_DATABASE_PATH` | `./market.db` |
//! | `db_max_connections` | `MARKET_DB_MAX_CONNECTIONS` | `5` |
//! | `redis_url` | `MARKET_REDIS_URL` | unset (in-process cache) |
//! | `list_cache_ttl_secs` | `MARKET_LIST_CACHE_TTL_SECS` | `15` |
//! | `employee_password` | `MARKET_EMPLOYEE_PASSWORD` | `1234` |
//! | `request_timeout_secs` | `MARKET_REQUEST_TIMEOUT_SECS` | `10` |

use std::net::SocketAddr;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_FILE: &str = "market";
const ENV_PREFIX: &str = "MARKET";

/// Market API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface the HTTP server binds to
    pub http_host: String,

    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Upper bound of the SQLite pool
    pub db_max_connections: u32,

    /// Redis connection string (optional)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Lifetime of cached list responses
    pub list_cache_ttl_secs: u64,

    /// Shared secret expected in the `Password` header of employee routes
    pub employee_password: String,

    /// Per-request deadline
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            database_path: "./market.db".to_string(),
            db_max_connections: 5,
            redis_url: None,
            list_cache_ttl_secs: 15,
            employee_password: "1234".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `market.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!(error = %e, "Failed to read .env file");
            }
        }

        let builder = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::from_builder(builder)
    }

    /// A builder pre-seeded with every default value.
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = AppConfig::default();
        let builder = Config::builder()
            .set_default("http_host", defaults.http_host)?
            .set_default("http_port", i64::from(defaults.http_port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("list_cache_ttl_secs", defaults.list_cache_ttl_secs)?
            .set_default("employee_password", defaults.employee_password)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?;

        Ok(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidValue("http_port".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs".to_string()));
        }
        if self.employee_password.is_empty() {
            return Err(ConfigError::MissingRequired("employee_password".to_string()));
        }
        if matches!(&self.redis_url, Some(url) if url.trim().is_empty()) {
            return Err(ConfigError::InvalidValue("redis_url".to_string()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http_host, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("http_host".to_string()))
    }

    pub fn list_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.list_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
