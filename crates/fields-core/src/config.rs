//! Configuration module
//!
//! Environment-driven configuration for the API and services: server, database,
//! search index, cache, upload policy, and enablement limits.

use std::env;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_CAPACITY: usize = 1024;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_HIERARCHY_LEVELS: usize = 4;
const DEFAULT_MAX_ENABLED_FIELDS: i64 = 20;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_LEDGER_CAS_RETRIES: u32 = 3;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,

    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,

    pub jwt_secret: String,

    pub search_index_url: String,
    pub search_index_name: String,

    pub cache_capacity: usize,
    pub cache_ttl_seconds: u64,

    /// Maximum number of hierarchy levels a master-list field may declare.
    pub max_hierarchy_levels: usize,
    /// Maximum total weight of enabled custom fields per organization.
    pub max_enabled_fields: i64,
    /// Retries for the ledger's read-modify-compare-and-swap loop.
    pub ledger_cas_retries: u32,

    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        Ok(Self {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            cors_origins: env_list("CORS_ORIGINS", ""),
            environment: env_or("ENVIRONMENT", "development"),
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS),
            jwt_secret,
            search_index_url: env_or("SEARCH_INDEX_URL", "http://localhost:9200"),
            search_index_name: env_or("SEARCH_INDEX_NAME", "custom_fields"),
            cache_capacity: env_parse("CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY),
            cache_ttl_seconds: env_parse("CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL_SECS),
            max_hierarchy_levels: env_parse(
                "CUSTOM_FIELD_MAX_LEVELS",
                DEFAULT_MAX_HIERARCHY_LEVELS,
            ),
            max_enabled_fields: env_parse(
                "CUSTOM_FIELD_MAX_ENABLED_COUNT",
                DEFAULT_MAX_ENABLED_FIELDS,
            ),
            ledger_cas_retries: env_parse("LEDGER_CAS_RETRIES", DEFAULT_LEDGER_CAS_RETRIES),
            allowed_extensions: env_list("UPLOAD_ALLOWED_EXTENSIONS", ".xlsx,.xls"),
            allowed_content_types: env_list(
                "UPLOAD_ALLOWED_CONTENT_TYPES",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet,application/vnd.ms-excel",
            ),
            max_upload_bytes: env_parse("UPLOAD_MAX_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env_or(key, default)
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
