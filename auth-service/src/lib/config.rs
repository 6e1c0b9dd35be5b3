use std::env;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::auth::cache::CacheSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub kafka: KafkaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    #[serde(default = "default_refresh_token_ttl_hours")]
    pub refresh_token_ttl_hours: i64,
}

/// Argon2 cost factor.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Redis connection URL; no caching when absent
    pub redis_url: Option<String>,
    #[serde(default = "default_cache_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_ttl_secs")]
    pub user_ttl_secs: u64,
    #[serde(default = "default_role_ttl_secs")]
    pub role_ttl_secs: u64,
    #[serde(default = "default_service_key_ttl_secs")]
    pub service_key_ttl_secs: u64,
}

/// Kafka settings; events are dropped when `brokers` is absent.
#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: Option<String>,
    #[serde(default = "default_kafka_topic")]
    pub topic: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings that deserialize but cannot run safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < 32 {
            return Err(ConfigError::Message(
                "jwt.secret must be at least 32 bytes".to_string(),
            ));
        }
        if self.jwt.access_token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "jwt.access_token_ttl_minutes must be positive".to_string(),
            ));
        }
        if self.jwt.refresh_token_ttl_hours <= 0 {
            return Err(ConfigError::Message(
                "jwt.refresh_token_ttl_hours must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl JwtConfig {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_ttl_minutes)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.refresh_token_ttl_hours)
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            timeout_ms: default_cache_timeout_ms(),
            user_ttl_secs: default_user_ttl_secs(),
            role_ttl_secs: default_role_ttl_secs(),
            service_key_ttl_secs: default_service_key_ttl_secs(),
        }
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: None,
            topic: default_kafka_topic(),
        }
    }
}

impl CacheConfig {
    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            timeout: Duration::from_millis(self.timeout_ms),
            user_ttl: Duration::from_secs(self.user_ttl_secs),
            role_ttl: Duration::from_secs(self.role_ttl_secs),
            service_key_ttl: Duration::from_secs(self.service_key_ttl_secs),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_access_token_ttl_minutes() -> i64 {
    15
}

fn default_refresh_token_ttl_hours() -> i64 {
    24 * 7
}

fn default_cache_timeout_ms() -> u64 {
    50
}

fn default_user_ttl_secs() -> u64 {
    300
}

fn default_role_ttl_secs() -> u64 {
    300
}

fn default_service_key_ttl_secs() -> u64 {
    600
}

fn default_kafka_topic() -> String {
    "auth-events".to_string()
}
