//! Configuration management for the ice cream directory backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ICD__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Record store selection
    pub store: StoreConfig,

    /// Hosted auth token verification
    pub auth: AuthConfig,

    /// Mail function endpoints
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// Which record store implementation backs the gateway
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the hosted auth provider
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// When false, mail is logged and dropped
    pub enabled: bool,

    /// Base URL of the serverless functions host
    pub functions_url: String,

    /// Bearer key sent with every function call
    pub api_key: String,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("ICD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/icecream_directory")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("store.backend", "postgres")?
            .set_default("auth.jwt_secret", "development-secret-key")?
            .set_default("notifications.enabled", false)?
            .set_default("notifications.functions_url", "http://localhost:54321")?
            .set_default("notifications.api_key", "")?
            .set_default("notifications.timeout_secs", 10)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ICD__ prefix)
            .add_source(
                Environment::with_prefix("ICD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for Config {
    /// In-memory configuration used by tests and local demos
    fn default() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
            },
            auth: AuthConfig {
                jwt_secret: "development-secret-key".to_string(),
            },
            notifications: NotificationConfig {
                enabled: false,
                functions_url: String::new(),
                api_key: String::new(),
                timeout_secs: 10,
            },
        }
    }
}
