//! Configuration management for the Medistock core engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MEDISTOCK_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Local store configuration
    pub database: DatabaseConfig,

    /// Remote document-store configuration
    pub remote: RemoteConfig,

    /// Demo seed data configuration
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    /// Base URL of the remote document-store API
    pub base_url: String,

    /// Optional bearer token for the remote API
    pub api_key: Option<String>,

    /// Disable to run fully local (no reconciliation passes)
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Seed demo products into an empty catalog on startup
    pub demo_data: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("MEDISTOCK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("database.url", "sqlite://medistock.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("remote.base_url", "http://localhost:8080/api/v1")?
            .set_default("remote.enabled", false)?
            .set_default("seed.demo_data", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MEDISTOCK_ prefix)
            .add_source(
                Environment::with_prefix("MEDISTOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
