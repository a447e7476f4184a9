//! Application settings loaded from config.toml and the environment.
//!
//! Every field has a default, so the service starts without a config file.
//! `DATABASE_URL` and `BIND_ADDR` override the file; `GYM_CONFIG` points at an
//! alternative config path.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::config::plans::{PlanConfig, default_plans};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default path of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level structure of config.toml
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Store settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Plan catalog to seed
    #[serde(default = "default_plans")]
    pub plans: Vec<PlanConfig>,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3000`
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Seconds between membership expiry sweeps
    #[serde(default = "default_expiry_interval_secs")]
    pub expiry_interval_secs: u64,
}

/// Store settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

const fn default_expiry_interval_secs() -> u64 {
    3600
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            expiry_interval_secs: default_expiry_interval_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            plans: default_plans(),
        }
    }
}

/// Parses configuration from a TOML string
///
/// # Errors
/// Returns `Error::Config` if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or its contents do not parse.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration the way the binary does at startup.
///
/// Reads `GYM_CONFIG` (or `./config.toml`) when present, falls back to defaults
/// when the file is missing, then applies `DATABASE_URL` and `BIND_ADDR`.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("GYM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        tracing::info!("No config file at {path}; using defaults");
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(addr) = std::env::var("BIND_ADDR") {
        config.server.bind_addr = addr;
    }
    Ok(config)
}
