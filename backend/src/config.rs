//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `backend.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - ServerConfig: Address the http listener binds to.
//!     - CorsConfig: Origins allowed to call the api from a browser.
//!     - LoggingConfig: Default log filter (RUST_LOG still wins).
//!
//! the mongodb uri is deliberately NOT part of this file. it is a secret and
//! comes from the environment (MONGO_URI, optionally via a .env file).
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// environment variable holding the mongodb connection string
pub const MONGO_URI_VAR: &str = "MONGO_URI";

/// environment variable pointing at an explicit config file
pub const CONFIG_PATH_VAR: &str = "BACKEND_CONFIG";

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen_addr: default_listen_addr() }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: default_allowed_origins() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// where the active configuration came from
///
/// config is loaded before logging exists, so the outcome is kept and
/// reported once the subscriber is up.
#[derive(Debug)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults {
        /// files that existed but could not be used, with the reason
        rejected: Vec<(PathBuf, String)>,
    },
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => {
                tracing::info!(path = %path.display(), "loaded configuration");
            }
            ConfigOrigin::Defaults { rejected } => {
                for (path, reason) in rejected {
                    tracing::warn!(path = %path.display(), error = %reason, "failed to load config file");
                }
                tracing::warn!("no usable config file found - using defaults");
            }
        }
    }
}

impl BackendConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    /// Load with default fallback
    pub fn load_or_default() -> (Self, ConfigOrigin) {
        let mut paths = Vec::new();
        if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from("config").join("backend.toml"));
        paths.push(PathBuf::from("..").join("config").join("backend.toml"));

        Self::load_first(&paths)
    }

    fn load_first(paths: &[PathBuf]) -> (Self, ConfigOrigin) {
        let mut rejected = Vec::new();

        for path in paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => return (config, ConfigOrigin::File(path.clone())),
                    Err(e) => rejected.push((path.clone(), e.to_string())),
                }
            }
        }

        (Self::default(), ConfigOrigin::Defaults { rejected })
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        tracing::info!(
            listen_addr = %self.server.listen_addr,
            allowed_origins = ?self.cors.allowed_origins,
            log_level = %self.logging.level,
            "backend configuration"
        );
    }
}

/// the mongodb uri, if one is set and non-empty
pub fn mongo_uri_from_env() -> Option<String> {
    std::env::var(MONGO_URI_VAR)
        .ok()
        .filter(|uri| !uri.trim().is_empty())
}
