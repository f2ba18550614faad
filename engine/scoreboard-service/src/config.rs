//! Service configuration management

use anyhow::{Context, Result};
use scoreboard_fetcher::FetcherConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upstream and polling configuration
    pub fetcher: FetcherConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8081 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid server address {}:{}", self.host, self.port))
    }
}

/// Load configuration from an optional TOML file, then environment variables
pub fn load_config(config_file: Option<&Path>) -> Result<ServiceConfig> {
    let mut config = match config_file {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            load_from_file(path)?
        }
        None => ServiceConfig::default(),
    };

    load_from_env(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Load configuration from environment variables
fn load_from_env(config: &mut ServiceConfig) -> Result<()> {
    config.fetcher.apply_env()?;

    if let Ok(level) = std::env::var("SCOREBOARD_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Ok(format) = std::env::var("SCOREBOARD_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Ok(host) = std::env::var("SCOREBOARD_HOST") {
        config.server.host = host;
    }

    if let Ok(port) = std::env::var("SCOREBOARD_PORT") {
        config.server.port =
            port.parse().with_context(|| format!("Invalid SCOREBOARD_PORT: {port:?}"))?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    config.fetcher.validate()?;

    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    config.server.addr()?;

    Ok(())
}
