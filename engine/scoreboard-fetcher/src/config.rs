use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the scoreboard fetcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Upstream scoreboard endpoints
    pub upstream: UpstreamConfig,

    /// Poller configuration
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the scoreboard (no trailing slash)
    pub base_url: String,

    /// Path of the full team listing
    pub scores_path: String,

    /// Path of the wide-format score history export
    pub chart_path: String,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between refresh cycles
    pub interval_secs: u64,

    /// Teams tracked when the poller starts
    pub teams: Vec<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scoreboard.uscyberpatriot.org".to_string(),
            scores_path: "/api/team/scores.php".to_string(),
            chart_path: "/api/image/chart.php".to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("scoreboard-fetcher/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 60, teams: Vec::new() }
    }
}

impl UpstreamConfig {
    pub fn scores_url(&self) -> String {
        format!("{}{}", self.base_url, self.scores_path)
    }

    pub fn chart_url(&self) -> String {
        format!("{}{}", self.base_url, self.chart_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", name, raw, e)),
        Err(_) => Ok(None),
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `SCOREBOARD_*` environment variables if present
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(base_url) = std::env::var("SCOREBOARD_BASE_URL") {
            self.upstream.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = parse_env::<u64>("SCOREBOARD_TIMEOUT_SECS")? {
            self.upstream.request_timeout_secs = timeout;
        }

        if let Some(interval) = parse_env::<u64>("SCOREBOARD_POLL_SECS")? {
            self.polling.interval_secs = interval;
        }

        if let Ok(teams) = std::env::var("SCOREBOARD_TEAMS") {
            self.polling.teams = teams
                .split(',')
                .map(str::trim)
                .filter(|team| !team.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: FetcherConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject values that would make the fetcher unusable
    pub fn validate(&self) -> Result<()> {
        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            anyhow::bail!("Upstream base URL must be http(s): {}", self.upstream.base_url);
        }
        if self.upstream.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be at least one second");
        }
        if self.polling.interval_secs == 0 {
            anyhow::bail!("Polling interval must be at least one second");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.polling.interval(), Duration::from_secs(60));
        assert_eq!(
            config.upstream.scores_url(),
            "https://scoreboard.uscyberpatriot.org/api/team/scores.php"
        );
        assert_eq!(
            config.upstream.chart_url(),
            "https://scoreboard.uscyberpatriot.org/api/image/chart.php"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[upstream]
base_url = "http://localhost:9000"

[polling]
interval_secs = 15
teams = ["18-0001", "18-0002"]
"#
        )
        .unwrap();

        let config = FetcherConfig::from_file(file.path()).unwrap();
        assert_eq!(config.upstream.base_url, "http://localhost:9000");
        assert_eq!(config.upstream.scores_path, "/api/team/scores.php");
        assert_eq!(config.polling.interval_secs, 15);
        assert_eq!(config.polling.teams, vec!["18-0001", "18-0002"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(FetcherConfig::from_file("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FetcherConfig::default();
        config.polling.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = FetcherConfig::default();
        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }
}
