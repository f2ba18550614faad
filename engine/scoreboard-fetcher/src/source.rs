//! Upstream scoreboard resources

use crate::config::UpstreamConfig;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use scoreboard_core::{CompetitorId, Result, ScoreboardError, UpstreamResource};
use serde_json::Value;
use tracing::{debug, info};

/// Source of the two raw scoreboard payloads
#[async_trait]
pub trait ScoreboardSource: Send + Sync {
    /// Fetch the full leaderboard, sorted by score descending
    async fn fetch_leaderboard(&self) -> Result<Value>;

    /// Fetch the wide-format score history for the given teams
    async fn fetch_history(&self, teams: &[CompetitorId]) -> Result<Value>;
}

/// Scoreboard source backed by the public HTTP API
pub struct HttpScoreboardSource {
    config: UpstreamConfig,
    client: Client,
}

impl HttpScoreboardSource {
    /// Create a new HTTP source
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    async fn get_json(
        &self,
        resource: UpstreamResource,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ScoreboardError::unavailable(resource, e.to_string()))?;

        info!("Fetched {} from {}", resource, response.url());

        let status = response.status();
        if !status.is_success() {
            return Err(ScoreboardError::unavailable(
                resource,
                format!("request failed with status: {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScoreboardError::unavailable(resource, e.to_string()))?;
        debug!("Received {} bytes of {} data", body.len(), resource);

        serde_json::from_str(&body).map_err(|e| ScoreboardError::malformed(resource, e.to_string()))
    }
}

#[async_trait]
impl ScoreboardSource for HttpScoreboardSource {
    async fn fetch_leaderboard(&self) -> Result<Value> {
        self.get_json(UpstreamResource::Leaderboard, &self.config.scores_url(), &[]).await
    }

    async fn fetch_history(&self, teams: &[CompetitorId]) -> Result<Value> {
        let query: Vec<(&str, &str)> = teams.iter().map(|id| ("team[]", id.as_str())).collect();
        self.get_json(UpstreamResource::History, &self.config.chart_url(), &query).await
    }
}
