//! Request orchestration: validate, fetch both upstream resources, transform

use crate::config::UpstreamConfig;
use crate::source::{HttpScoreboardSource, ScoreboardSource};
use scoreboard_core::{
    decode_history, decode_leaderboard, dedup_preserving_order, rank, reconstruct, CompetitorId,
    RankMap, RankedEntry, Result, SeriesMap,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Score series and ranks for one set of tracked teams
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Validated, de-duplicated teams in request order
    pub teams: Vec<CompetitorId>,
    /// Cumulative score series per team (empty when no history is available)
    pub series: SeriesMap,
    /// Ranks per team; teams absent from the leaderboard have no entry
    pub ranks: RankMap,
}

/// A team's place on the leaderboard, with a placeholder for teams not listed yet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Standing<'a> {
    Ranked(&'a RankedEntry),
    NotStarted,
}

impl ScoreReport {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Rank entry for a team, or `NotStarted` when the leaderboard does not list it
    pub fn standing(&self, team: &CompetitorId) -> Standing<'_> {
        match self.ranks.get(team) {
            Some(entry) => Standing::Ranked(entry),
            None => Standing::NotStarted,
        }
    }

    /// Latest reconstructed value for a team
    pub fn latest_value(&self, team: &CompetitorId) -> Option<f64> {
        self.series.get(team).and_then(|points| points.last()).map(|point| point.value)
    }
}

/// Produces score reports from a scoreboard source
#[derive(Clone)]
pub struct ScoreboardService {
    source: Arc<dyn ScoreboardSource>,
}

impl ScoreboardService {
    pub fn new(source: Arc<dyn ScoreboardSource>) -> Self {
        Self { source }
    }

    /// Create a service backed by the public HTTP API
    pub fn from_config(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let source = HttpScoreboardSource::new(config.clone())?;
        Ok(Self::new(Arc::new(source)))
    }

    /// Fetch history and leaderboard for `teams` and build their report.
    ///
    /// Every identifier is validated before anything is fetched. An empty list
    /// returns an empty report without contacting upstream, since upstream
    /// treats an empty team filter as "every team". Both resources are fetched
    /// concurrently; if either fails the whole call fails.
    pub async fn get_scores_and_ranks<S: AsRef<str>>(&self, teams: &[S]) -> Result<ScoreReport> {
        let teams = dedup_preserving_order(CompetitorId::parse_all(teams)?);
        if teams.is_empty() {
            return Ok(ScoreReport::default());
        }

        let (leaderboard, history) = tokio::try_join!(
            self.source.fetch_leaderboard(),
            self.source.fetch_history(&teams)
        )?;

        let table = decode_history(history)?;
        let leaderboard = decode_leaderboard(leaderboard)?;

        let series = reconstruct(&table, &teams);
        let ranks = rank(&leaderboard, &teams);

        info!(
            "Built report for {} teams: {} history rows, {} leaderboard entries, {} ranked",
            teams.len(),
            table.rows.len(),
            leaderboard.len(),
            ranks.len()
        );

        Ok(ScoreReport { teams, series, ranks })
    }
}
