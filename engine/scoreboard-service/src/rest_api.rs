//! REST API endpoints for tracked team scores
//!
//! Both endpoints return the same body: per-team score series, per-team ranks,
//! and a merged chart timeline. Teams missing from the leaderboard simply have
//! no entry under `ranks`; rendering a placeholder for them is up to the client.

use chrono::{Datelike, Utc};
use scoreboard_core::{merge_timeline, CompetitorId, RankMap, ScoreboardError, SeriesMap, TimelineRow};
use scoreboard_fetcher::ScoreboardService;
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::Filter;

/// Body of `POST /api/teams/scores`
#[derive(Debug, Deserialize)]
pub struct ScoresRequest {
    pub teams: Vec<String>,
    /// Year used to date the timeline; defaults to the current year
    #[serde(default)]
    pub year: Option<i32>,
}

/// Query of `GET /api/teams/scores`
#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    /// Comma-separated team numbers
    #[serde(default)]
    pub teams: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Scores response
#[derive(Debug, Serialize)]
pub struct ScoresResponse {
    pub teams: Vec<CompetitorId>,
    pub series: SeriesMap,
    pub ranks: RankMap,
    pub timeline: Vec<TimelineRow>,
    pub fetched_at: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

fn status_for(error: &ScoreboardError) -> StatusCode {
    match error {
        ScoreboardError::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
        ScoreboardError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        ScoreboardError::MalformedUpstreamData { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Build the scores reply for a team list
pub async fn get_team_scores(
    teams: Vec<String>,
    year: Option<i32>,
    service: ScoreboardService,
) -> Result<impl warp::Reply, warp::Rejection> {
    let now = Utc::now();

    match service.get_scores_and_ranks(&teams).await {
        Ok(report) => {
            let timeline = merge_timeline(&report.series, year.unwrap_or_else(|| now.year()));
            let response = ScoresResponse {
                teams: report.teams,
                series: report.series,
                ranks: report.ranks,
                timeline,
                fetched_at: now.to_rfc3339(),
            };
            Ok(warp::reply::with_status(warp::reply::json(&response), StatusCode::OK))
        }
        Err(error) => {
            tracing::warn!("Score request for {:?} failed: {}", teams, error);
            let response = ErrorResponse {
                error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
                timestamp: now.to_rfc3339(),
            };
            Ok(warp::reply::with_status(warp::reply::json(&response), status_for(&error)))
        }
    }
}

fn split_teams(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect()
}

/// Create all REST routes
pub fn create_routes(
    service: ScoreboardService,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let service_filter = warp::any().map(move || service.clone());

    // Team scores, JSON body
    let scores_post = warp::path!("api" / "teams" / "scores")
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json::<ScoresRequest>())
        .and(service_filter.clone())
        .and_then(|request: ScoresRequest, service: ScoreboardService| async move {
            get_team_scores(request.teams, request.year, service).await
        });

    // Team scores, query string
    let scores_get = warp::path!("api" / "teams" / "scores")
        .and(warp::get())
        .and(warp::query::<ScoresQuery>())
        .and(service_filter)
        .and_then(|query: ScoresQuery, service: ScoreboardService| async move {
            get_team_scores(split_teams(&query.teams), query.year, service).await
        });

    // Health check endpoint
    let health = warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339()
        }))
    });

    scores_post.or(scores_get).or(health).with(
        warp::cors()
            .allow_any_origin()
            .allow_headers(vec!["content-type"])
            .allow_methods(vec!["GET", "POST", "OPTIONS"]),
    )
}
