use scoreboard_fetcher::{FetcherConfig, ScoreboardService, Standing};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Testing scoreboard fetcher");

    let config = FetcherConfig::from_env()?;
    config.validate()?;

    let mut teams: Vec<String> = std::env::args().skip(1).collect();
    if teams.is_empty() {
        teams = config.polling.teams.clone();
    }
    info!("Fetching scores for {:?}", teams);

    let service = ScoreboardService::from_config(&config.upstream)?;

    match service.get_scores_and_ranks(&teams).await {
        Ok(report) => {
            for team in &report.teams {
                let points = report.series.get(team).map(Vec::len).unwrap_or(0);
                match report.standing(team) {
                    Standing::Ranked(ranked) => info!(
                        "✅ {} - {} pts, #{} national, #{} in {} ({} history points)",
                        team,
                        ranked.entry.score,
                        ranked.national_rank,
                        ranked.regional_rank,
                        ranked.entry.region,
                        points
                    ),
                    Standing::NotStarted => {
                        info!("⏳ {} - not on the leaderboard yet ({} history points)", team, points)
                    }
                }
            }
        }
        Err(e) => {
            error!("❌ Failed to fetch scores: {}", e);
            return Err(e.into());
        }
    }

    info!("Test completed!");
    Ok(())
}
