//! Scoreboard CLI
//!
//! Two modes:
//! - snapshot: fetch scores and ranks once
//! - watch: keep refreshing on an interval

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use scoreboard_core::CompetitorId;
use scoreboard_fetcher::{
    FetcherConfig, PollEvent, ScoreReport, ScoreboardPoller, ScoreboardService, Standing,
};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "scoreboard-cli")]
#[command(about = "Track competition teams on the public scoreboard")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch scores and ranks once
    Snapshot {
        /// Team number (repeatable); defaults to SCOREBOARD_TEAMS
        #[arg(short, long = "team")]
        teams: Vec<String>,

        /// Print the raw report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refresh scores and ranks until interrupted
    Watch {
        /// Team number (repeatable); defaults to SCOREBOARD_TEAMS
        #[arg(short, long = "team")]
        teams: Vec<String>,

        /// Refresh interval in seconds; defaults to the configured interval
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = FetcherConfig::from_env()?;
    config.validate()?;
    let service = ScoreboardService::from_config(&config.upstream)?;

    match cli.command {
        Commands::Snapshot { teams, json } => {
            let teams = if teams.is_empty() { config.polling.teams.clone() } else { teams };
            let report = service.get_scores_and_ranks(&teams).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Watch { teams, interval } => {
            let teams = if teams.is_empty() { config.polling.teams.clone() } else { teams };
            let interval =
                interval.map(Duration::from_secs).unwrap_or_else(|| config.polling.interval());
            watch(service, teams, interval).await;
        }
    }

    Ok(())
}

async fn watch(service: ScoreboardService, teams: Vec<String>, interval: Duration) {
    println!("{}", format!("👀 Watching {} teams every {:?}", teams.len(), interval).bold());
    let mut handle = ScoreboardPoller::new(service, interval).spawn(teams);

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(PollEvent::Updated { report, at }) => {
                    println!("\n{}", format!("Updated {}", at.format("%H:%M:%S")).dimmed());
                    print_report(&report);
                }
                Some(PollEvent::Failed { error, at }) => {
                    println!(
                        "\n{} {}",
                        at.format("%H:%M:%S").to_string().dimmed(),
                        format!("❌ {} ({})", error, error.code()).red()
                    );
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop();
}

fn print_report(report: &ScoreReport) {
    if report.is_empty() {
        println!("{}", "No teams tracked".yellow());
        return;
    }

    println!(
        "{:<10} {:>8} {:>9} {:>9}  {:<8} {}",
        "TEAM".bold(),
        "SCORE".bold(),
        "NATIONAL".bold(),
        "REGIONAL".bold(),
        "REGION".bold(),
        "TIER".bold()
    );
    for team in &report.teams {
        print_standing(report, team);
    }
}

fn print_standing(report: &ScoreReport, team: &CompetitorId) {
    match report.standing(team) {
        Standing::Ranked(ranked) => {
            println!(
                "{:<10} {:>8} {:>9} {:>9}  {:<8} {}",
                team.to_string().cyan(),
                format!("{:.0}", ranked.entry.score).green(),
                format!("#{}", ranked.national_rank),
                format!("#{}", ranked.regional_rank),
                ranked.entry.region,
                ranked.entry.tier().unwrap_or("Unknown")
            );
        }
        Standing::NotStarted => {
            let latest = report
                .latest_value(team)
                .map(|v| format!("{v:.0}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<10} {:>8} {}",
                team.to_string().cyan(),
                latest,
                "⏳ Waiting to start...".yellow()
            );
        }
    }
}
