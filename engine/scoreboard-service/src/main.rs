//! Scoreboard Service
//!
//! Loads configuration, starts the REST API and shuts down on Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use scoreboard_fetcher::ScoreboardService;
use std::path::PathBuf;
use tracing::info;

use scoreboard_service::{create_routes, initialize_logging, load_config, setup_signal_handlers};

#[derive(Parser)]
#[command(name = "scoreboard-service")]
#[command(about = "REST API for tracked scoreboard teams")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;

    info!("Starting Scoreboard Service v{}", env!("CARGO_PKG_VERSION"));

    let service = ScoreboardService::from_config(&config.fetcher.upstream)?;
    let routes = create_routes(service);
    let addr = config.server.addr()?;

    let shutdown_signal = setup_signal_handlers()?;
    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async move {
            let _ = shutdown_signal.await;
            info!("Shutdown signal received");
        })
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on http://{}", bound);
    server.await;

    info!("Scoreboard Service shutdown complete");
    Ok(())
}
