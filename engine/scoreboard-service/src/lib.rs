//! Scoreboard HTTP service
//!
//! Serves tracked-team scores and ranks over REST, backed by the upstream
//! scoreboard through [`scoreboard_fetcher::ScoreboardService`].

pub mod config;
pub mod logging;
pub mod rest_api;
pub mod signals;

pub use config::{load_config, LoggingConfig, ServerConfig, ServiceConfig};
pub use logging::initialize_logging;
pub use rest_api::create_routes;
pub use signals::setup_signal_handlers;
