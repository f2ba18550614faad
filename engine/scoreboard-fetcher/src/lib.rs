//! Scoreboard Fetcher
//!
//! Fetches the scoreboard's leaderboard and score history exports for a set of
//! tracked teams and turns them into score series and ranks. The fetcher can be
//! used one request at a time through [`ScoreboardService`], or driven on a fixed
//! interval through [`ScoreboardPoller`].

pub mod config;
pub mod orchestrator;
pub mod scheduler;
pub mod source;

pub use config::FetcherConfig;
pub use orchestrator::{ScoreReport, ScoreboardService, Standing};
pub use scheduler::{PollEvent, PollerHandle, ScoreboardPoller};
pub use source::{HttpScoreboardSource, ScoreboardSource};
