//! Scoreboard Core
//!
//! Pure transforms over a competition scoreboard's exports: rebuilding
//! per-competitor score series from the wide history table, and computing
//! national and regional ranks from the sorted leaderboard. Nothing in this
//! crate performs I/O or keeps state between calls.

pub mod chart;
pub mod error;
pub mod history;
pub mod payload;
pub mod ranking;
pub mod types;

pub use chart::{merge_timeline, parse_upstream_time, TimelineRow};
pub use error::{Result, ScoreboardError, UpstreamResource};
pub use history::{detect_label_format, reconstruct, CarryForwardState, LabelFormat};
pub use payload::{decode_history, decode_leaderboard};
pub use ranking::{partition_by_region, rank, RegionalPartition};
pub use types::*;
