//! Core domain types shared by the reconstructor and the rank calculator

use crate::error::{Result, ScoreboardError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

static COMPETITOR_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{4}$").expect("competitor id pattern is valid"));

/// Separator between the competitor id and the suffix in composite column labels
pub const LABEL_SEPARATOR: char = '_';

/// Literal cell value meaning "unchanged since the last reading"
pub const UNCHANGED_SENTINEL: &str = "null";

/// Competitor identifier in `NN-NNNN` form (e.g. "18-0001")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompetitorId(String);

impl CompetitorId {
    /// Validate and wrap a raw identifier
    pub fn parse(raw: &str) -> Result<Self> {
        if COMPETITOR_ID_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ScoreboardError::invalid_identifier(raw))
        }
    }

    /// Validate every identifier, failing on the first malformed one
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>> {
        raw.iter().map(|id| Self::parse(id.as_ref())).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CompetitorId {
    type Error = ScoreboardError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CompetitorId> for String {
    fn from(id: CompetitorId) -> Self {
        id.0
    }
}

/// Remove duplicate identifiers, keeping the first occurrence of each
pub fn dedup_preserving_order(ids: Vec<CompetitorId>) -> Vec<CompetitorId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// One row of the national leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Competitor identifier as delivered upstream
    pub team_number: String,
    /// Cumulative score
    pub score: f64,
    /// Region code (state or country)
    pub region: String,
    /// Passthrough fields (division, tier, play time, ...) kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LeaderboardEntry {
    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    pub fn division(&self) -> Option<&str> {
        self.extra_str("division")
    }

    pub fn tier(&self) -> Option<&str> {
        self.extra_str("tier")
    }
}

/// Leaderboard entry with its national and regional position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    /// 1-based position in the full leaderboard
    pub national_rank: u32,
    /// 1-based position among entries sharing the same region
    pub regional_rank: u32,
}

/// Column descriptor of the wide history table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
}

impl Column {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// Competitor id prefix of the label (the whole label when no separator is present)
    pub fn owner_prefix(&self) -> &str {
        self.label.split(LABEL_SEPARATOR).next().unwrap_or(&self.label)
    }

    pub fn is_composite(&self) -> bool {
        self.label.contains(LABEL_SEPARATOR)
    }
}

/// A single non-timestamp cell of the wide history table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// A numeric reading
    Value(f64),
    /// The upstream sentinel: repeat the last known reading for this column
    Unchanged,
    /// No reading at all; the column's carry-forward value is forgotten
    Missing,
}

/// One row of the wide history table
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub timestamp: String,
    /// One cell per non-timestamp column, in column order
    pub cells: Vec<Cell>,
}

/// Wide-format score history: one column per tracked entity, one row per reading time
#[derive(Debug, Clone, PartialEq)]
pub struct WideHistoryTable {
    /// Label of the leading timestamp column
    pub timestamp_label: String,
    /// Non-timestamp columns, in upstream order
    pub columns: Vec<Column>,
    pub rows: Vec<HistoryRow>,
}

impl WideHistoryTable {
    /// The column immediately after the timestamp column, if any
    pub fn first_data_column(&self) -> Option<&Column> {
        self.columns.first()
    }
}

/// One point of a reconstructed series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    #[serde(rename = "time")]
    pub timestamp: String,
    pub value: f64,
}

impl TimePoint {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self { timestamp: timestamp.into(), value }
    }
}

/// Reconstructed series per competitor; every requested id is present as a key
pub type SeriesMap = BTreeMap<CompetitorId, Vec<TimePoint>>;

/// Rank lookups per competitor; ids missing from the leaderboard are absent
pub type RankMap = BTreeMap<CompetitorId, RankedEntry>;
