//! Upstream wire formats and their conversion into domain types
//!
//! The scoreboard publishes two JSON resources: a chart export shaped like a
//! Google Charts data table (`cols` / `rows[].c[].v`) and a flat team listing
//! (`data[]`). Neither format is under our control, so decoding is strict about
//! the parts the core relies on and permissive about everything else.

use crate::error::{Result, ScoreboardError, UpstreamResource};
use crate::types::{Cell, Column, HistoryRow, LeaderboardEntry, WideHistoryTable, UNCHANGED_SENTINEL};
use serde::Deserialize;
use serde_json::Value;

/// Raw chart export
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPayload {
    pub cols: Vec<ColumnPayload>,
    #[serde(default)]
    pub rows: Vec<RowPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnPayload {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RowPayload {
    pub c: Vec<Option<CellPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellPayload {
    #[serde(default)]
    pub v: Value,
}

/// Raw team listing
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardPayload {
    pub data: Vec<TeamRow>,
}

/// One team as listed upstream; the score arrives as a string more often than not
#[derive(Debug, Clone, Deserialize)]
pub struct TeamRow {
    pub team_number: String,
    pub ccs_score: Value,
    pub location: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Rank fields some listings already carry; ranks are always recomputed
const UPSTREAM_RANK_FIELDS: [&str; 3] = ["national_rank", "state_rank", "regional_rank"];

fn history_error(reason: impl Into<String>) -> ScoreboardError {
    ScoreboardError::malformed(UpstreamResource::History, reason)
}

fn leaderboard_error(reason: impl Into<String>) -> ScoreboardError {
    ScoreboardError::malformed(UpstreamResource::Leaderboard, reason)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn decode_cell(cell: Option<&CellPayload>, row: usize, col: usize) -> Result<Cell> {
    let value = match cell {
        Some(cell) => &cell.v,
        None => return Ok(Cell::Missing),
    };

    match value {
        Value::Null => Ok(Cell::Missing),
        Value::Number(n) => n
            .as_f64()
            .map(Cell::Value)
            .ok_or_else(|| history_error(format!("row {row} column {col}: unrepresentable number"))),
        Value::String(s) if s == UNCHANGED_SENTINEL => Ok(Cell::Unchanged),
        other => Err(history_error(format!("row {row} column {col}: unexpected cell value {other}"))),
    }
}

fn decode_timestamp(cell: Option<&CellPayload>, row: usize) -> Result<String> {
    match cell.map(|c| &c.v) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(history_error(format!("row {row}: missing timestamp"))),
    }
}

impl HistoryPayload {
    /// Convert the raw export into a wide history table
    pub fn into_table(self) -> Result<WideHistoryTable> {
        let mut cols = self.cols.into_iter();
        let timestamp_label = cols
            .next()
            .map(|c| c.label)
            .ok_or_else(|| history_error("no columns; timestamp column missing"))?;
        let columns: Vec<Column> = cols.map(|c| Column::new(c.label)).collect();
        let width = columns.len() + 1;

        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                if row.c.len() < width {
                    return Err(history_error(format!(
                        "row {index}: expected {width} cells, found {}",
                        row.c.len()
                    )));
                }
                let timestamp = decode_timestamp(row.c[0].as_ref(), index)?;
                let cells = (1..width)
                    .map(|col| decode_cell(row.c[col].as_ref(), index, col))
                    .collect::<Result<Vec<_>>>()?;
                Ok(HistoryRow { timestamp, cells })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WideHistoryTable { timestamp_label, columns, rows })
    }
}

impl TeamRow {
    fn score(&self) -> Result<f64> {
        match &self.ccs_score {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_number(s),
            _ => None,
        }
        .ok_or_else(|| {
            leaderboard_error(format!(
                "team {}: non-numeric score {}",
                self.team_number, self.ccs_score
            ))
        })
    }

    /// Convert into a leaderboard entry, keeping unknown fields verbatim
    pub fn into_entry(mut self) -> Result<LeaderboardEntry> {
        let score = self.score()?;
        for field in UPSTREAM_RANK_FIELDS {
            self.extra.remove(field);
        }
        Ok(LeaderboardEntry {
            team_number: self.team_number,
            score,
            region: self.location,
            extra: self.extra,
        })
    }
}

impl LeaderboardPayload {
    /// Convert every row, preserving upstream order
    pub fn into_entries(self) -> Result<Vec<LeaderboardEntry>> {
        self.data.into_iter().map(TeamRow::into_entry).collect()
    }
}

/// Decode a raw history response body
pub fn decode_history(raw: Value) -> Result<WideHistoryTable> {
    let payload: HistoryPayload =
        serde_json::from_value(raw).map_err(|e| history_error(e.to_string()))?;
    payload.into_table()
}

/// Decode a raw leaderboard response body
pub fn decode_leaderboard(raw: Value) -> Result<Vec<LeaderboardEntry>> {
    let payload: LeaderboardPayload =
        serde_json::from_value(raw).map_err(|e| leaderboard_error(e.to_string()))?;
    payload.into_entries()
}
