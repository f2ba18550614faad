//! Merge per-competitor series into chart rows keyed by reading time

use crate::types::{CompetitorId, SeriesMap};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All competitors' values at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub date: NaiveDateTime,
    pub values: BTreeMap<CompetitorId, f64>,
}

/// Parse an upstream `"MM/DD HH:MM"` timestamp; the export omits the year
pub fn parse_upstream_time(raw: &str, year: i32) -> Option<NaiveDateTime> {
    let (date_part, time_part) = raw.trim().split_once(' ')?;
    let (month, day) = date_part.split_once('/')?;
    let date = NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)?;
    let time = NaiveTime::parse_from_str(time_part, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
        .ok()?;
    Some(date.and_time(time))
}

/// Combine series into chronologically ordered rows, one per distinct instant
pub fn merge_timeline(series: &SeriesMap, year: i32) -> Vec<TimelineRow> {
    let mut rows: BTreeMap<NaiveDateTime, BTreeMap<CompetitorId, f64>> = BTreeMap::new();

    for (id, points) in series {
        for point in points {
            let Some(at) = parse_upstream_time(&point.timestamp, year) else {
                tracing::debug!("Skipping unparseable timestamp {:?} for {}", point.timestamp, id);
                continue;
            };
            rows.entry(at).or_default().insert(id.clone(), point.value);
        }
    }

    rows.into_iter().map(|(date, values)| TimelineRow { date, values }).collect()
}
