//! Series reconstruction from the wide-format score history export
//!
//! The export has one column per scored entity and one row per reading time.
//! Columns are labelled either with a bare competitor id or with
//! `<competitor-id>_<suffix>` when a competitor owns several columns (one per
//! scored image). Cells hold a number or the `"null"` sentinel, which means the
//! column's previous reading still applies.
//!
//! Reconstruction folds those columns into one cumulative series per competitor:
//! sentinels are replaced by the column's last real reading, and every column a
//! competitor owns contributes to that competitor's point at the row's timestamp.

use crate::types::{Cell, CompetitorId, SeriesMap, TimePoint, WideHistoryTable};
use std::collections::HashMap;
use tracing::debug;

/// Whether column labels can be used to tell competitors apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// Labels carry the owning competitor id as a prefix
    Disambiguated,
    /// Labels cannot be attributed to competitors
    Ambiguous,
}

/// Inspect the first data column to decide whether labels embed competitor ids
pub fn detect_label_format(table: &WideHistoryTable) -> LabelFormat {
    match table.first_data_column() {
        Some(column) if column.is_composite() => LabelFormat::Disambiguated,
        _ => LabelFormat::Ambiguous,
    }
}

/// How each column is attributed to a competitor
enum ColumnOwnership<'a> {
    /// A single competitor was requested and owns every column
    Single(&'a CompetitorId),
    /// The label prefix names the owner
    ByLabelPrefix,
}

/// Last real reading per raw column label, scoped to one reconstruction pass
#[derive(Debug, Default)]
pub struct CarryForwardState {
    last_seen: HashMap<String, Option<f64>>,
}

impl CarryForwardState {
    /// Register every column with no reading yet
    pub fn seeded<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self { last_seen: labels.into_iter().map(|label| (label.to_string(), None)).collect() }
    }

    /// Record a real reading for a column, or clear it with `None`
    pub fn record(&mut self, label: &str, value: Option<f64>) {
        match self.last_seen.get_mut(label) {
            Some(slot) => *slot = value,
            None => {
                self.last_seen.insert(label.to_string(), value);
            }
        }
    }

    /// Last real reading for a column, or `None` if it has never had one
    pub fn last(&self, label: &str) -> Option<f64> {
        self.last_seen.get(label).copied().flatten()
    }

    /// Resolve a cell to a reading. Real values are remembered; a missing
    /// cell forgets the column's last reading, so a following sentinel emits nothing.
    pub fn resolve(&mut self, label: &str, cell: Cell) -> Option<f64> {
        match cell {
            Cell::Value(value) => {
                self.record(label, Some(value));
                Some(value)
            }
            Cell::Unchanged => self.last(label),
            Cell::Missing => {
                self.record(label, None);
                None
            }
        }
    }
}

/// Points for one competitor plus a timestamp index for same-time accumulation
#[derive(Default)]
struct SeriesBuilder {
    points: Vec<TimePoint>,
    by_timestamp: HashMap<String, usize>,
}

impl SeriesBuilder {
    fn accumulate(&mut self, timestamp: &str, value: f64) {
        match self.by_timestamp.get(timestamp) {
            Some(&index) => self.points[index].value += value,
            None => {
                self.by_timestamp.insert(timestamp.to_string(), self.points.len());
                self.points.push(TimePoint::new(timestamp, value));
            }
        }
    }
}

/// Every requested id mapped to an empty series
fn empty_series(requested: &[CompetitorId]) -> SeriesMap {
    requested.iter().map(|id| (id.clone(), Vec::new())).collect()
}

/// Reconstruct one cumulative series per competitor from the wide history table.
///
/// `requested` must be free of duplicates. Every requested id is present in the
/// result, possibly with an empty series. When several competitors are requested
/// but the labels do not identify owners, every series is empty rather than
/// risking attributing one competitor's readings to another.
pub fn reconstruct(table: &WideHistoryTable, requested: &[CompetitorId]) -> SeriesMap {
    let ownership = match requested {
        [] => return SeriesMap::new(),
        [only] => ColumnOwnership::Single(only),
        _ => match detect_label_format(table) {
            LabelFormat::Disambiguated => ColumnOwnership::ByLabelPrefix,
            LabelFormat::Ambiguous => {
                debug!(
                    "History labels carry no competitor prefix; returning empty series for {} competitors",
                    requested.len()
                );
                return empty_series(requested);
            }
        },
    };

    // Owner of each column by position; None means the column is ignored
    let owners: Vec<Option<CompetitorId>> = table
        .columns
        .iter()
        .map(|column| match &ownership {
            ColumnOwnership::Single(id) => Some((*id).clone()),
            ColumnOwnership::ByLabelPrefix => match CompetitorId::parse(column.owner_prefix()) {
                Ok(id) => Some(id),
                Err(_) => {
                    debug!("Ignoring history column {:?}: no competitor prefix", column.label);
                    None
                }
            },
        })
        .collect();

    let mut builders: HashMap<CompetitorId, SeriesBuilder> = requested
        .iter()
        .cloned()
        .chain(owners.iter().flatten().cloned())
        .map(|id| (id, SeriesBuilder::default()))
        .collect();

    let mut carry = CarryForwardState::seeded(table.columns.iter().map(|c| c.label.as_str()));

    for row in &table.rows {
        for ((column, owner), cell) in table.columns.iter().zip(&owners).zip(&row.cells) {
            let value = match carry.resolve(&column.label, *cell) {
                Some(value) => value,
                None => continue,
            };
            let Some(owner) = owner else { continue };
            if let Some(builder) = builders.get_mut(owner) {
                builder.accumulate(&row.timestamp, value);
            }
        }
    }

    builders.into_iter().map(|(id, builder)| (id, builder.points)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, HistoryRow};

    fn ids(raw: &[&str]) -> Vec<CompetitorId> {
        CompetitorId::parse_all(raw).unwrap()
    }

    fn table(labels: &[&str], rows: Vec<(&str, Vec<Cell>)>) -> WideHistoryTable {
        WideHistoryTable {
            timestamp_label: "Time".to_string(),
            columns: labels.iter().map(|l| Column::new(*l)).collect(),
            rows: rows
                .into_iter()
                .map(|(ts, cells)| HistoryRow { timestamp: ts.to_string(), cells })
                .collect(),
        }
    }

    fn values(series: &[TimePoint]) -> Vec<f64> {
        series.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_detect_label_format() {
        let composite = table(&["18-0001_a"], vec![]);
        let bare = table(&["18-0001"], vec![]);
        let no_data = table(&[], vec![]);
        assert_eq!(detect_label_format(&composite), LabelFormat::Disambiguated);
        assert_eq!(detect_label_format(&bare), LabelFormat::Ambiguous);
        assert_eq!(detect_label_format(&no_data), LabelFormat::Ambiguous);
    }

    #[test]
    fn test_every_requested_id_has_a_key() {
        let t = table(
            &["18-0001_a"],
            vec![("11/09 10:00", vec![Cell::Value(10.0)])],
        );
        let requested = ids(&["18-0001", "18-0002", "18-0003"]);
        let series = reconstruct(&t, &requested);

        for id in &requested {
            assert!(series.contains_key(id), "missing key {id}");
        }
        assert_eq!(values(&series[&requested[0]]), vec![10.0]);
        assert!(series[&requested[1]].is_empty());
        assert!(series[&requested[2]].is_empty());
    }

    #[test]
    fn test_single_competitor_owns_every_column() {
        let t = table(
            &["whatever", "99-9999_x"],
            vec![
                ("11/09 10:00", vec![Cell::Value(1.0), Cell::Value(2.0)]),
                ("11/09 10:05", vec![Cell::Value(4.0), Cell::Value(8.0)]),
            ],
        );
        let requested = ids(&["18-0001"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(series.len(), 1);
        let points = &series[&requested[0]];
        assert_eq!(values(points), vec![3.0, 12.0]);
        assert_eq!(points[0].timestamp, "11/09 10:00");
        assert_eq!(points[1].timestamp, "11/09 10:05");
    }

    #[test]
    fn test_sentinel_carries_previous_value_forward() {
        let t = table(
            &["18-0001"],
            vec![
                ("t1", vec![Cell::Value(5.0)]),
                ("t2", vec![Cell::Unchanged]),
                ("t3", vec![Cell::Unchanged]),
                ("t4", vec![Cell::Value(9.0)]),
            ],
        );
        let requested = ids(&["18-0001"]);
        let series = reconstruct(&t, &requested);

        let points = &series[&requested[0]];
        assert_eq!(values(points), vec![5.0, 5.0, 5.0, 9.0]);
        let times: Vec<&str> = points.iter().map(|p| p.timestamp.as_str()).collect();
        assert_eq!(times, vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_leading_sentinel_is_dropped() {
        let t = table(
            &["18-0001"],
            vec![("t1", vec![Cell::Unchanged]), ("t2", vec![Cell::Value(5.0)])],
        );
        let requested = ids(&["18-0001"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(series[&requested[0]], vec![TimePoint::new("t2", 5.0)]);
    }

    #[test]
    fn test_zero_reading_is_carried_forward() {
        let t = table(
            &["18-0001"],
            vec![("t1", vec![Cell::Value(0.0)]), ("t2", vec![Cell::Unchanged])],
        );
        let requested = ids(&["18-0001"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(
            series[&requested[0]],
            vec![TimePoint::new("t1", 0.0), TimePoint::new("t2", 0.0)]
        );
    }

    #[test]
    fn test_missing_cell_clears_carry_forward() {
        let t = table(
            &["18-0001"],
            vec![
                ("t1", vec![Cell::Value(5.0)]),
                ("t2", vec![Cell::Missing]),
                ("t3", vec![Cell::Unchanged]),
                ("t4", vec![Cell::Value(7.0)]),
                ("t5", vec![Cell::Unchanged]),
            ],
        );
        let requested = ids(&["18-0001"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(
            series[&requested[0]],
            vec![TimePoint::new("t1", 5.0), TimePoint::new("t4", 7.0), TimePoint::new("t5", 7.0)]
        );
    }

    #[test]
    fn test_missing_cell_only_clears_its_own_column() {
        let t = table(
            &["18-0001_a", "18-0001_b"],
            vec![
                ("t1", vec![Cell::Value(2.0), Cell::Value(3.0)]),
                ("t2", vec![Cell::Missing, Cell::Unchanged]),
                ("t3", vec![Cell::Unchanged, Cell::Unchanged]),
            ],
        );
        let requested = ids(&["18-0001", "18-0002"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(values(&series[&requested[0]]), vec![5.0, 3.0, 3.0]);
    }

    #[test]
    fn test_same_timestamp_columns_accumulate() {
        let t = table(
            &["18-0001_a", "18-0001_b", "18-0002_a"],
            vec![("t1", vec![Cell::Value(3.0), Cell::Value(4.0), Cell::Value(10.0)])],
        );
        let requested = ids(&["18-0001", "18-0002"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(series[&requested[0]], vec![TimePoint::new("t1", 7.0)]);
        assert_eq!(series[&requested[1]], vec![TimePoint::new("t1", 10.0)]);
    }

    #[test]
    fn test_carry_forward_is_per_column() {
        let t = table(
            &["18-0001_a", "18-0001_b"],
            vec![
                ("t1", vec![Cell::Value(3.0), Cell::Unchanged]),
                ("t2", vec![Cell::Unchanged, Cell::Value(6.0)]),
                ("t3", vec![Cell::Unchanged, Cell::Unchanged]),
            ],
        );
        let requested = ids(&["18-0001", "18-0002"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(values(&series[&requested[0]]), vec![3.0, 9.0, 9.0]);
    }

    #[test]
    fn test_ambiguous_labels_yield_empty_series() {
        let t = table(
            &["18-0001", "18-0002"],
            vec![("t1", vec![Cell::Value(3.0), Cell::Value(4.0)])],
        );
        let requested = ids(&["18-0001", "18-0002"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(series.len(), 2);
        assert!(series.values().all(|points| points.is_empty()));
    }

    #[test]
    fn test_unrequested_prefixes_get_their_own_series() {
        let t = table(
            &["18-0001_a", "18-0003_a"],
            vec![("t1", vec![Cell::Value(1.0), Cell::Value(2.0)])],
        );
        let requested = ids(&["18-0001", "18-0002"]);
        let series = reconstruct(&t, &requested);

        let extra = CompetitorId::parse("18-0003").unwrap();
        assert_eq!(series[&extra], vec![TimePoint::new("t1", 2.0)]);
        assert_eq!(series[&requested[0]], vec![TimePoint::new("t1", 1.0)]);
        assert!(series[&requested[1]].is_empty());
    }

    #[test]
    fn test_columns_without_valid_prefix_are_ignored() {
        let t = table(
            &["18-0001_a", "total_a"],
            vec![("t1", vec![Cell::Value(1.0), Cell::Value(50.0)])],
        );
        let requested = ids(&["18-0001", "18-0002"]);
        let series = reconstruct(&t, &requested);

        assert_eq!(series.len(), 2);
        assert_eq!(series[&requested[0]], vec![TimePoint::new("t1", 1.0)]);
    }

    #[test]
    fn test_empty_request_yields_empty_map() {
        let t = table(&["18-0001_a"], vec![("t1", vec![Cell::Value(1.0)])]);
        assert!(reconstruct(&t, &[]).is_empty());
    }

    #[test]
    fn test_carry_forward_state_tracks_presence() {
        let mut state = CarryForwardState::seeded(["a", "b"]);
        assert_eq!(state.resolve("a", Cell::Unchanged), None);
        assert_eq!(state.resolve("a", Cell::Value(0.0)), Some(0.0));
        assert_eq!(state.resolve("a", Cell::Unchanged), Some(0.0));
        assert_eq!(state.resolve("a", Cell::Missing), None);
        assert_eq!(state.last("a"), None);
        assert_eq!(state.resolve("a", Cell::Unchanged), None);
        assert_eq!(state.last("b"), None);
    }
}
