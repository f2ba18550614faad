//! National and regional rank calculation
//!
//! The leaderboard arrives sorted by score, highest first. National rank is the
//! position in that list; regional rank is the position among entries of the
//! same region, in the same relative order. Both fall out of a single pass over
//! the list without sorting anything, so an upstream ordering problem shows up
//! as rank drift instead of being silently corrected.

use crate::types::{CompetitorId, LeaderboardEntry, RankMap, RankedEntry};
use std::collections::{HashMap, HashSet};

/// Stable partition of a leaderboard by region code
#[derive(Debug, Default)]
pub struct RegionalPartition<'a> {
    groups: HashMap<&'a str, Vec<usize>>,
}

impl<'a> RegionalPartition<'a> {
    /// Indices into the leaderboard for one region, in leaderboard order
    pub fn region(&self, region: &str) -> &[usize] {
        self.groups.get(region).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn regions(&self) -> impl Iterator<Item = &&'a str> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group leaderboard entries by region without changing their relative order
pub fn partition_by_region(leaderboard: &[LeaderboardEntry]) -> RegionalPartition<'_> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, entry) in leaderboard.iter().enumerate() {
        groups.entry(entry.region.as_str()).or_default().push(index);
    }
    RegionalPartition { groups }
}

/// Compute national and regional rank for the requested competitors.
///
/// `leaderboard` must already be sorted by score descending. Requested ids that
/// do not appear in the leaderboard are omitted. If an id is listed more than
/// once, its first position is used.
pub fn rank(leaderboard: &[LeaderboardEntry], requested: &[CompetitorId]) -> RankMap {
    let wanted: HashSet<&str> = requested.iter().map(CompetitorId::as_str).collect();
    let mut regional_counts: HashMap<&str, u32> = HashMap::new();
    let mut ranks = RankMap::new();

    for (index, entry) in leaderboard.iter().enumerate() {
        let regional_rank = {
            let count = regional_counts.entry(entry.region.as_str()).or_insert(0);
            *count += 1;
            *count
        };

        if !wanted.contains(entry.team_number.as_str()) {
            continue;
        }
        let Ok(id) = CompetitorId::parse(&entry.team_number) else { continue };
        ranks.entry(id).or_insert_with(|| RankedEntry {
            entry: entry.clone(),
            national_rank: index as u32 + 1,
            regional_rank,
        });
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(team: &str, score: f64, region: &str) -> LeaderboardEntry {
        LeaderboardEntry {
            team_number: team.to_string(),
            score,
            region: region.to_string(),
            extra: serde_json::Map::new(),
        }
    }

    fn sample_board() -> Vec<LeaderboardEntry> {
        vec![
            entry("18-0001", 300.0, "CA"),
            entry("18-0002", 290.0, "TX"),
            entry("18-0003", 280.0, "CA"),
            entry("18-0004", 270.0, "NY"),
            entry("18-0005", 260.0, "TX"),
            entry("18-0006", 250.0, "CA"),
        ]
    }

    fn ids(raw: &[&str]) -> Vec<CompetitorId> {
        CompetitorId::parse_all(raw).unwrap()
    }

    #[test]
    fn test_national_and_regional_ranks() {
        let board = sample_board();
        let requested = ids(&["18-0003", "18-0005", "18-0006"]);
        let ranks = rank(&board, &requested);

        let third = &ranks[&requested[0]];
        assert_eq!((third.national_rank, third.regional_rank), (3, 2));
        let fifth = &ranks[&requested[1]];
        assert_eq!((fifth.national_rank, fifth.regional_rank), (5, 2));
        let sixth = &ranks[&requested[2]];
        assert_eq!((sixth.national_rank, sixth.regional_rank), (6, 3));
        assert_eq!(sixth.entry.score, 250.0);
    }

    #[test]
    fn test_unknown_ids_are_omitted() {
        let board = sample_board();
        let requested = ids(&["18-0001", "19-9999"]);
        let ranks = rank(&board, &requested);

        assert_eq!(ranks.len(), 1);
        assert!(ranks.contains_key(&requested[0]));
        assert!(!ranks.contains_key(&requested[1]));
    }

    #[test]
    fn test_ranks_are_monotonic() {
        let board = sample_board();
        let requested = ids(&["18-0001", "18-0002", "18-0003", "18-0004", "18-0005", "18-0006"]);
        let ranks = rank(&board, &requested);

        let ordered: Vec<&RankedEntry> = requested.iter().map(|id| &ranks[id]).collect();
        for pair in ordered.windows(2) {
            assert!(pair[0].national_rank < pair[1].national_rank);
        }
        for region in ["CA", "TX", "NY"] {
            let regional: Vec<u32> = ordered
                .iter()
                .filter(|r| r.entry.region == region)
                .map(|r| r.regional_rank)
                .collect();
            assert!(regional.windows(2).all(|w| w[0] < w[1]), "region {region}: {regional:?}");
            assert_eq!(regional.first(), Some(&1));
        }
    }

    #[test]
    fn test_input_order_is_trusted_not_resorted() {
        // Out-of-order upstream data is reflected as-is
        let board = vec![entry("18-0001", 10.0, "CA"), entry("18-0002", 99.0, "CA")];
        let requested = ids(&["18-0002"]);
        let ranks = rank(&board, &requested);

        assert_eq!(ranks[&requested[0]].national_rank, 2);
        assert_eq!(ranks[&requested[0]].regional_rank, 2);
    }

    #[test]
    fn test_duplicate_listing_uses_first_position() {
        let board = vec![
            entry("18-0001", 50.0, "CA"),
            entry("18-0002", 40.0, "CA"),
            entry("18-0001", 30.0, "CA"),
        ];
        let requested = ids(&["18-0001"]);
        let ranks = rank(&board, &requested);

        assert_eq!(ranks[&requested[0]].national_rank, 1);
        assert_eq!(ranks[&requested[0]].entry.score, 50.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(rank(&[], &ids(&["18-0001"])).is_empty());
        assert!(rank(&sample_board(), &[]).is_empty());
    }

    #[test]
    fn test_partition_by_region_is_stable() {
        let board = sample_board();
        let partition = partition_by_region(&board);

        assert_eq!(partition.len(), 3);
        assert_eq!(partition.region("CA"), &[0, 2, 5]);
        assert_eq!(partition.region("TX"), &[1, 4]);
        assert_eq!(partition.region("NY"), &[3]);
        assert!(partition.region("WA").is_empty());
    }

    #[test]
    fn test_partition_agrees_with_regional_rank() {
        let board = sample_board();
        let partition = partition_by_region(&board);
        let requested: Vec<CompetitorId> =
            board.iter().map(|e| CompetitorId::parse(&e.team_number).unwrap()).collect();
        let ranks = rank(&board, &requested);

        for region in partition.regions() {
            for (position, &index) in partition.region(region).iter().enumerate() {
                let id = &requested[index];
                assert_eq!(ranks[id].regional_rank as usize, position + 1);
            }
        }
    }
}
