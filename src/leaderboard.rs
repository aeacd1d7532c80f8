//! Rankings
//!
//! The backend keeps the authoritative ranked lists; this module merges the
//! feeds it returns and projects them for display. Projections are pure
//! functions of the ranked list and the current player, so the home
//! dashboard and the full view can be computed and tested without any
//! rendering involved.

use std::collections::{HashMap, hash_map::Entry};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::ranking::DASHBOARD_LIMIT,
    identity::{self, Phone},
    question::CellText,
    teams::{self, Team, TeamPoints},
};

/// Reads a points cell, accepting integers, decimals, and numeric text
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_points(cell: &CellText) -> Option<u64> {
    let value: f64 = cell.as_str().trim().parse().ok()?;
    (value.is_finite() && value >= 0.).then(|| value.round() as u64)
}

/// Builds per-team points from a sheet row, skipping unknown teams and
/// unreadable cells
fn team_points(raw: &HashMap<String, CellText>) -> TeamPoints {
    let mut points = TeamPoints::default();
    for (key, cell) in raw {
        let Ok(team) = key.parse::<Team>() else {
            log::debug!("skipping points for unknown team {key:?}");
            continue;
        };
        match parse_points(cell) {
            Some(value) => points[team] += value,
            None => log::debug!("skipping unreadable points {:?} for {team}", cell.as_str()),
        }
    }
    points
}

/// Serialization helper for [`RankingEntry`]
#[derive(Deserialize)]
struct RankingEntrySerde {
    #[serde(alias = "telefono")]
    phone: CellText,
    #[serde(default)]
    points: HashMap<String, CellText>,
    #[serde(default)]
    total: Option<CellText>,
}

/// One player's line in a ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RankingEntrySerde")]
pub struct RankingEntry {
    /// Phone as stored by the backend, possibly with a country prefix
    pub phone: String,
    /// Points earned for each team
    pub points: TeamPoints,
    /// Total points
    pub total: u64,
}

impl From<RankingEntrySerde> for RankingEntry {
    /// Builds the entry, using the sum of team points when no total was sent
    fn from(serde: RankingEntrySerde) -> Self {
        let points = team_points(&serde.points);
        let total = serde
            .total
            .as_ref()
            .and_then(parse_points)
            .unwrap_or_else(|| points.values().sum());
        Self {
            phone: String::from(serde.phone).trim().to_owned(),
            points,
            total,
        }
    }
}

/// Serialization helper for [`RankingFeed`]
#[derive(Deserialize)]
struct RankingFeedSerde {
    #[serde(default)]
    players: Vec<RankingEntry>,
    #[serde(default)]
    teams: HashMap<String, CellText>,
}

/// Rankings as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RankingFeedSerde")]
pub struct RankingFeed {
    /// Players ordered by total, highest first
    pub players: Vec<RankingEntry>,
    /// Aggregate score of each team
    pub teams: TeamPoints,
}

impl From<RankingFeedSerde> for RankingFeed {
    fn from(serde: RankingFeedSerde) -> Self {
        Self {
            players: serde.players,
            teams: team_points(&serde.teams),
        }
    }
}

/// A ranking line ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// 1-based rank in the full list
    pub rank: usize,
    /// Masked phone, safe to show to other players
    pub display_phone: String,
    /// Points earned for each team
    pub points: TeamPoints,
    /// Total points
    pub total: u64,
    /// Whether this is the logged-in player
    pub is_current: bool,
}

impl RankedEntry {
    fn new(rank: usize, entry: &RankingEntry, current: Option<&Phone>) -> Self {
        Self {
            rank,
            display_phone: identity::mask(&entry.phone),
            points: entry.points,
            total: entry.total,
            is_current: current.is_some_and(|phone| phone.matches(&entry.phone)),
        }
    }
}

/// Returns the position of `phone` in `list` as a 1-based rank
pub fn rank_of(list: &[RankingEntry], phone: &Phone) -> Option<usize> {
    list.iter()
        .position(|entry| phone.matches(&entry.phone))
        .map(|position| position + 1)
}

/// Projects the home dashboard: the top entries plus the current player
///
/// When the current player ranks below the top slice their entry is
/// appended with its true rank.
pub fn dashboard(list: &[RankingEntry], current: Option<&Phone>) -> Vec<RankedEntry> {
    let top = list
        .iter()
        .take(DASHBOARD_LIMIT)
        .enumerate()
        .map(|(i, entry)| RankedEntry::new(i + 1, entry, current));

    let outside = current
        .and_then(|phone| rank_of(list, phone))
        .filter(|rank| *rank > DASHBOARD_LIMIT)
        .map(|rank| RankedEntry::new(rank, &list[rank - 1], current));

    top.chain(outside).collect_vec()
}

/// Projects the full ranking, each rank equal to its position
pub fn full(list: &[RankingEntry], current: Option<&Phone>) -> Vec<RankedEntry> {
    list.iter()
        .enumerate()
        .map(|(i, entry)| RankedEntry::new(i + 1, entry, current))
        .collect_vec()
}

/// Merges ranking sheets into a single list keyed by player
///
/// Entries naming the same player, after prefix normalization, have their
/// team points and totals summed. The result is ordered by total, highest
/// first, with ties kept in order of first appearance.
pub fn merge<I>(sheets: I) -> Vec<RankingEntry>
where
    I: IntoIterator<Item = Vec<RankingEntry>>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<RankingEntry> = Vec::new();

    for entry in sheets.into_iter().flatten() {
        match positions.entry(identity::normalize(&entry.phone).to_owned()) {
            Entry::Occupied(slot) => {
                let existing = &mut merged[*slot.get()];
                for (team, points) in entry.points {
                    existing.points[team] += points;
                }
                existing.total += entry.total;
            }
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(entry);
            }
        }
    }

    merged
        .into_iter()
        .sorted_by(|a, b| b.total.cmp(&a.total))
        .collect_vec()
}

/// Sums team points over a list of players
pub fn team_totals(list: &[RankingEntry]) -> TeamPoints {
    list.iter().fold(TeamPoints::default(), |mut totals, entry| {
        for (team, points) in entry.points {
            totals[team] += points;
        }
        totals
    })
}

/// All the ranking views shown on the home screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standings {
    players: Vec<RankingEntry>,
    teams: TeamPoints,
}

impl Standings {
    /// Builds standings from the player feed and the in-person scores
    ///
    /// Team aggregates from the backend are used as given; if the backend
    /// sent none, they are summed from the player list.
    pub fn new(feed: RankingFeed, presence: Vec<RankingEntry>) -> Self {
        let teams = if feed.teams.values().all(|points| *points == 0) {
            team_totals(&feed.players)
        } else {
            feed.teams
        };
        let players = if presence.is_empty() {
            feed.players
        } else {
            merge([feed.players, presence])
        };
        Self { players, teams }
    }

    /// Returns the merged player list
    pub fn players(&self) -> &[RankingEntry] {
        &self.players
    }

    /// Returns the dashboard projection for `current`
    pub fn dashboard(&self, current: Option<&Phone>) -> Vec<RankedEntry> {
        dashboard(&self.players, current)
    }

    /// Returns the full projection for `current`
    pub fn full(&self, current: Option<&Phone>) -> Vec<RankedEntry> {
        full(&self.players, current)
    }

    /// Returns the teams ordered by aggregate score
    pub fn teams(&self) -> Vec<(Team, u64)> {
        teams::standings(&self.teams)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use enum_map::enum_map;

    fn entry(phone: &str, total: u64) -> RankingEntry {
        RankingEntry {
            phone: phone.to_owned(),
            points: enum_map! { Team::Loyola => total, _ => 0 },
            total,
        }
    }

    fn ranked_list(count: usize) -> Vec<RankingEntry> {
        (0..count)
            .map(|i| entry(&format!("6000000{i:02}"), 1000 - i as u64 * 10))
            .collect()
    }

    #[test]
    fn test_dashboard_appends_current_player_outside_top() {
        let list = ranked_list(15);
        let me: Phone = "600000011".parse().unwrap();

        let projection = dashboard(&list, Some(&me));

        assert_eq!(projection.len(), 11);
        for (i, ranked) in projection.iter().take(10).enumerate() {
            assert_eq!(ranked.rank, i + 1);
            assert_eq!(ranked.total, list[i].total);
            assert!(!ranked.is_current);
        }
        let last = &projection[10];
        assert_eq!(last.rank, 12);
        assert_eq!(last.total, list[11].total);
        assert!(last.is_current);
    }

    #[test]
    fn test_dashboard_current_player_inside_top() {
        let list = ranked_list(15);
        let me: Phone = "600000003".parse().unwrap();

        let projection = dashboard(&list, Some(&me));

        assert_eq!(projection.len(), 10);
        assert!(projection[3].is_current);
        assert_eq!(projection[3].rank, 4);
    }

    #[test]
    fn test_dashboard_without_current_player() {
        let list = ranked_list(15);
        assert_eq!(dashboard(&list, None).len(), 10);

        let stranger: Phone = "699999999".parse().unwrap();
        assert_eq!(dashboard(&list, Some(&stranger)).len(), 10);
    }

    #[test]
    fn test_dashboard_matches_prefixed_phone() {
        let mut list = ranked_list(12);
        list[11].phone = "34600000011".to_owned();
        let me: Phone = "600000011".parse().unwrap();

        let projection = dashboard(&list, Some(&me));
        assert_eq!(projection.len(), 11);
        assert_eq!(projection[10].rank, 12);
        assert_eq!(projection[10].display_phone, "******011");
    }

    #[test]
    fn test_full_projection_ranks_are_positions() {
        let list = ranked_list(15);
        let projection = full(&list, None);
        assert_eq!(projection.len(), 15);
        assert!(projection.iter().enumerate().all(|(i, r)| r.rank == i + 1));
    }

    #[test]
    fn test_merge_sums_same_player_across_sheets() {
        let online = vec![entry("600111222", 30), entry("600333444", 20)];
        let presence = vec![entry("34600333444", 25)];

        let merged = merge([online, presence]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].phone, "600333444");
        assert_eq!(merged[0].total, 45);
        assert_eq!(merged[0].points[Team::Loyola], 45);
        assert_eq!(merged[1].total, 30);
    }

    #[test]
    fn test_merge_ties_keep_first_appearance() {
        let merged = merge([vec![entry("600000001", 10), entry("600000002", 10)]]);
        assert_eq!(merged[0].phone, "600000001");
        assert_eq!(merged[1].phone, "600000002");
    }

    #[test]
    fn test_entry_total_defaults_to_points_sum() {
        let parsed: RankingEntry = serde_json::from_str(
            r#"{"telefono": "600111222", "points": {"Loyola": 10, "BLUE": 5}}"#,
        )
        .unwrap();
        assert_eq!(parsed.total, 15);
        assert_eq!(parsed.points[Team::Avila], 5);
        assert_eq!(parsed.points[Team::Javier], 0);
    }

    #[test]
    fn test_entry_accepts_numeric_phone() {
        let feed: RankingFeed = serde_json::from_str(
            r#"{"players": [{"telefono": 600111222, "points": {"Loyola": 10}}]}"#,
        )
        .unwrap();
        assert_eq!(feed.players[0].phone, "600111222");
        assert_eq!(feed.players[0].total, 10);

        let me: Phone = "600111222".parse().unwrap();
        assert_eq!(rank_of(&feed.players, &me), Some(1));
    }

    #[test]
    fn test_entry_accepts_numeric_text_and_decimals() {
        let parsed: RankingEntry = serde_json::from_str(
            r#"{"phone": 34600111222, "points": {"Javier": "20", "Avila": 5.0}, "total": "25"}"#,
        )
        .unwrap();
        assert_eq!(parsed.phone, "34600111222");
        assert_eq!(parsed.points[Team::Javier], 20);
        assert_eq!(parsed.points[Team::Avila], 5);
        assert_eq!(parsed.total, 25);
    }

    #[test]
    fn test_unknown_team_keys_are_skipped() {
        let feed: RankingFeed = serde_json::from_str(
            r#"{"players": [{"phone": "600111222", "points": {"Loyola": 10, "Visitantes": 7}}],
                "teams": {"Loyola": 10, "Visitantes": 7, "Javier": "n/a"}}"#,
        )
        .unwrap();
        assert_eq!(feed.players[0].total, 10);
        assert_eq!(feed.teams[Team::Loyola], 10);
        assert_eq!(feed.teams[Team::Javier], 0);
    }

    #[test]
    fn test_standings_team_order() {
        let feed = RankingFeed {
            players: vec![],
            teams: enum_map! { Team::Loyola => 5, Team::Javier => 9, Team::Avila => 5 },
        };
        let standings = Standings::new(feed, vec![]);
        assert_eq!(
            standings.teams(),
            vec![(Team::Javier, 9), (Team::Loyola, 5), (Team::Avila, 5)]
        );
    }

    #[test]
    fn test_standings_derives_team_totals_when_missing() {
        let feed = RankingFeed {
            players: vec![entry("600111222", 30), entry("600333444", 20)],
            teams: TeamPoints::default(),
        };
        let standings = Standings::new(feed, vec![]);
        assert_eq!(standings.teams()[0], (Team::Loyola, 50));
    }
}
