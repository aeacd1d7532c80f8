//! Teams
//!
//! Every player plays for one of three fixed teams, picked once at login.
//! Scores are broken down per team, so team-indexed values are kept in an
//! [`EnumMap`].

use std::{fmt::Display, str::FromStr};

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the competing teams
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, Serialize, Deserialize,
)]
pub enum Team {
    /// Red team
    #[serde(alias = "RED", alias = "loyola")]
    Loyola,
    /// Yellow team
    #[serde(alias = "YELLOW", alias = "javier")]
    Javier,
    /// Blue team
    #[serde(alias = "BLUE", alias = "avila")]
    Avila,
}

/// The team name did not match any known team
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown team {0:?}")]
pub struct UnknownTeam(String);

impl Team {
    /// All teams in their display order
    pub const ALL: [Team; 3] = [Team::Loyola, Team::Javier, Team::Avila];

    /// Returns the stable identifier used by the mobile app
    pub fn id(self) -> &'static str {
        match self {
            Team::Loyola => "RED",
            Team::Javier => "YELLOW",
            Team::Avila => "BLUE",
        }
    }

    /// Returns the display name, which is also what the backend stores
    pub fn name(self) -> &'static str {
        match self {
            Team::Loyola => "Loyola",
            Team::Javier => "Javier",
            Team::Avila => "Avila",
        }
    }

    /// Returns the team color as a CSS hex string
    pub fn color(self) -> &'static str {
        match self {
            Team::Loyola => "#E53935",
            Team::Javier => "#FFB300",
            Team::Avila => "#1E88E5",
        }
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Team {
    type Err = UnknownTeam;

    /// Accepts either the display name or the id, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Team::ALL
            .into_iter()
            .find(|team| team.name().eq_ignore_ascii_case(s) || team.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTeam(s.to_owned()))
    }
}

/// Points held by each team
pub type TeamPoints = EnumMap<Team, u64>;

/// Orders teams by points, highest first
///
/// Teams with equal points keep their display order.
pub fn standings(points: &TeamPoints) -> Vec<(Team, u64)> {
    points
        .iter()
        .map(|(team, points)| (team, *points))
        .sorted_by(|(_, a), (_, b)| b.cmp(a))
        .collect_vec()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use enum_map::enum_map;

    #[test]
    fn test_team_metadata() {
        assert_eq!(Team::Loyola.id(), "RED");
        assert_eq!(Team::Javier.color(), "#FFB300");
        assert_eq!(Team::Avila.to_string(), "Avila");
    }

    #[test]
    fn test_team_from_str() {
        assert_eq!("loyola".parse::<Team>().unwrap(), Team::Loyola);
        assert_eq!("BLUE".parse::<Team>().unwrap(), Team::Avila);
        assert_eq!(" Javier ".parse::<Team>().unwrap(), Team::Javier);
        assert!("Xavier".parse::<Team>().is_err());
    }

    #[test]
    fn test_team_deserialize_aliases() {
        let team: Team = serde_json::from_str("\"YELLOW\"").unwrap();
        assert_eq!(team, Team::Javier);
        let team: Team = serde_json::from_str("\"Avila\"").unwrap();
        assert_eq!(team, Team::Avila);
    }

    #[test]
    fn test_standings_sorted_descending() {
        let points = enum_map! {
            Team::Loyola => 10,
            Team::Javier => 30,
            Team::Avila => 20,
        };
        assert_eq!(
            standings(&points),
            vec![(Team::Javier, 30), (Team::Avila, 20), (Team::Loyola, 10)]
        );
    }

    #[test]
    fn test_standings_ties_keep_display_order() {
        let points = enum_map! {
            Team::Loyola => 5,
            Team::Javier => 5,
            Team::Avila => 7,
        };
        assert_eq!(
            standings(&points),
            vec![(Team::Avila, 7), (Team::Loyola, 5), (Team::Javier, 5)]
        );
    }
}
