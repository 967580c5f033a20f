use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

use super::errors::StatsError;
use super::repository::SqlParam;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum League {
    Nfl,
    Nba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubjectKind {
    Player,
    Team,
}

/// A player or team a query is scoped to, identified by free-text name or abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityKey {
    pub league: League,
    pub kind: SubjectKind,
    pub identifier: String,
}

impl EntityKey {
    pub fn new(league: League, kind: SubjectKind, identifier: &str) -> Result<Self, StatsError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(StatsError::invalid(format!("{kind} name is required")));
        }
        Ok(Self {
            league,
            kind,
            identifier: identifier.to_string(),
        })
    }

    pub fn player(league: League, name: &str) -> Result<Self, StatsError> {
        Self::new(league, SubjectKind::Player, name)
    }

    pub fn team(league: League, name: &str) -> Result<Self, StatsError> {
        Self::new(league, SubjectKind::Team, name)
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} '{}'", self.league, self.kind, self.identifier)
    }
}

/// What to do when a name lookup matches more than one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    First,
    Unique,
}

/// Season identifiers diverge per league: NBA uses `2024-25`, NFL a bare year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Nba { start_year: u16 },
    Nfl { year: u16 },
}

impl Season {
    pub fn parse(league: League, raw: &str) -> Result<Self, StatsError> {
        let raw = raw.trim();
        let unparseable = || StatsError::invalid(format!("unparseable {league} season '{raw}'"));
        let year = |digits: &str, len: usize| -> Result<u16, StatsError> {
            if digits.len() != len || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(unparseable());
            }
            digits.parse().map_err(|_| unparseable())
        };

        match league {
            League::Nba => {
                let (start, end) = raw.split_once('-').ok_or_else(unparseable)?;
                let start_year = year(start, 4)?;
                let end_year = year(end, 2)?;
                if (start_year + 1) % 100 != end_year {
                    return Err(unparseable());
                }
                Ok(Season::Nba { start_year })
            }
            League::Nfl => Ok(Season::Nfl { year: year(raw, 4)? }),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Season::Nba { start_year } => format!("{}-{:02}", start_year, (start_year + 1) % 100),
            Season::Nfl { year } => year.to_string(),
        }
    }

    pub(crate) fn param(&self) -> SqlParam {
        match self {
            Season::Nba { .. } => SqlParam::Text(self.label()),
            Season::Nfl { year } => SqlParam::Int(i64::from(*year)),
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Unit a metric is stored in. Values are never rescaled between units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Unit {
    /// Fraction between 0 and 1
    Rate,
    /// Percentage between 0 and 100
    Percent,
    Count,
    Yards,
    PerGame,
    Rating,
    Epa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub value: f64,
    pub unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub league: League,
    pub subject: String,
    pub metrics: BTreeMap<String, MetricValue>,
    /// Metrics whose enrichment source had no row for this subject
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl MetricRecord {
    pub fn get(&self, metric: &str) -> Option<&MetricValue> {
        self.metrics.get(metric)
    }

    pub fn value(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).map(|m| m.value)
    }

    pub fn rank(&self, metric: &str) -> Option<u32> {
        self.metrics.get(metric).and_then(|m| m.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStat {
    pub zone: String,
    pub attempts: u32,
    pub makes: u32,
    /// `None` when the zone has no attempts
    pub pct: Option<f64>,
    pub rank: Option<u32>,
    pub population_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotZones {
    pub subject: String,
    pub season: String,
    pub zones: Vec<ZoneStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentZones {
    pub team: String,
    pub season: String,
    pub zones: BTreeMap<String, ZoneStat>,
}

// ── Rosters & listings ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NbaRosterPlayer {
    pub player_id: String,
    pub name: String,
    pub position: Option<String>,
    pub team: String,
    pub number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NbaTeam {
    pub team_id: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NflRosterPlayer {
    pub name: String,
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardGame {
    pub game_id: String,
    pub home_city: String,
    pub home_team: String,
    pub away_city: String,
    pub away_team: String,
}

// ── Shots & plays ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotPoint {
    pub x: f64,
    pub y: f64,
    pub made: bool,
    pub zone: String,
    pub opponent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotChart {
    pub player: String,
    pub season: String,
    pub shots: Vec<ShotPoint>,
    /// Per-zone totals for this player only, so unranked
    pub zones: Vec<ZoneStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassingPlay {
    pub week: i32,
    pub opponent: String,
    pub complete: bool,
    pub interception: bool,
    pub air_yards: Option<f64>,
    pub pass_location: Option<String>,
    pub pass_length: Option<String>,
}

// ── Game logs ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentSource {
    Joined,
    /// No enrichment row matched; numeric fields hold the documented default (0)
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapCounts {
    pub offense_snaps: i64,
    pub offense_snap_pct: f64,
    pub source: EnrichmentSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NbaPlayerGame {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub points: f64,
    pub assists: f64,
    pub rebounds: f64,
    pub threes_made: f64,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NbaTeamGame {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NflRushingReceivingGame {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub game_week: i32,
    pub rushing_attempts: i64,
    pub rushing_yards: i64,
    pub rushing_touchdowns: i64,
    pub long_rushing: i64,
    pub receptions: i64,
    pub receiving_targets: i64,
    pub receiving_yards: i64,
    pub yards_per_reception: f64,
    pub receiving_touchdowns: i64,
    pub long_reception: i64,
    pub fumbles: i64,
    pub fumbles_lost: i64,
    pub snaps: SnapCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NflPassingGame {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub game_week: i32,
    pub passing_attempts: i64,
    pub completions: i64,
    pub passing_yards: i64,
    pub passing_touchdowns: i64,
    pub interceptions: i64,
    pub qb_rating: f64,
    pub yards_per_pass_attempt: f64,
    pub rushing_attempts: i64,
    pub rushing_yards: i64,
    pub yards_per_rush_attempt: f64,
    pub rushing_touchdowns: i64,
    pub long_rushing: i64,
    pub snaps: SnapCounts,
}

// ── Odds ─────────────────────────────────────────────────────────────────────

/// One observation of a betting line at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    #[serde(skip_serializing, default)]
    pub row_id: i64,
    pub subject: String,
    pub book: String,
    pub market: String,
    pub observed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropPrices {
    pub line: f64,
    pub over_price: Option<i32>,
    pub under_price: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneylinePrice {
    pub price: i32,
}

pub type PropLine = Snapshot<PropPrices>;
pub type MoneylineQuote = Snapshot<MoneylinePrice>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMatchup {
    pub offense: MetricRecord,
    pub defense: MetricRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-25", 2024)]
    #[case(" 1999-00 ", 1999)]
    fn parses_nba_seasons(#[case] raw: &str, #[case] start: u16) {
        let season = Season::parse(League::Nba, raw).unwrap();
        assert_eq!(season, Season::Nba { start_year: start });
        assert_eq!(season.label(), raw.trim());
    }

    #[rstest]
    #[case("2024")]
    #[case("2024-26")]
    #[case("24-25")]
    #[case("abcd-ef")]
    #[case("+123-24")]
    #[case("+023-24")]
    #[case("")]
    fn rejects_bad_nba_seasons(#[case] raw: &str) {
        let err = Season::parse(League::Nba, raw).unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument(_)));
    }

    #[test]
    fn nfl_season_binds_as_integer() {
        let season = Season::parse(League::Nfl, "2023").unwrap();
        assert_eq!(season.param(), SqlParam::Int(2023));
        assert!(Season::parse(League::Nfl, "2023-24").is_err());
        assert!(Season::parse(League::Nfl, "+202").is_err());
    }

    #[test]
    fn entity_key_rejects_blank_identifier() {
        let err = EntityKey::player(League::Nba, "   ").unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument(msg) if msg.contains("player")));

        let key = EntityKey::team(League::Nfl, " Chiefs ").unwrap();
        assert_eq!(key.identifier, "Chiefs");
    }

    #[test]
    fn league_parses_case_insensitively() {
        assert_eq!("nba".parse::<League>().unwrap(), League::Nba);
        assert_eq!(League::Nfl.to_string(), "NFL");
    }
}
