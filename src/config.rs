use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::stats::models::{League, Season};
use crate::stats::snapshot::{BookAllowList, SnapshotTieBreak};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Permitted physical locations of the opponent-zone table. Each is a `schema.table` name the
/// Postgres store can resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentZonesTable {
    #[default]
    #[serde(rename = "nba_data.team_opponent_zones")]
    NbaData,
    #[serde(rename = "main.team_opponent_zones")]
    Main,
}

impl OpponentZonesTable {
    pub const ALL: [OpponentZonesTable; 2] = [OpponentZonesTable::NbaData, OpponentZonesTable::Main];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OpponentZonesTable::NbaData => "nba_data.team_opponent_zones",
            OpponentZonesTable::Main => "main.team_opponent_zones",
        }
    }
}

impl FromStr for OpponentZonesTable {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpponentZonesTable::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "OPP_ZONES_TABLE",
                reason: format!("'{s}' is not a known opponent zone table"),
            })
    }
}

/// Settings the stats layer needs at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    pub opponent_zones_table: OpponentZonesTable,
    pub sportsbooks: BookAllowList,
    pub snapshot_tie_break: SnapshotTieBreak,
    /// Season used when an NBA caller does not name one
    pub default_nba_season: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            opponent_zones_table: OpponentZonesTable::default(),
            sportsbooks: BookAllowList::new(["FanDuel", "DraftKings", "BetMGM"]),
            snapshot_tie_break: SnapshotTieBreak::default(),
            default_nba_season: "2024-25".to_string(),
        }
    }
}

impl StatsConfig {
    /// Builds the config from string settings, e.g. `StatsConfig::from_lookup(|k| std::env::var(k).ok())`.
    /// Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(table) = lookup("OPP_ZONES_TABLE").filter(|v| !v.trim().is_empty()) {
            config.opponent_zones_table = table.parse()?;
        }

        if let Some(books) = lookup("SPORTSBOOKS") {
            config.sportsbooks = BookAllowList::new(
                books
                    .split(',')
                    .map(str::trim)
                    .filter(|b| !b.is_empty()),
            );
        }

        if let Some(tie_break) = lookup("SNAPSHOT_TIE_BREAK").filter(|v| !v.trim().is_empty()) {
            config.snapshot_tie_break =
                tie_break
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "SNAPSHOT_TIE_BREAK",
                        reason: format!("'{tie_break}' is not lowest_row_id or highest_row_id"),
                    })?;
        }

        if let Some(season) = lookup("DEFAULT_NBA_SEASON").filter(|v| !v.trim().is_empty()) {
            config.default_nba_season = season.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Season::parse(League::Nba, &self.default_nba_season).map_err(|e| ConfigError::InvalidValue {
            key: "DEFAULT_NBA_SEASON",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = StatsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StatsConfig::default());
        assert_eq!(config.opponent_zones_table.as_str(), "nba_data.team_opponent_zones");
        assert_eq!(config.sportsbooks.books().len(), 3);
    }

    #[test]
    fn reads_overrides() {
        let config = StatsConfig::from_lookup(lookup(&[
            ("OPP_ZONES_TABLE", "main.team_opponent_zones"),
            ("SPORTSBOOKS", "FanDuel, Caesars ,"),
            ("SNAPSHOT_TIE_BREAK", "highest_row_id"),
            ("DEFAULT_NBA_SEASON", "2023-24"),
        ]))
        .unwrap();

        assert_eq!(config.opponent_zones_table, OpponentZonesTable::Main);
        assert_eq!(config.sportsbooks.books(), ["FanDuel".to_string(), "Caesars".to_string()]);
        assert_eq!(config.snapshot_tie_break, SnapshotTieBreak::HighestRowId);
        assert_eq!(config.default_nba_season, "2023-24");
    }

    #[test]
    fn arbitrary_table_names_are_rejected() {
        let err = StatsConfig::from_lookup(lookup(&[("OPP_ZONES_TABLE", "nba_data.x; DROP TABLE y")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "OPP_ZONES_TABLE", .. }));
    }

    #[test]
    fn cross_database_table_names_are_rejected() {
        let err = StatsConfig::from_lookup(lookup(&[("OPP_ZONES_TABLE", "nba_data.main.team_opponent_zones")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "OPP_ZONES_TABLE", .. }));
        for table in OpponentZonesTable::ALL {
            assert_eq!(table.as_str().split('.').count(), 2, "{}", table.as_str());
        }
    }

    #[test]
    fn bad_season_is_rejected() {
        let err = StatsConfig::from_lookup(lookup(&[("DEFAULT_NBA_SEASON", "2023")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DEFAULT_NBA_SEASON", .. }));
    }
}
