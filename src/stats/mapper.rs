//! Conversion of store rows into typed records.
//!
//! Required fields fail with [`StatsError::Mapping`] naming the field; optional fields map a null
//! to `None` rather than a sentinel.

use chrono::{DateTime, NaiveDate, Utc};

use super::catalog::Resolution;
use super::errors::StatsError;
use super::models::{
    EnrichmentSource, MetricRecord, MetricValue, MoneylinePrice, MoneylineQuote, NbaPlayerGame, NbaRosterPlayer,
    NbaTeam, NbaTeamGame, NflPassingGame, NflRosterPlayer, NflRushingReceivingGame, PassingPlay, PropLine,
    PropPrices, ScoreboardGame, ShotPoint, SnapCounts, Snapshot, ZoneStat,
};
use super::repository::{Row, SqlParam, Value};
use super::zones::zone_label;

pub trait FromValue: Sized {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError>;
}

fn mismatch(field: &str, expected: &str, value: &Value) -> StatsError {
    StatsError::mapping(field, format!("expected {expected}, found {}", value.type_name()))
}

impl FromValue for f64 {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch(field, "number", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(*v as i64),
            other => Err(mismatch(field, "integer", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        let wide = i64::from_value(field, value)?;
        i32::try_from(wide).map_err(|_| StatsError::mapping(field, format!("{wide} out of range")))
    }
}

impl FromValue for u32 {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        let wide = i64::from_value(field, value)?;
        u32::try_from(wide).map_err(|_| StatsError::mapping(field, format!("{wide} out of range")))
    }
}

impl FromValue for bool {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Float(v) if *v == 0.0 => Ok(false),
            Value::Float(v) if *v == 1.0 => Ok(true),
            other => Err(mismatch(field, "flag", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            // Identifiers are numeric in some tables and text in others
            Value::Int(v) => Ok(v.to_string()),
            other => Err(mismatch(field, "text", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        match value {
            Value::Date(v) => Ok(*v),
            Value::Timestamp(v) => Ok(v.date_naive()),
            Value::Text(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|e| StatsError::mapping(field, format!("bad date '{v}': {e}"))),
            other => Err(mismatch(field, "date", other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(field: &str, value: &Value) -> Result<Self, StatsError> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            Value::Text(v) => DateTime::parse_from_rfc3339(v)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| StatsError::mapping(field, format!("bad timestamp '{v}': {e}"))),
            other => Err(mismatch(field, "timestamp", other)),
        }
    }
}

impl Row {
    fn cell(&self, field: &str) -> Result<&Value, StatsError> {
        self.value(field)
            .ok_or_else(|| StatsError::mapping(field, "column missing from result set"))
    }

    /// Required field: null is a mapping error.
    pub fn get<T: FromValue>(&self, field: &str) -> Result<T, StatsError> {
        match self.cell(field)? {
            Value::Null => Err(StatsError::mapping(field, "unexpected null")),
            value => T::from_value(field, value),
        }
    }

    pub fn get_opt<T: FromValue>(&self, field: &str) -> Result<Option<T>, StatsError> {
        match self.cell(field)? {
            Value::Null => Ok(None),
            value => T::from_value(field, value).map(Some),
        }
    }

    /// A league rank: absent when null, otherwise an integer of at least 1.
    pub fn rank(&self, field: &str) -> Result<Option<u32>, StatsError> {
        let Some(raw) = self.get_opt::<f64>(field)? else {
            return Ok(None);
        };
        if raw.fract() != 0.0 || raw < 1.0 || raw > f64::from(u32::MAX) {
            return Err(StatsError::mapping(field, format!("rank {raw} is not a positive integer")));
        }
        Ok(Some(raw as u32))
    }

    /// Re-binds an identifier read from one query as a parameter of the next.
    pub fn id_param(&self, field: &str) -> Result<SqlParam, StatsError> {
        match self.cell(field)? {
            Value::Int(v) => Ok(SqlParam::Int(*v)),
            Value::Text(v) => Ok(SqlParam::Text(v.clone())),
            Value::Float(v) if v.fract() == 0.0 => Ok(SqlParam::Int(*v as i64)),
            other => Err(mismatch(field, "identifier", other)),
        }
    }
}

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, StatsError>;
}

pub fn map_rows<T: FromRow>(rows: &[Row]) -> Result<Vec<T>, StatsError> {
    rows.iter().map(T::from_row).collect()
}

/// Builds a metric record from the resolved metric columns of a single row.
///
/// A null metric that comes from an enrichment table is listed in `missing`; a null metric from a
/// required table is a mapping error. Ranks are reported out of `population`.
pub fn metric_record(
    resolution: &Resolution,
    population: u32,
    subject: &str,
    row: &Row,
) -> Result<MetricRecord, StatsError> {
    let subject = match row.value("subject") {
        Some(_) => row.get::<String>("subject")?,
        None => subject.to_string(),
    };

    let mut record = MetricRecord {
        league: resolution.league,
        subject,
        metrics: Default::default(),
        missing: Vec::new(),
    };

    for column in resolution.columns.iter().filter(|c| c.is_metric()) {
        let Some(unit) = column.unit else { continue };
        let value = match row.get_opt::<f64>(column.name)? {
            Some(value) => value,
            None if column.enrichment => {
                record.missing.push(column.name.to_string());
                continue;
            }
            None => return Err(StatsError::mapping(column.name, "unexpected null")),
        };
        let rank = match column.rank {
            Some(_) => row.rank(&column.rank_alias())?,
            None => None,
        };
        record.metrics.insert(
            column.name.to_string(),
            MetricValue {
                value,
                unit,
                rank,
                out_of: rank.map(|_| population),
            },
        );
    }

    Ok(record)
}

impl FromRow for NbaRosterPlayer {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            player_id: row.get("player_id")?,
            name: row.get("name")?,
            position: row.get_opt("position")?,
            team: row.get("team")?,
            number: row.get_opt("number")?,
        })
    }
}

impl FromRow for NbaTeam {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            team_id: row.get("team_id")?,
            city: row.get("city")?,
        })
    }
}

impl FromRow for NflRosterPlayer {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            name: row.get("name")?,
            position: row.get_opt("position")?,
        })
    }
}

impl FromRow for ScoreboardGame {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            game_id: row.get("game_id")?,
            home_city: row.get("home_city")?,
            home_team: row.get("home_team")?,
            away_city: row.get("away_city")?,
            away_team: row.get("away_team")?,
        })
    }
}

impl FromRow for ShotPoint {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        let basic: String = row.get("zone_basic")?;
        let area: Option<String> = row.get_opt("zone_area")?;
        Ok(Self {
            x: row.get("x")?,
            y: row.get("y")?,
            made: row.get("made")?,
            zone: zone_label(&basic, area.as_deref()),
            opponent: row.get_opt("opponent")?,
        })
    }
}

impl FromRow for PassingPlay {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            week: row.get("week")?,
            opponent: row.get("opponent")?,
            complete: row.get("complete")?,
            interception: row.get("interception")?,
            air_yards: row.get_opt("air_yards")?,
            pass_location: row.get_opt("pass_location")?,
            pass_length: row.get_opt("pass_length")?,
        })
    }
}

/// Opponent zones arrive already aggregated and ranked upstream.
impl FromRow for ZoneStat {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        let attempts: u32 = row.get("attempts")?;
        Ok(Self {
            zone: row.get("zone")?,
            attempts,
            makes: row.get("makes")?,
            pct: if attempts > 0 { row.get_opt("pct")? } else { None },
            rank: row.rank("rank")?,
            population_size: row.get_opt("out_of")?,
        })
    }
}

impl FromRow for NbaPlayerGame {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            game_id: row.get("game_id")?,
            game_date: row.get("game_date")?,
            points: row.get("points")?,
            assists: row.get("assists")?,
            rebounds: row.get("rebounds")?,
            threes_made: row.get("threes_made")?,
            minutes: row.get("minutes")?,
        })
    }
}

impl FromRow for NbaTeamGame {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            game_id: row.get("game_id")?,
            game_date: row.get("game_date")?,
            points: row.get("points")?,
        })
    }
}

impl FromRow for SnapCounts {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        let source = if row.get::<bool>("snaps_joined")? {
            EnrichmentSource::Joined
        } else {
            EnrichmentSource::Defaulted
        };
        Ok(Self {
            offense_snaps: row.get("offense_snaps")?,
            offense_snap_pct: row.get("offense_snap_pct")?,
            source,
        })
    }
}

impl FromRow for NflRushingReceivingGame {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            game_id: row.get("game_id")?,
            game_date: row.get("game_date")?,
            game_week: row.get("game_week")?,
            rushing_attempts: row.get("rushing_attempts")?,
            rushing_yards: row.get("rushing_yards")?,
            rushing_touchdowns: row.get("rushing_touchdowns")?,
            long_rushing: row.get("long_rushing")?,
            receptions: row.get("receptions")?,
            receiving_targets: row.get("receiving_targets")?,
            receiving_yards: row.get("receiving_yards")?,
            yards_per_reception: row.get("yards_per_reception")?,
            receiving_touchdowns: row.get("receiving_touchdowns")?,
            long_reception: row.get("long_reception")?,
            fumbles: row.get("fumbles")?,
            fumbles_lost: row.get("fumbles_lost")?,
            snaps: SnapCounts::from_row(row)?,
        })
    }
}

impl FromRow for NflPassingGame {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Self {
            game_id: row.get("game_id")?,
            game_date: row.get("game_date")?,
            game_week: row.get("game_week")?,
            passing_attempts: row.get("passing_attempts")?,
            completions: row.get("completions")?,
            passing_yards: row.get("passing_yards")?,
            passing_touchdowns: row.get("passing_touchdowns")?,
            interceptions: row.get("interceptions")?,
            qb_rating: row.get("qb_rating")?,
            yards_per_pass_attempt: row.get("yards_per_pass_attempt")?,
            rushing_attempts: row.get("rushing_attempts")?,
            rushing_yards: row.get("rushing_yards")?,
            yards_per_rush_attempt: row.get("yards_per_rush_attempt")?,
            rushing_touchdowns: row.get("rushing_touchdowns")?,
            long_rushing: row.get("long_rushing")?,
            snaps: SnapCounts::from_row(row)?,
        })
    }
}

impl FromRow for PropLine {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Snapshot {
            row_id: row.get("row_id")?,
            subject: row.get("subject")?,
            book: row.get("book")?,
            market: row.get("market")?,
            observed_at: row.get("observed_at")?,
            value: PropPrices {
                line: row.get("line")?,
                over_price: row.get_opt("over_price")?,
                under_price: row.get_opt("under_price")?,
            },
        })
    }
}

pub const MONEYLINE_MARKET: &str = "moneyline";

impl FromRow for MoneylineQuote {
    fn from_row(row: &Row) -> Result<Self, StatsError> {
        Ok(Snapshot {
            row_id: row.get("row_id")?,
            subject: row.get("subject")?,
            book: row.get("book")?,
            market: MONEYLINE_MARKET.to_string(),
            observed_at: row.get("observed_at")?,
            value: MoneylinePrice {
                price: row.get("price")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use crate::stats::catalog::{Catalog, Dataset};
    use crate::stats::models::{League, Unit};
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn null_required_field_names_the_field() {
        let row = Row::new().with("game_id", "0022400001").with("game_date", None::<NaiveDate>);
        let err = NbaTeamGame::from_row(&row).unwrap_err();
        assert!(matches!(err, StatsError::Mapping { field, .. } if field == "game_date"));
    }

    #[test]
    fn type_mismatch_is_mapping_error() {
        let row = Row::new().with("points", "lots");
        let err = row.get::<f64>("points").unwrap_err();
        assert!(matches!(err, StatsError::Mapping { field, reason } if field == "points" && reason.contains("text")));
    }

    #[rstest]
    #[case(Value::Null, None)]
    #[case(Value::Int(3), Some(3))]
    #[case(Value::Float(12.0), Some(12))]
    fn ranks_are_optional_integers(#[case] raw: Value, #[case] expected: Option<u32>) {
        let row = Row::new().with("pace_rank", raw);
        assert_eq!(row.rank("pace_rank").unwrap(), expected);
    }

    #[rstest]
    #[case(Value::Int(0))]
    #[case(Value::Float(2.5))]
    #[case(Value::Int(-1))]
    fn invalid_ranks_are_rejected(#[case] raw: Value) {
        let row = Row::new().with("pace_rank", raw);
        assert!(row.rank("pace_rank").is_err());
    }

    #[test]
    fn numeric_ids_read_as_text() {
        let row = Row::new().with("team_id", 1610612738i64).with("city", "Boston");
        let team = NbaTeam::from_row(&row).unwrap();
        assert_eq!(team.team_id, "1610612738");
        assert_eq!(row.id_param("team_id").unwrap(), SqlParam::Int(1610612738));
    }

    fn team_defense_row() -> Row {
        Row::new()
            .with("subject", "Kansas City Chiefs")
            .with("rush_epa_allowed", -0.08)
            .with("rush_epa_allowed_rank", 4i64)
            .with("sack_rate", None::<f64>)
            .with("sack_rate_rank", None::<i64>)
    }

    #[test]
    fn metric_record_keeps_units_and_ranks() {
        let resolution = Catalog::new(&StatsConfig::default())
            .resolve(League::Nfl, Dataset::TeamDefense, &["rush_epa_allowed", "sack_rate"])
            .unwrap();
        let record = metric_record(&resolution, 32, "chiefs", &team_defense_row()).unwrap();

        assert_eq!(record.subject, "Kansas City Chiefs");
        let epa = record.get("rush_epa_allowed").unwrap();
        assert_eq!(epa.value, -0.08);
        assert_eq!(epa.unit, Unit::Epa);
        assert_eq!(epa.rank, Some(4));
        assert_eq!(epa.out_of, Some(32));
        // Enrichment that did not join is reported, not zero-filled
        assert!(record.get("sack_rate").is_none());
        assert_eq!(record.missing, vec!["sack_rate".to_string()]);
    }

    #[test]
    fn null_required_metric_fails() {
        let resolution = Catalog::new(&StatsConfig::default())
            .resolve(League::Nfl, Dataset::TeamDefense, &["rush_epa_allowed"])
            .unwrap();
        let row = Row::new()
            .with("subject", "Kansas City Chiefs")
            .with("rush_epa_allowed", None::<f64>)
            .with("rush_epa_allowed_rank", None::<i64>);
        let err = metric_record(&resolution, 32, "chiefs", &row).unwrap_err();
        assert!(matches!(err, StatsError::Mapping { field, .. } if field == "rush_epa_allowed"));
    }

    #[test]
    fn defaulted_snap_counts_are_flagged() {
        let row = Row::new()
            .with("offense_snaps", 0i64)
            .with("offense_snap_pct", 0i64)
            .with("snaps_joined", false);
        let snaps = SnapCounts::from_row(&row).unwrap();
        assert_eq!(snaps.source, EnrichmentSource::Defaulted);
        assert_eq!(snaps.offense_snap_pct, 0.0);
    }

    #[test]
    fn moneyline_quotes_carry_fixed_market() {
        let observed = Utc.with_ymd_and_hms(2025, 1, 10, 18, 0, 0).unwrap();
        let row = Row::new()
            .with("row_id", 7i64)
            .with("subject", "Boston Celtics")
            .with("book", "FanDuel")
            .with("observed_at", observed)
            .with("price", -180i64);
        let quote = MoneylineQuote::from_row(&row).unwrap();
        assert_eq!(quote.market, MONEYLINE_MARKET);
        assert_eq!(quote.value.price, -180);
        assert_eq!(quote.observed_at, observed);
    }

    #[test]
    fn zero_attempt_opponent_zone_has_no_pct() {
        let row = Row::new()
            .with("zone", "Corner 3")
            .with("makes", 0i64)
            .with("attempts", 0i64)
            .with("pct", 0.0)
            .with("rank", None::<i64>)
            .with("out_of", 30i64);
        let zone = ZoneStat::from_row(&row).unwrap();
        assert_eq!(zone.pct, None);
        assert_eq!(zone.population_size, Some(30));
    }
}
