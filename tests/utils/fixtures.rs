#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use sharpr::stats::catalog::{Catalog, Dataset};
use sharpr::stats::{League, Row};
use sharpr::StatsConfig;

// ============================================================================
// Row builders for scripted store responses
// ============================================================================

pub fn nba_player(player_id: i64, name: &str, team: &str) -> Row {
    Row::new()
        .with("player_id", player_id)
        .with("subject", name)
        .with("team", team)
}

pub fn nfl_player(name: &str, team: &str) -> Row {
    Row::new().with("subject", name).with("team", team)
}

pub fn zone_count(subject_id: i64, zone: &str, attempts: i64, makes: i64) -> Row {
    Row::new()
        .with("subject_id", subject_id)
        .with("zone_basic", zone)
        .with("zone_area", None::<String>)
        .with("attempts", attempts)
        .with("makes", makes)
}

pub fn shot(x: f64, y: f64, made: bool, zone: &str) -> Row {
    Row::new()
        .with("game_id", "0022400512")
        .with("x", x)
        .with("y", y)
        .with("made", i64::from(made))
        .with("zone_basic", zone)
        .with("zone_area", "Center(C)")
        .with("opponent", "BOS")
}

pub fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, minute, 0).unwrap()
}

pub fn prop_row(row_id: i64, book: &str, minute: u32, line: f64) -> Row {
    Row::new()
        .with("row_id", row_id)
        .with("subject", "Jalen Brunson")
        .with("book", book)
        .with("market", "points")
        .with("observed_at", at_minute(minute))
        .with("line", line)
        .with("over_price", -110i64)
        .with("under_price", -110i64)
}

pub fn nba_boxscore(game_id: &str, day: u32) -> Row {
    nba_boxscore_with_minutes(game_id, day, 35.0)
}

pub fn nba_boxscore_with_minutes(game_id: &str, day: u32, minutes: f64) -> Row {
    Row::new()
        .with("game_id", game_id)
        .with("game_date", NaiveDate::from_ymd_opt(2025, 2, day).unwrap())
        .with("points", 25.0)
        .with("assists", 6.0)
        .with("rebounds", 4.0)
        .with("threes_made", 2.0)
        .with("minutes", minutes)
}

pub fn nfl_rushing_receiving_game(game_id: &str, week: u64, snaps: Option<i64>) -> Row {
    Row::new()
        .with("game_id", game_id)
        .with(
            "game_date",
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap() + chrono::Days::new(7 * week),
        )
        .with("game_week", week as i64)
        .with("rushing_attempts", 18i64)
        .with("rushing_yards", 92i64)
        .with("rushing_touchdowns", 1i64)
        .with("long_rushing", 21i64)
        .with("receptions", 3i64)
        .with("receiving_targets", 4i64)
        .with("receiving_yards", 27i64)
        .with("yards_per_reception", 9.0)
        .with("receiving_touchdowns", 0i64)
        .with("long_reception", 14i64)
        .with("fumbles", 0i64)
        .with("fumbles_lost", 0i64)
        .with("offense_snaps", snaps.unwrap_or(0))
        .with("offense_snap_pct", snaps.map(|s| s as f64 / 70.0).unwrap_or(0.0))
        .with("snaps_joined", snaps.is_some())
}

/// A row carrying every metric of a dataset, each ranked `rank`. Enrichment metrics are null
/// unless `enriched` is set.
pub fn metric_row(
    league: League,
    dataset: Dataset,
    subject: &str,
    rank: i64,
    enriched: bool,
) -> Row {
    let resolution = Catalog::new(&StatsConfig::default())
        .resolve(league, dataset, &[])
        .unwrap();
    let mut row = Row::new().with("subject", subject);
    for column in resolution.columns.iter().filter(|c| c.is_metric()) {
        let present = enriched || !column.enrichment;
        row.push(column.name, present.then_some(0.5));
        if column.rank.is_some() {
            row.push(&column.rank_alias(), present.then_some(rank));
        }
    }
    row
}
