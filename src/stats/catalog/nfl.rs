use super::{
    ColumnSpec as C, Dataset, DatasetMapping, FilterSpec as F, JoinKind, JoinSpec, OrderSpec, Source,
};
use super::Filter::{Book, Market, Season, Subject};
use crate::stats::models::Unit::{Count, Epa, PerGame, Percent, Rate, Yards};

pub(super) const TEAM_COUNT: u32 = 32;

pub(super) fn mapping(dataset: Dataset) -> Option<DatasetMapping> {
    let mapping = match dataset {
        Dataset::PlayerLookup => PLAYER_LOOKUP,
        Dataset::Teams => TEAMS,
        Dataset::Roster => ROSTER,
        Dataset::PlayerRushing => PLAYER_RUSHING,
        Dataset::PlayerPassing => PLAYER_PASSING,
        Dataset::PlayerReceiving => PLAYER_RECEIVING,
        Dataset::TeamDefense => TEAM_DEFENSE,
        Dataset::TeamOffense => TEAM_OFFENSE,
        Dataset::RushingReceivingGameLog => RUSHING_RECEIVING_GAME_LOG,
        Dataset::PassingGameLog => PASSING_GAME_LOG,
        Dataset::PassingPlays => PASSING_PLAYS,
        Dataset::PropOdds => PROP_ODDS,
        Dataset::TeamLookup
        | Dataset::Scoreboard
        | Dataset::PlayerHeadline
        | Dataset::PlayerShootingSplits
        | Dataset::PlayerGameLog
        | Dataset::TeamGameLog
        | Dataset::ShotChart
        | Dataset::PlayerShotZones
        | Dataset::TeamShotZones
        | Dataset::OpponentZones
        | Dataset::MoneylineOdds => return None,
    };
    Some(mapping)
}

const ROSTER_TABLE: Source = Source::new("nfl_data.nfl_roster_db", "r");

const PLAYER_LOOKUP: DatasetMapping = DatasetMapping {
    base: ROSTER_TABLE,
    joins: &[],
    columns: &[
        C::field("subject", "r", "player_name"),
        C::field("team", "r", "team_name"),
    ],
    filters: &[F::ignore_case(Subject, "r", "player_name")],
    bounds: &[],
    order: &[OrderSpec::asc("team")],
    distinct: true,
    one_row_per: None,
};

const TEAMS: DatasetMapping = DatasetMapping {
    base: ROSTER_TABLE,
    joins: &[],
    columns: &[C::field("team", "r", "team_name")],
    filters: &[],
    bounds: &[],
    order: &[OrderSpec::asc("team")],
    distinct: true,
    one_row_per: None,
};

const ROSTER: DatasetMapping = DatasetMapping {
    base: ROSTER_TABLE,
    joins: &[],
    columns: &[
        C::field("name", "r", "player_name"),
        C::field("position", "r", "position"),
    ],
    filters: &[F::ignore_case(Subject, "r", "team_name")],
    bounds: &[],
    order: &[OrderSpec::asc("name")],
    distinct: false,
    one_row_per: None,
};

const PLAYER_RUSHING: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_rushing_db", "ru"),
    joins: &[],
    columns: &[
        C::field("subject", "ru", "player_name"),
        C::metric("avg_gain", "ru", "avgGain", Yards),
        C::metric("long_rushing", "ru", "longRushing", Yards),
        C::metric("net_total_yards", "ru", "netTotalYards", Yards),
        C::metric("net_yards_per_game", "ru", "netYardsPerGame", PerGame),
        C::metric("rushing_attempts", "ru", "rushingAttempts", Count),
        C::metric("rushing_big_plays", "ru", "rushingBigPlays", Count),
        C::metric("rushing_first_downs", "ru", "rushingFirstDowns", Count),
        C::metric("rushing_fumbles", "ru", "rushingFumbles", Count),
        C::metric("rushing_fumbles_lost", "ru", "rushingFumblesLost", Count),
        C::metric("rushing_touchdowns", "ru", "rushingTouchdowns", Count),
        C::metric("rushing_yards", "ru", "rushingYards", Yards),
        C::metric("rushing_yards_per_game", "ru", "rushingYardsPerGame", PerGame),
        C::metric("stuffs", "ru", "stuffs", Count),
        C::metric("stuff_yards_lost", "ru", "stuffYardsLost", Yards),
        C::metric("team_games_played", "ru", "teamGamesPlayed", Count),
        C::metric("total_offensive_plays", "ru", "totalOffensivePlays", Count),
        C::metric("total_points_per_game", "ru", "totalPointsPerGame", PerGame),
        C::metric("total_touchdowns", "ru", "totalTouchdowns", Count),
        C::metric("total_yards", "ru", "totalYards", Yards),
        C::metric("total_yards_from_scrimmage", "ru", "totalYardsFromScrimmage", Yards),
        C::metric("two_point_rush_convs", "ru", "twoPointRushConvs", Count),
        C::metric("two_pt_rush", "ru", "twoPtRush", Count),
        C::metric("two_pt_rush_attempts", "ru", "twoPtRushAttempts", Count),
        C::metric("yards_from_scrimmage_per_game", "ru", "yardsFromScrimmagePerGame", PerGame),
        C::metric("yards_per_game", "ru", "yardsPerGame", PerGame),
        C::metric("yards_per_rush_attempt", "ru", "yardsPerRushAttempt", Yards),
    ],
    filters: &[F::ignore_case(Subject, "ru", "player_name")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const PLAYER_PASSING: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_passing_db", "pa"),
    joins: &[],
    columns: &[
        C::field("subject", "pa", "player_name"),
        C::metric("avg_gain", "pa", "avgGain", Yards),
        C::metric("completion_pct", "pa", "completionPct", Percent),
        C::metric("completions", "pa", "completions", Count),
        C::metric("interception_pct", "pa", "interceptionPct", Percent),
        C::metric("interceptions", "pa", "interceptions", Count),
        C::metric("long_passing", "pa", "longPassing", Yards),
        C::metric("net_passing_yards", "pa", "netPassingYards", Yards),
        C::metric("net_passing_yards_per_game", "pa", "netPassingYardsPerGame", PerGame),
        C::metric("net_total_yards", "pa", "netTotalYards", Yards),
        C::metric("net_yards_per_game", "pa", "netYardsPerGame", PerGame),
        C::metric("passing_attempts", "pa", "passingAttempts", Count),
        C::metric("passing_yards", "pa", "passingYards", Yards),
        C::metric("total_offensive_plays", "pa", "totalOffensivePlays", Count),
    ],
    filters: &[F::ignore_case(Subject, "pa", "player_name")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const PLAYER_RECEIVING: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_receiving_db", "re"),
    joins: &[],
    columns: &[
        C::field("subject", "re", "player_name"),
        C::metric("avg_gain", "re", "avgGain", Yards),
        C::metric("long_reception", "re", "longReception", Yards),
        C::metric("net_total_yards", "re", "netTotalYards", Yards),
        C::metric("net_yards_per_game", "re", "netYardsPerGame", PerGame),
        C::metric("receiving_big_plays", "re", "receivingBigPlays", Count),
        C::metric("receiving_first_downs", "re", "receivingFirstDowns", Count),
        C::metric("receiving_fumbles", "re", "receivingFumbles", Count),
        C::metric("receiving_fumbles_lost", "re", "receivingFumblesLost", Count),
        C::metric("receiving_targets", "re", "receivingTargets", Count),
        C::metric("receiving_touchdowns", "re", "receivingTouchdowns", Count),
        C::metric("receiving_yards", "re", "receivingYards", Yards),
        C::metric("receiving_yards_after_catch", "re", "receivingYardsAfterCatch", Yards),
        C::metric("receiving_yards_at_catch", "re", "receivingYardsAtCatch", Yards),
        C::metric("receiving_yards_per_game", "re", "receivingYardsPerGame", PerGame),
        C::metric("receptions", "re", "receptions", Count),
        C::metric("team_games_played", "re", "teamGamesPlayed", Count),
        C::metric("total_offensive_plays", "re", "totalOffensivePlays", Count),
        C::metric("total_points_per_game", "re", "totalPointsPerGame", PerGame),
        C::metric("total_touchdowns", "re", "totalTouchdowns", Count),
        C::metric("total_yards", "re", "totalYards", Yards),
        C::metric("total_yards_from_scrimmage", "re", "totalYardsFromScrimmage", Yards),
        C::metric("two_point_rec_convs", "re", "twoPointRecConvs", Count),
        C::metric("two_pt_reception", "re", "twoPtReception", Count),
        C::metric("two_pt_reception_attempts", "re", "twoPtReceptionAttempts", Count),
        C::metric("yards_from_scrimmage_per_game", "re", "yardsFromScrimmagePerGame", PerGame),
        C::metric("yards_per_game", "re", "yardsPerGame", PerGame),
        C::metric("yards_per_reception", "re", "yardsPerReception", Yards),
    ],
    filters: &[F::ignore_case(Subject, "re", "player_name")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

// Sharp and Sumer tables are third-party enrichments and may lag the base table.
const TEAM_DEFENSE: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_team_defensive_stats_db", "tds"),
    joins: &[
        JoinSpec {
            kind: JoinKind::Left,
            source: Source::new("nfl_data.nfl_sharp_defense_stats", "sds"),
            on: &[("tds", "team_name", "team")],
            dedupe_on: Some(&["team"]),
        },
        JoinSpec {
            kind: JoinKind::Left,
            source: Source::new("nfl_data.nfl_sumer_defense_stats", "sumer"),
            on: &[("tds", "team_name", "team")],
            dedupe_on: Some(&["team"]),
        },
    ],
    columns: &[
        C::field("subject", "tds", "team_name"),
        C::ranked("rush_epa_allowed", "tds", "rush_epa_allowed", "rush_epa_allowed_rank", Epa),
        C::ranked(
            "rush_success_rate_allowed",
            "tds",
            "rush_success_rate_allowed",
            "rush_success_rate_allowed_rank",
            Rate,
        ),
        C::ranked("dropback_epa_allowed", "tds", "dropback_epa_allowed", "dropback_epa_allowed_rank", Epa),
        C::ranked(
            "dropback_success_rate_allowed",
            "tds",
            "dropback_success_rate_allowed",
            "dropback_success_rate_allowed_rank",
            Rate,
        ),
        C::ranked("sack_rate", "sumer", "sack_%", "sack_%_rank", Percent).enrichment(),
        C::ranked("epa_per_play_allowed", "sumer", "epa/play", "epa/play_rank", Epa).enrichment(),
        C::ranked("success_rate_allowed", "sumer", "success_%", "success_%_rank", Percent).enrichment(),
        C::ranked("adot", "sumer", "adot", "adot_rank", Yards).enrichment(),
        C::ranked("scramble_rate", "sumer", "scramble_%", "scramble_%_rank", Percent).enrichment(),
        C::ranked("int_rate", "sumer", "int_%", "int_%_rank", Percent).enrichment(),
        C::ranked(
            "explosive_play_rate_allowed",
            "sds",
            "explosive_play_rate_allowed",
            "explosive_play_rate_allowed_rank",
            Rate,
        )
        .enrichment(),
        C::ranked("pressure_rate", "sds", "pressure_rate", "pressure_rate_rank", Rate).enrichment(),
        C::ranked("blitz_rate", "sds", "blitz_rate", "blitz_rate_rank", Rate).enrichment(),
        C::ranked("man_rate", "sds", "man_rate", "man_rate_rank", Rate).enrichment(),
        C::ranked("zone_rate", "sds", "zone_rate", "zone_rate_rank", Rate).enrichment(),
        C::ranked("rush_stuff_rate", "sds", "rush_stuff_rate", "rush_stuff_rate_rank", Rate).enrichment(),
        C::ranked(
            "yards_before_contact_per_rb_rush",
            "sds",
            "yards_before_contact_per_rb_rush",
            "yards_before_contact_per_rb_rush_rank",
            Yards,
        )
        .enrichment(),
        C::ranked(
            "down_conversion_rate_allowed",
            "sds",
            "down_conversion_rate_allowed",
            "down_conversion_rate_allowed_rank",
            Rate,
        )
        .enrichment(),
        C::ranked(
            "yards_per_play_allowed",
            "sds",
            "yards_per_play_allowed",
            "yards_per_play_allowed_rank",
            Yards,
        )
        .enrichment(),
    ],
    filters: &[F::ignore_case(Subject, "tds", "team_name")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const TEAM_OFFENSE: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_team_offense_advanced_stats", "oa"),
    joins: &[
        JoinSpec {
            kind: JoinKind::Inner,
            source: Source::new("nfl_data.nfl_team_passing_stats_db", "ps"),
            on: &[("oa", "team_name", "team_name")],
            dedupe_on: None,
        },
        JoinSpec {
            kind: JoinKind::Inner,
            source: Source::new("nfl_data.nfl_team_rushing_stats_db", "rs"),
            on: &[("oa", "team_name", "team_name")],
            dedupe_on: None,
        },
        JoinSpec {
            kind: JoinKind::Left,
            source: Source::new("nfl_data.nfl_sumer_offense_stats", "sumer"),
            on: &[("oa", "team_name", "team")],
            dedupe_on: Some(&["team"]),
        },
    ],
    columns: &[
        C::field("subject", "oa", "team_name"),
        C::ranked("dropback_epa", "oa", "dropback_epa", "dropback_epa_rank", Epa),
        C::ranked("rush_epa", "oa", "rush_epa", "rush_epa_rank", Epa),
        C::ranked("rush_success_rate", "oa", "rush_success_rate", "rush_success_rate_rank", Rate),
        C::ranked(
            "dropback_success_rate",
            "oa",
            "dropback_success_rate",
            "dropback_success_rate_rank",
            Rate,
        ),
        C::ranked(
            "passing_yards_per_game",
            "ps",
            "passingYardsPerGame",
            "passingYardsPerGame_rank",
            PerGame,
        ),
        C::ranked("yards_per_completion", "ps", "yardsPerCompletion", "yardsPerCompletion_rank", Yards),
        C::ranked("passing_attempts", "ps", "passingAttempts", "passingAttempts_rank", Count),
        C::ranked("rushing_attempts", "rs", "rushingAttempts", "rushingAttempts_rank", Count),
        C::ranked("yards_per_rush_attempt", "rs", "yardsPerRushAttempt", "yardsPerRushAttempt_rank", Yards),
        C::ranked("epa_per_play", "sumer", "epa/play", "epa/play_rank", Epa).enrichment(),
        C::ranked("success_rate", "sumer", "success_%", "success_%_rank", Percent).enrichment(),
        C::ranked("sack_rate", "sumer", "sack_%", "sack_%_rank", Percent).enrichment(),
        C::ranked("adot", "sumer", "adot", "adot_rank", Yards).enrichment(),
        C::ranked("scramble_rate", "sumer", "scramble_%", "scramble_%_rank", Percent).enrichment(),
        C::ranked("int_rate", "sumer", "int_%", "int_%_rank", Percent).enrichment(),
    ],
    filters: &[F::ignore_case(Subject, "oa", "team_name")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const SNAP_COUNTS: JoinSpec = JoinSpec {
    kind: JoinKind::Left,
    source: Source::new("nfl_data.nfl_player_snap_counts", "ps"),
    on: &[
        ("gl", "player_id", "player_id"),
        ("gl", "season", "season"),
        ("gl", "game_week", "game_week"),
    ],
    dedupe_on: Some(&["player_id", "season", "game_week"]),
};

// Counting stats are null when the player recorded none in that game.
const RUSHING_RECEIVING_GAME_LOG: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_player_gamelog", "gl"),
    joins: &[SNAP_COUNTS],
    columns: &[
        C::field("game_id", "gl", "game_id"),
        C::field("game_date", "gl", "game_date"),
        C::field("game_week", "gl", "game_week"),
        C::coalesce("rushing_attempts", "gl", "rushingAttempts", 0),
        C::coalesce("rushing_yards", "gl", "rushingYards", 0),
        C::coalesce("rushing_touchdowns", "gl", "rushingTouchdowns", 0),
        C::coalesce("long_rushing", "gl", "longRushing", 0),
        C::coalesce("receptions", "gl", "receptions", 0),
        C::coalesce("receiving_targets", "gl", "receivingTargets", 0),
        C::coalesce("receiving_yards", "gl", "receivingYards", 0),
        C::coalesce("yards_per_reception", "gl", "yardsPerReception", 0),
        C::coalesce("receiving_touchdowns", "gl", "receivingTouchdowns", 0),
        C::coalesce("long_reception", "gl", "longReception", 0),
        C::coalesce("fumbles", "gl", "fumbles", 0),
        C::coalesce("fumbles_lost", "gl", "fumblesLost", 0),
        C::coalesce("offense_snaps", "ps", "offense_snaps", 0).enrichment(),
        C::coalesce("offense_snap_pct", "ps", "offense_snap_pct", 0).enrichment(),
        C::present("snaps_joined", "ps", "player_id").enrichment(),
    ],
    filters: &[F::ignore_case(Subject, "gl", "player_name")],
    bounds: &[],
    order: &[OrderSpec::desc("game_date"), OrderSpec::desc("game_id")],
    distinct: false,
    one_row_per: Some("game_id"),
};

const PASSING_GAME_LOG: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_qb_gamelog", "gl"),
    joins: &[SNAP_COUNTS],
    columns: &[
        C::field("game_id", "gl", "game_id"),
        C::field("game_date", "gl", "game_date"),
        C::field("game_week", "gl", "game_week"),
        C::coalesce("passing_attempts", "gl", "passingAttempts", 0),
        C::coalesce("completions", "gl", "completions", 0),
        C::coalesce("passing_yards", "gl", "passingYards", 0),
        C::coalesce("passing_touchdowns", "gl", "passingTouchdowns", 0),
        C::coalesce("interceptions", "gl", "interceptions", 0),
        C::coalesce("qb_rating", "gl", "QBRating", 0),
        C::coalesce("yards_per_pass_attempt", "gl", "yardsPerPassAttempt", 0),
        C::coalesce("rushing_attempts", "gl", "rushingAttempts", 0),
        C::coalesce("rushing_yards", "gl", "rushingYards", 0),
        C::coalesce("yards_per_rush_attempt", "gl", "yardsPerRushAttempt", 0),
        C::coalesce("rushing_touchdowns", "gl", "rushingTouchdowns", 0),
        C::coalesce("long_rushing", "gl", "longRushing", 0),
        C::coalesce("offense_snaps", "ps", "offense_snaps", 0).enrichment(),
        C::coalesce("offense_snap_pct", "ps", "offense_snap_pct", 0).enrichment(),
        C::present("snaps_joined", "ps", "player_id").enrichment(),
    ],
    filters: &[F::ignore_case(Subject, "gl", "player_name")],
    bounds: &[],
    order: &[OrderSpec::desc("game_date"), OrderSpec::desc("game_id")],
    distinct: false,
    one_row_per: Some("game_id"),
};

const PASSING_PLAYS: DatasetMapping = DatasetMapping {
    base: Source::new("nfl_data.nfl_pbp_qb_data", "pbp"),
    joins: &[],
    columns: &[
        C::field("week", "pbp", "week"),
        C::field("opponent", "pbp", "opponent"),
        C::field("complete", "pbp", "complete_pass"),
        C::field("interception", "pbp", "interception"),
        C::field("air_yards", "pbp", "air_yards"),
        C::field("pass_location", "pbp", "pass_location"),
        C::field("pass_length", "pbp", "pass_length"),
    ],
    filters: &[
        F::ignore_case(Subject, "pbp", "passer"),
        F::exact(Season, "pbp", "season"),
    ],
    bounds: &[],
    order: &[OrderSpec::asc("week")],
    distinct: false,
    one_row_per: None,
};

// The NFL prop feed lands in the shared odds schema.
const PROP_ODDS: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.nfl_prop_odds", "po"),
    joins: &[],
    columns: &[
        C::field("row_id", "po", "row_id"),
        C::field("subject", "po", "player"),
        C::field("book", "po", "sport_book"),
        C::field("market", "po", "market"),
        C::field("observed_at", "po", "timestamp"),
        C::field("line", "po", "line"),
        C::field("over_price", "po", "over_odds"),
        C::field("under_price", "po", "under_odds"),
    ],
    filters: &[
        F::ignore_case(Subject, "po", "player"),
        F::ignore_case(Market, "po", "market"),
        F::exact(Book, "po", "sport_book"),
    ],
    bounds: &[],
    order: &[OrderSpec::asc("book"), OrderSpec::desc("observed_at")],
    distinct: false,
    one_row_per: None,
};
