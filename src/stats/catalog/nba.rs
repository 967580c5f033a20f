use super::{
    ColumnSpec as C, Dataset, DatasetMapping, FilterSpec as F, JoinKind, JoinSpec, OrderSpec, RangeSpec,
    Source,
};
use super::Filter::{Book, Market, Season, Subject, SubjectId};
use crate::config::OpponentZonesTable;
use crate::stats::models::Unit::{PerGame, Rate, Rating};

pub(super) const TEAM_COUNT: u32 = 30;

pub(super) fn mapping(dataset: Dataset, opponent_zones: OpponentZonesTable) -> Option<DatasetMapping> {
    let mapping = match dataset {
        Dataset::PlayerLookup => PLAYER_LOOKUP,
        Dataset::TeamLookup => TEAM_LOOKUP,
        Dataset::Teams => TEAMS,
        Dataset::Roster => ROSTER,
        Dataset::Scoreboard => SCOREBOARD,
        Dataset::PlayerHeadline => PLAYER_HEADLINE,
        Dataset::PlayerShootingSplits => PLAYER_SHOOTING_SPLITS,
        Dataset::TeamDefense => TEAM_DEFENSE,
        Dataset::TeamOffense => TEAM_OFFENSE,
        Dataset::PlayerGameLog => PLAYER_GAME_LOG,
        Dataset::TeamGameLog => TEAM_GAME_LOG,
        Dataset::ShotChart => SHOT_CHART,
        Dataset::PlayerShotZones => PLAYER_SHOT_ZONES,
        Dataset::TeamShotZones => TEAM_SHOT_ZONES,
        Dataset::OpponentZones => DatasetMapping {
            base: Source::new(opponent_zones.as_str(), "oz"),
            ..OPPONENT_ZONES
        },
        Dataset::PropOdds => PROP_ODDS,
        Dataset::MoneylineOdds => MONEYLINE_ODDS,
        Dataset::PlayerRushing
        | Dataset::PlayerPassing
        | Dataset::PlayerReceiving
        | Dataset::RushingReceivingGameLog
        | Dataset::PassingGameLog
        | Dataset::PassingPlays => return None,
    };
    Some(mapping)
}

const ROSTER_TABLE: Source = Source::new("nba_data.team_roster", "tr");

const PLAYER_LOOKUP: DatasetMapping = DatasetMapping {
    base: ROSTER_TABLE,
    joins: &[],
    columns: &[
        C::field("player_id", "tr", "PLAYER_ID"),
        C::field("subject", "tr", "PLAYER"),
        C::field("team", "tr", "TEAM"),
    ],
    filters: &[F::ignore_case(Subject, "tr", "PLAYER")],
    bounds: &[],
    order: &[OrderSpec::asc("player_id")],
    distinct: true,
    one_row_per: None,
};

const TEAM_LOOKUP: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.teams_advanced_stats", "adv"),
    joins: &[],
    columns: &[
        C::field("team_id", "adv", "TEAM_ID"),
        C::field("subject", "adv", "TEAM_NAME"),
    ],
    filters: &[F::ignore_case(Subject, "adv", "TEAM_NAME")],
    bounds: &[],
    order: &[OrderSpec::asc("team_id")],
    distinct: false,
    one_row_per: None,
};

const TEAMS: DatasetMapping = DatasetMapping {
    base: ROSTER_TABLE,
    joins: &[],
    columns: &[C::field("team_id", "tr", "TeamID"), C::field("city", "tr", "TEAM")],
    filters: &[],
    bounds: &[],
    order: &[OrderSpec::asc("city")],
    distinct: true,
    one_row_per: None,
};

const ROSTER: DatasetMapping = DatasetMapping {
    base: ROSTER_TABLE,
    joins: &[],
    columns: &[
        C::field("player_id", "tr", "PLAYER_ID"),
        C::field("name", "tr", "PLAYER"),
        C::field("position", "tr", "POSITION"),
        C::field("team", "tr", "TEAM"),
        C::field("number", "tr", "NUM"),
    ],
    filters: &[F::ignore_case(Subject, "tr", "TEAM")],
    bounds: &[],
    order: &[OrderSpec::asc("name")],
    distinct: false,
    one_row_per: None,
};

const SCOREBOARD: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.scoreboard", "sb"),
    joins: &[],
    columns: &[
        C::field("game_id", "sb", "game_id"),
        C::field("home_city", "sb", "home_team_city"),
        C::field("home_team", "sb", "home_team_name"),
        C::field("away_city", "sb", "away_team_city"),
        C::field("away_team", "sb", "away_team_name"),
    ],
    filters: &[],
    bounds: &[],
    order: &[OrderSpec::asc("game_id")],
    distinct: false,
    one_row_per: None,
};

const PLAYER_HEADLINE: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.player_headline_stats", "phs"),
    joins: &[],
    columns: &[
        C::metric("points", "phs", "PTS", PerGame),
        C::metric("assists", "phs", "AST", PerGame),
        C::metric("rebounds", "phs", "REB", PerGame),
    ],
    filters: &[F::exact(SubjectId, "phs", "player_id")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const PLAYER_SHOOTING_SPLITS: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.player_shooting_splits", "ssp"),
    joins: &[],
    columns: &[
        C::metric("fg2a", "ssp", "FG2A", PerGame),
        C::metric("fg2m", "ssp", "FG2M", PerGame),
        C::metric("fg2_pct", "ssp", "FG2_PCT", Rate),
        C::metric("fg3a", "ssp", "FG3A", PerGame),
        C::metric("fg3m", "ssp", "FG3M", PerGame),
        C::metric("fg3_pct", "ssp", "FG3_PCT", Rate),
        C::metric("fga", "ssp", "FGA", PerGame),
        C::metric("fgm", "ssp", "FGM", PerGame),
        C::metric("fg_pct", "ssp", "FG_PCT", Rate),
        C::metric("efg_pct", "ssp", "EFG_PCT", Rate),
        C::metric("fg2a_frequency", "ssp", "FG2A_FREQUENCY", Rate),
        C::metric("fg3a_frequency", "ssp", "FG3A_FREQUENCY", Rate),
    ],
    filters: &[F::exact(SubjectId, "ssp", "player_id")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const TEAM_DEFENSE: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.teams_opponent_stats", "opp"),
    joins: &[
        JoinSpec {
            kind: JoinKind::Inner,
            source: Source::new("nba_data.teams_defense_stats", "def"),
            on: &[("opp", "TEAM_ID", "TEAM_ID")],
            dedupe_on: None,
        },
        JoinSpec {
            kind: JoinKind::Inner,
            source: Source::new("nba_data.teams_advanced_stats", "adv"),
            on: &[("opp", "TEAM_ID", "TEAM_ID")],
            dedupe_on: None,
        },
        JoinSpec {
            kind: JoinKind::Inner,
            source: Source::new("nba_data.teams_four_factors_stats", "ff"),
            on: &[("opp", "TEAM_ID", "TEAM_ID")],
            dedupe_on: None,
        },
    ],
    columns: &[
        C::field("subject", "opp", "TEAM_NAME"),
        C::ranked("opp_fga", "opp", "OPP_FGA", "OPP_FGA_RANK", PerGame),
        C::ranked("opp_fg_pct", "opp", "OPP_FG_PCT", "OPP_FG_PCT_RANK", Rate),
        C::ranked("opp_fta", "opp", "OPP_FTA", "OPP_FTA_RANK", PerGame),
        C::ranked("opp_ft_pct", "opp", "OPP_FT_PCT", "OPP_FT_PCT_RANK", Rate),
        C::ranked("opp_reb", "opp", "OPP_REB", "OPP_REB_RANK", PerGame),
        C::ranked("opp_ast", "opp", "OPP_AST", "OPP_AST_RANK", PerGame),
        C::ranked("opp_fg3a", "opp", "OPP_FG3A", "OPP_FG3A_RANK", PerGame),
        C::ranked("opp_fg3_pct", "opp", "OPP_FG3_PCT", "OPP_FG3_PCT_RANK", Rate),
        C::ranked("def_rating", "def", "DEF_RATING", "DEF_RATING_RANK", Rating),
        C::ranked("opp_pts_paint", "def", "OPP_PTS_PAINT", "OPP_PTS_PAINT_RANK", PerGame),
        C::ranked("pace", "adv", "PACE", "PACE_RANK", Rating),
        C::ranked("opp_efg_pct", "ff", "OPP_EFG_PCT", "OPP_EFG_PCT_RANK", Rate),
        C::ranked("opp_fta_rate", "ff", "OPP_FTA_RATE", "OPP_FTA_RATE_RANK", Rate),
        C::ranked("opp_oreb_pct", "ff", "OPP_OREB_PCT", "OPP_OREB_PCT_RANK", Rate),
    ],
    filters: &[F::ignore_case(Subject, "opp", "TEAM_NAME")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const TEAM_OFFENSE: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.teams_advanced_stats", "adv"),
    joins: &[JoinSpec {
        kind: JoinKind::Inner,
        source: Source::new("nba_data.teams_four_factors_stats", "ff"),
        on: &[("adv", "TEAM_ID", "TEAM_ID")],
        dedupe_on: None,
    }],
    columns: &[
        C::field("subject", "adv", "TEAM_NAME"),
        C::ranked("off_rating", "adv", "OFF_RATING", "OFF_RATING_RANK", Rating),
        C::ranked("reb_pct", "adv", "REB_PCT", "REB_PCT_RANK", Rate),
        C::ranked("ast_pct", "adv", "AST_PCT", "AST_PCT_RANK", Rate),
        C::ranked("pace", "adv", "PACE", "PACE_RANK", Rating),
        C::ranked("efg_pct", "ff", "EFG_PCT", "EFG_PCT_RANK", Rate),
        C::ranked("fta_rate", "ff", "FTA_RATE", "FTA_RATE_RANK", Rate),
        C::ranked("tm_tov_pct", "ff", "TM_TOV_PCT", "TM_TOV_PCT_RANK", Rate),
        C::ranked("oreb_pct", "adv", "OREB_PCT", "OREB_PCT_RANK", Rate),
    ],
    filters: &[F::ignore_case(Subject, "adv", "TEAM_NAME")],
    bounds: &[],
    order: &[],
    distinct: false,
    one_row_per: None,
};

const PLAYER_GAME_LOG: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.player_boxscores", "bx"),
    joins: &[],
    columns: &[
        C::field("game_id", "bx", "GAME_ID"),
        C::field("game_date", "bx", "game_date"),
        C::field("points", "bx", "points"),
        C::field("assists", "bx", "assists"),
        C::field("rebounds", "bx", "reboundsTotal"),
        C::field("threes_made", "bx", "threePointersMade"),
        C::field("minutes", "bx", "minutes_per_game"),
    ],
    filters: &[F::exact(SubjectId, "bx", "player_id")],
    bounds: &[],
    order: &[OrderSpec::desc("game_date"), OrderSpec::desc("game_id")],
    distinct: false,
    one_row_per: Some("game_id"),
};

const TEAM_GAME_LOG: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.team_boxscores", "tb"),
    joins: &[],
    columns: &[
        C::field("game_id", "tb", "GAME_ID"),
        C::field("game_date", "tb", "GAME_DATE"),
        C::field("points", "tb", "PTS"),
    ],
    filters: &[F::ignore_case(Subject, "tb", "TEAM_CITY")],
    bounds: &[],
    order: &[OrderSpec::desc("game_date"), OrderSpec::desc("game_id")],
    distinct: false,
    one_row_per: Some("game_id"),
};

// Half-court in shot-chart units; anything outside is a heave or a bad coordinate.
const COURT: [RangeSpec; 2] = [
    RangeSpec::new("psr", "LOC_X", -250, 250),
    RangeSpec::new("psr", "LOC_Y", -50, 470),
];

const SHOT_TABLE: Source = Source::new("nba_data.player_shotchart_raw", "psr");

const SHOT_CHART: DatasetMapping = DatasetMapping {
    base: SHOT_TABLE,
    joins: &[JoinSpec {
        kind: JoinKind::Left,
        source: Source::new("nba_data.player_boxscores", "pb"),
        on: &[("psr", "player_id", "player_id"), ("psr", "GAME_ID", "GAME_ID")],
        dedupe_on: Some(&["player_id", "GAME_ID"]),
    }],
    columns: &[
        C::field("game_id", "psr", "GAME_ID"),
        C::field("x", "psr", "LOC_X"),
        C::field("y", "psr", "LOC_Y"),
        C::field("made", "psr", "SHOT_MADE_FLAG"),
        C::field("zone_basic", "psr", "SHOT_ZONE_BASIC"),
        C::field("zone_area", "psr", "SHOT_ZONE_AREA"),
        C::field("opponent", "pb", "OPPONENT").enrichment(),
    ],
    filters: &[
        F::exact(SubjectId, "psr", "player_id"),
        F::exact(Season, "psr", "SEASON_ID"),
    ],
    bounds: &COURT,
    order: &[OrderSpec::asc("game_id")],
    distinct: false,
    one_row_per: None,
};

const PLAYER_SHOT_ZONES: DatasetMapping = DatasetMapping {
    base: SHOT_TABLE,
    joins: &[],
    columns: &[
        C::field("subject_id", "psr", "player_id"),
        C::field("zone_basic", "psr", "SHOT_ZONE_BASIC"),
        C::field("zone_area", "psr", "SHOT_ZONE_AREA"),
        C::count("attempts"),
        C::sum_flag("makes", "psr", "SHOT_MADE_FLAG"),
    ],
    filters: &[F::exact(Season, "psr", "SEASON_ID")],
    bounds: &[],
    order: &[
        OrderSpec::asc("zone_basic"),
        OrderSpec::asc("zone_area"),
        OrderSpec::asc("subject_id"),
    ],
    distinct: false,
    one_row_per: None,
};

const TEAM_SHOT_ZONES: DatasetMapping = DatasetMapping {
    columns: &[
        C::field("subject_id", "psr", "TEAM_ID"),
        C::field("zone_basic", "psr", "SHOT_ZONE_BASIC"),
        C::field("zone_area", "psr", "SHOT_ZONE_AREA"),
        C::count("attempts"),
        C::sum_flag("makes", "psr", "SHOT_MADE_FLAG"),
    ],
    ..PLAYER_SHOT_ZONES
};

// Base table is supplied by configuration, see `mapping`.
const OPPONENT_ZONES: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.team_opponent_zones", "oz"),
    joins: &[],
    columns: &[
        C::field("zone", "oz", "REGION"),
        C::field("makes", "oz", "FGM"),
        C::field("attempts", "oz", "FGA"),
        C::field("pct", "oz", "FG_PCT"),
        C::field("rank", "oz", "FG_RANK"),
        C::field("out_of", "oz", "OUT_OF"),
    ],
    filters: &[
        F::exact(Season, "oz", "SEASON"),
        F::ignore_case(Subject, "oz", "TEAM_ABBR"),
    ],
    bounds: &[],
    order: &[OrderSpec::asc("zone")],
    distinct: false,
    one_row_per: None,
};

const PROP_ODDS: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.nba_prop_odds", "po"),
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

const MONEYLINE_ODDS: DatasetMapping = DatasetMapping {
    base: Source::new("nba_data.nba_moneyline_odds", "ml"),
    joins: &[],
    columns: &[
        C::field("row_id", "ml", "row_id"),
        C::field("subject", "ml", "team"),
        C::field("book", "ml", "sport_book"),
        C::field("observed_at", "ml", "timestamp"),
        C::field("price", "ml", "price"),
    ],
    filters: &[F::ignore_case(Subject, "ml", "team"), F::exact(Book, "ml", "sport_book")],
    bounds: &[],
    order: &[OrderSpec::asc("book"), OrderSpec::desc("observed_at")],
    distinct: false,
    one_row_per: None,
};
