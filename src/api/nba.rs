use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{team_metrics, MarketParams, MetricParams, SeasonParams, WindowParams};
use crate::shared::AppState;
use crate::stats::catalog::Dataset;
use crate::stats::{
    League, MetricRecord, MoneylineQuote, NbaPlayerGame, NbaRosterPlayer, NbaTeam, NbaTeamGame, OpponentZones,
    PropLine, ScoreboardGame, ShotChart, ShotZones, StatsError, TeamMatchup,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(teams))
        .route("/teams/:team/roster", get(roster))
        .route("/teams/:team/games", get(team_games))
        .route("/teams/:team/defense", get(team_defense))
        .route("/teams/:team/offense", get(team_offense))
        .route("/teams/:team/shot-zones", get(team_shot_zones))
        .route("/teams/:team/opponent-zones", get(opponent_zones))
        .route("/teams/:team/moneyline", get(moneyline))
        .route("/teams/:team/matchup/:opponent", get(matchup))
        .route("/scoreboard", get(scoreboard))
        .route("/players/:player/games", get(player_games))
        .route("/players/:player/shooting-splits", get(shooting_splits))
        .route("/players/:player/headline", get(headline))
        .route("/players/:player/shot-chart", get(shot_chart))
        .route("/players/:player/shot-zones", get(player_shot_zones))
        .route("/players/:player/props", get(props))
}

/// GET /nba/teams
#[instrument(name = "nba_teams", skip(state))]
async fn teams(State(state): State<AppState>) -> Result<Json<Vec<NbaTeam>>, StatsError> {
    let teams = state.stats.nba().teams(&state.query_context()).await?;
    info!(team_count = teams.len(), "Teams listed");
    Ok(Json(teams))
}

/// GET /nba/teams/:team/roster
#[instrument(name = "nba_roster", skip(state))]
async fn roster(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Json<Vec<NbaRosterPlayer>>, StatsError> {
    Ok(Json(state.stats.nba().roster(&state.query_context(), &team).await?))
}

#[instrument(name = "nba_scoreboard", skip(state))]
async fn scoreboard(State(state): State<AppState>) -> Result<Json<Vec<ScoreboardGame>>, StatsError> {
    Ok(Json(state.stats.nba().scoreboard(&state.query_context()).await?))
}

/// GET /nba/players/:player/games?n=5
///
/// Most recent games first, at most `n`.
#[instrument(name = "nba_player_games", skip(state))]
async fn player_games(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<NbaPlayerGame>>, StatsError> {
    let games = state
        .stats
        .nba()
        .player_last_games(&state.query_context(), &player, params.n)
        .await?;
    Ok(Json(games))
}

#[instrument(name = "nba_team_games", skip(state))]
async fn team_games(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<NbaTeamGame>>, StatsError> {
    let games = state
        .stats
        .nba()
        .team_last_games(&state.query_context(), &team, params.n)
        .await?;
    Ok(Json(games))
}

/// GET /nba/teams/:team/defense?metrics=def_rating,pace
#[instrument(name = "nba_team_defense", skip(state))]
async fn team_defense(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MetricParams>,
) -> Result<Json<MetricRecord>, StatsError> {
    team_metrics(&state, League::Nba, Dataset::TeamDefense, &team, &params).await
}

#[instrument(name = "nba_team_offense", skip(state))]
async fn team_offense(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MetricParams>,
) -> Result<Json<MetricRecord>, StatsError> {
    team_metrics(&state, League::Nba, Dataset::TeamOffense, &team, &params).await
}

#[instrument(name = "nba_shooting_splits", skip(state))]
async fn shooting_splits(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<MetricRecord>, StatsError> {
    let record = state
        .stats
        .nba()
        .player_shooting_splits(&state.query_context(), &player)
        .await?;
    Ok(Json(record))
}

#[instrument(name = "nba_headline", skip(state))]
async fn headline(State(state): State<AppState>, Path(player): Path<String>) -> Result<Json<MetricRecord>, StatsError> {
    let record = state
        .stats
        .nba()
        .player_headline(&state.query_context(), &player)
        .await?;
    Ok(Json(record))
}

/// GET /nba/players/:player/shot-chart?season=2024-25
#[instrument(name = "nba_shot_chart", skip(state))]
async fn shot_chart(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<ShotChart>, StatsError> {
    let chart = state
        .stats
        .nba()
        .player_shot_chart(&state.query_context(), &player, params.season.as_deref())
        .await?;
    Ok(Json(chart))
}

#[instrument(name = "nba_player_shot_zones", skip(state))]
async fn player_shot_zones(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<ShotZones>, StatsError> {
    let zones = state
        .stats
        .nba()
        .player_shot_zones(&state.query_context(), &player, params.season.as_deref())
        .await?;
    Ok(Json(zones))
}

#[instrument(name = "nba_team_shot_zones", skip(state))]
async fn team_shot_zones(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<ShotZones>, StatsError> {
    let zones = state
        .stats
        .nba()
        .team_shot_zones(&state.query_context(), &team, params.season.as_deref())
        .await?;
    Ok(Json(zones))
}

/// GET /nba/teams/:team/opponent-zones
///
/// `:team` is the three letter abbreviation.
#[instrument(name = "nba_opponent_zones", skip(state))]
async fn opponent_zones(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<OpponentZones>, StatsError> {
    let zones = state
        .stats
        .nba()
        .opponent_zones(&state.query_context(), &team, params.season.as_deref())
        .await?;
    Ok(Json(zones))
}

/// GET /nba/players/:player/props?market=points
#[instrument(name = "nba_props", skip(state))]
async fn props(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<MarketParams>,
) -> Result<Json<Vec<PropLine>>, StatsError> {
    let lines = state
        .stats
        .nba()
        .prop_odds(&state.query_context(), &player, &params.market)
        .await?;
    info!(line_count = lines.len(), "Prop lines served");
    Ok(Json(lines))
}

#[instrument(name = "nba_moneyline", skip(state))]
async fn moneyline(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Json<Vec<MoneylineQuote>>, StatsError> {
    let quotes = state
        .stats
        .nba()
        .moneyline_odds(&state.query_context(), &team)
        .await?;
    Ok(Json(quotes))
}

/// GET /nba/teams/:team/matchup/:opponent
///
/// The team's offense next to the opponent's defense.
#[instrument(name = "nba_matchup", skip(state))]
async fn matchup(
    State(state): State<AppState>,
    Path((team, opponent)): Path<(String, String)>,
) -> Result<Json<TeamMatchup>, StatsError> {
    let matchup = state
        .stats
        .nba()
        .team_matchup(&state.query_context(), &team, &opponent)
        .await?;
    Ok(Json(matchup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{AppStateBuilder, ScriptedStore};
    use crate::stats::Row;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt; // for `oneshot`

    async fn get(store: ScriptedStore, uri: &str) -> Response {
        let app = routes().with_state(AppStateBuilder::new().with_store(store).build());
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_teams_handler() {
        let store = ScriptedStore::new().on(
            "FROM nba_data.team_roster",
            vec![Row::new().with("team_id", 1610612738i64).with("city", "BOS")],
        );

        let response = get(store, "/teams").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0]["city"], "BOS");
    }

    #[tokio::test]
    async fn test_zero_window_is_bad_request() {
        let store = ScriptedStore::new();

        let response = get(store.clone(), "/players/Jalen%20Brunson/games?n=0").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_player_is_not_found() {
        let response = get(ScriptedStore::new(), "/players/Nobody/headline").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Nobody"));
    }

    #[tokio::test]
    async fn test_props_require_market() {
        let response = get(ScriptedStore::new(), "/players/Jalen%20Brunson/props").await;

        // Missing query string is rejected by the extractor
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
