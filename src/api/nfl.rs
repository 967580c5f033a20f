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
    League, MetricRecord, NflPassingGame, NflRosterPlayer, NflRushingReceivingGame, PassingPlay, PropLine,
    StatsError, TeamMatchup,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(teams))
        .route("/teams/:team/roster", get(roster))
        .route("/teams/:team/defense", get(team_defense))
        .route("/teams/:team/offense", get(team_offense))
        .route("/teams/:team/matchup/:opponent", get(matchup))
        .route("/players/:player/rushing", get(rushing))
        .route("/players/:player/passing", get(passing))
        .route("/players/:player/receiving", get(receiving))
        .route("/players/:player/rushing-receiving-games", get(rushing_receiving_games))
        .route("/players/:player/passing-games", get(passing_games))
        .route("/players/:player/passing-plays", get(passing_plays))
        .route("/players/:player/props", get(props))
}

/// GET /nfl/teams
#[instrument(name = "nfl_teams", skip(state))]
async fn teams(State(state): State<AppState>) -> Result<Json<Vec<String>>, StatsError> {
    let teams = state.stats.nfl().teams(&state.query_context()).await?;
    info!(team_count = teams.len(), "Teams listed");
    Ok(Json(teams))
}

#[instrument(name = "nfl_roster", skip(state))]
async fn roster(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Json<Vec<NflRosterPlayer>>, StatsError> {
    Ok(Json(state.stats.nfl().roster(&state.query_context(), &team).await?))
}

#[instrument(name = "nfl_rushing", skip(state))]
async fn rushing(State(state): State<AppState>, Path(player): Path<String>) -> Result<Json<MetricRecord>, StatsError> {
    let record = state
        .stats
        .nfl()
        .player_rushing(&state.query_context(), &player)
        .await?;
    Ok(Json(record))
}

#[instrument(name = "nfl_passing", skip(state))]
async fn passing(State(state): State<AppState>, Path(player): Path<String>) -> Result<Json<MetricRecord>, StatsError> {
    let record = state
        .stats
        .nfl()
        .player_passing(&state.query_context(), &player)
        .await?;
    Ok(Json(record))
}

#[instrument(name = "nfl_receiving", skip(state))]
async fn receiving(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<MetricRecord>, StatsError> {
    let record = state
        .stats
        .nfl()
        .player_receiving(&state.query_context(), &player)
        .await?;
    Ok(Json(record))
}

/// GET /nfl/players/:player/rushing-receiving-games?n=5
#[instrument(name = "nfl_rushing_receiving_games", skip(state))]
async fn rushing_receiving_games(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<NflRushingReceivingGame>>, StatsError> {
    let games = state
        .stats
        .nfl()
        .rushing_receiving_games(&state.query_context(), &player, params.n)
        .await?;
    Ok(Json(games))
}

#[instrument(name = "nfl_passing_games", skip(state))]
async fn passing_games(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<NflPassingGame>>, StatsError> {
    let games = state
        .stats
        .nfl()
        .passing_games(&state.query_context(), &player, params.n)
        .await?;
    Ok(Json(games))
}

#[instrument(name = "nfl_team_defense", skip(state))]
async fn team_defense(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MetricParams>,
) -> Result<Json<MetricRecord>, StatsError> {
    team_metrics(&state, League::Nfl, Dataset::TeamDefense, &team, &params).await
}

#[instrument(name = "nfl_team_offense", skip(state))]
async fn team_offense(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MetricParams>,
) -> Result<Json<MetricRecord>, StatsError> {
    team_metrics(&state, League::Nfl, Dataset::TeamOffense, &team, &params).await
}

/// GET /nfl/players/:player/passing-plays?season=2024
///
/// The season is required.
#[instrument(name = "nfl_passing_plays", skip(state))]
async fn passing_plays(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<Vec<PassingPlay>>, StatsError> {
    let plays = state
        .stats
        .nfl()
        .passing_plays(&state.query_context(), &player, params.season.as_deref().unwrap_or_default())
        .await?;
    info!(play_count = plays.len(), "Passing plays served");
    Ok(Json(plays))
}

#[instrument(name = "nfl_props", skip(state))]
async fn props(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(params): Query<MarketParams>,
) -> Result<Json<Vec<PropLine>>, StatsError> {
    let lines = state
        .stats
        .nfl()
        .prop_odds(&state.query_context(), &player, &params.market)
        .await?;
    Ok(Json(lines))
}

#[instrument(name = "nfl_matchup", skip(state))]
async fn matchup(
    State(state): State<AppState>,
    Path((team, opponent)): Path<(String, String)>,
) -> Result<Json<TeamMatchup>, StatsError> {
    let matchup = state
        .stats
        .nfl()
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

    #[tokio::test]
    async fn test_teams_handler() {
        let store = ScriptedStore::new().on(
            "FROM nfl_data.nfl_roster_db",
            vec![Row::new().with("team", "Bills"), Row::new().with("team", "Chiefs")],
        );

        let response = get(store, "/teams").await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!(["Bills", "Chiefs"]));
    }

    #[tokio::test]
    async fn test_passing_plays_without_season_is_bad_request() {
        let store = ScriptedStore::new();

        let response = get(store.clone(), "/players/Josh%20Allen/passing-plays").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rostered_player_without_games_is_empty() {
        let store = ScriptedStore::new().on(
            "FROM nfl_data.nfl_roster_db",
            vec![Row::new().with("subject", "Joe Milton").with("team", "Patriots")],
        );

        let response = get(store, "/players/Joe%20Milton/passing-games?n=3").await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_player_games_not_found() {
        let response = get(ScriptedStore::new(), "/players/Nobody/rushing-receiving-games?n=3").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
