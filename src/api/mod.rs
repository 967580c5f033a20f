//! Thin HTTP adapters over the stats facade, mounted under `/api/v1`.

mod nba;
mod nfl;

use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::shared::AppState;
use crate::stats::catalog::Dataset;
use crate::stats::{EntityKey, League, MetricRecord, StatsError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/nba", nba::routes())
        .nest("/nfl", nfl::routes())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub n: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeasonParams {
    pub season: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarketParams {
    pub market: String,
}

/// Optional comma-separated metric subset, e.g. `?metrics=pace,def_rating`.
#[derive(Debug, Default, Deserialize)]
pub struct MetricParams {
    pub metrics: Option<String>,
}

impl MetricParams {
    fn names(&self) -> Vec<&str> {
        self.metrics
            .as_deref()
            .map(|m| m.split(',').map(str::trim).filter(|m| !m.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Shared body of the defense and offense endpoints of both leagues.
async fn team_metrics(
    state: &AppState,
    league: League,
    dataset: Dataset,
    team: &str,
    params: &MetricParams,
) -> Result<Json<MetricRecord>, StatsError> {
    let key = EntityKey::team(league, team)?;
    let record = state
        .stats
        .metrics(&state.query_context(), dataset, &key, &params.names())
        .await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{AppStateBuilder, ScriptedStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_health() {
        let app = router().with_state(AppStateBuilder::new().build());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn metric_names_ignore_blanks() {
        let params = MetricParams {
            metrics: Some("pace, def_rating,,".to_string()),
        };
        assert_eq!(params.names(), vec!["pace", "def_rating"]);
        assert!(MetricParams::default().names().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details() {
        let store = ScriptedStore::new().fail("nfl_team_defensive_stats_db", "password authentication failed");
        let app = router().with_state(AppStateBuilder::new().with_store(store).build());
        let request = Request::builder()
            .uri("/nfl/teams/Chiefs/defense")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_unknown_metric_is_bad_request() {
        let app = router().with_state(AppStateBuilder::new().build());
        let request = Request::builder()
            .uri("/nba/teams/Boston%20Celtics/defense?metrics=pace,sack_rate")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
