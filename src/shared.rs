use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::stats::service::{QueryContext, StatsService};
use crate::stats::StatsError;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StatsService>,
    /// Upper bound on the storage work done for one request
    pub query_timeout: Duration,
}

impl AppState {
    pub fn new(stats: Arc<StatsService>, query_timeout: Duration) -> Self {
        Self { stats, query_timeout }
    }

    /// A fresh per-request context whose deadline starts now.
    pub fn query_context(&self) -> QueryContext {
        QueryContext::with_timeout(self.query_timeout)
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            StatsError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            StatsError::UnknownMetric { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            StatsError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            // Catalog gaps, schema drift and storage failures never echo internals to the client
            StatsError::UnknownEntity { .. } | StatsError::Mapping { .. } | StatsError::Storage { .. } => {
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
