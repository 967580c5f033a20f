use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

use sharpr::{api, shared::AppState, StatsConfig, StatsService};

use super::mocks::ScriptedStore;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub store: ScriptedStore,
    pub service: Arc<StatsService>,
    pub query_timeout: Duration,
}

pub struct TestSetupBuilder {
    store: ScriptedStore,
    config: StatsConfig,
    query_timeout: Duration,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            store: ScriptedStore::new(),
            config: StatsConfig::default(),
            query_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_store(mut self, store: ScriptedStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_sportsbooks(mut self, books: &[&str]) -> Self {
        self.config.sportsbooks = sharpr::stats::snapshot::BookAllowList::new(books.iter().copied());
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn build(self) -> TestSetup {
        let service = StatsService::new(Arc::new(self.store.clone()), self.config);
        TestSetup {
            store: self.store,
            service: Arc::new(service),
            query_timeout: self.query_timeout,
        }
    }
}

#[allow(dead_code)]
impl TestSetup {
    pub fn app(&self) -> Router {
        Router::new()
            .nest("/api/v1", api::router())
            .with_state(AppState::new(Arc::clone(&self.service), self.query_timeout))
    }

    /// Issues a GET against the full router and returns the status with the decoded body.
    pub async fn get(&self, uri: &str) -> (axum::http::StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response: Response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
