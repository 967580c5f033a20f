use axum::Router;
use sharpr::{api, shared::AppState, stats::PostgresStatsStore, StatsConfig, StatsService};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharpr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sharpr stats server");

    let config = StatsConfig::from_lookup(|key| std::env::var(key).ok())?;
    info!(
        opponent_zones_table = config.opponent_zones_table.as_str(),
        sportsbooks = ?config.sportsbooks.books(),
        tie_break = %config.snapshot_tie_break,
        "Stats config loaded"
    );

    let query_timeout = match std::env::var("QUERY_TIMEOUT_SECS") {
        Ok(secs) => Duration::from_secs(secs.trim().parse()?),
        Err(_) => Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
    };

    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let pool = sqlx::PgPool::connect(&database_url).await?;
    let store = Arc::new(PostgresStatsStore::new(pool));

    let app_state = AppState::new(Arc::new(StatsService::new(store, config)), query_timeout);

    let app = Router::new()
        .nest("/api/v1", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
