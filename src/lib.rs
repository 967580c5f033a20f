// Library crate for the sharpr stats server
// This file exposes the public API for integration tests

pub mod api;
pub mod config;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use config::StatsConfig;
pub use shared::AppState;
pub use stats::{QueryContext, StatsError, StatsService, StatsStore};
