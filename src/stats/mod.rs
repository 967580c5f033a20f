//! Statistical query and aggregation over the NBA and NFL stores.
//!
//! Callers go through [`StatsService`]; everything below it turns a league, a dataset and a
//! subject into one parameterized query and maps the rows back into typed records.

pub mod catalog;
mod errors;
pub mod mapper;
pub mod models;
pub mod query;
pub mod repository;
pub mod service;
pub mod snapshot;
pub mod window;
pub mod zones;

pub use errors::{StatsError, StoreError};
pub use models::*;
pub use repository::{PostgresStatsStore, Row, SqlParam, StatsStore, Value};
pub use service::{NbaStats, NflStats, QueryContext, StatsService};
