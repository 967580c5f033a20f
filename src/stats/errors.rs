use thiserror::Error;

use super::models::League;

/// Failure reported by a [`StatsStore`](super::repository::StatsStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unsupported column type {type_name} for column {column}")]
    UnsupportedType { column: String, type_name: String },

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Store error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No {league} mapping for {entity}")]
    UnknownEntity { league: League, entity: String },

    #[error("No {league} column mapping for metric {metric}")]
    UnknownMetric { league: League, metric: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Mapping error on field {field}: {reason}")]
    Mapping { field: String, reason: String },

    #[error("Storage failure during {stage} for {key}: {source}")]
    Storage {
        stage: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },
}

impl StatsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StatsError::InvalidArgument(msg.into())
    }

    pub fn mapping(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StatsError::Mapping {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StatsError::NotFound(_))
    }
}
