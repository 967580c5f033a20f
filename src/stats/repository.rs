use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sqlx::{postgres::PgRow, Column, PgPool, Row as _, TypeInfo};
use tracing::{debug, instrument, warn};

use super::errors::StoreError;

/// Positional parameter bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

/// A single cell returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value.into())
            }
        })*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    f64 => Float,
    String => Text,
    &str => Text,
    NaiveDate => Date,
    DateTime<Utc> => Timestamp,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A row keyed by the (case-insensitive) column names of the result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: &str, value: impl Into<Value>) {
        self.columns.push((column.to_string(), value.into()));
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Read-only access to the analytical store: SQL text plus positional parameters in, rows out.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, StoreError>;

    async fn query_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Row>, StoreError> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }
}

/// PostgreSQL implementation of the stats store
pub struct PostgresStatsStore {
    pool: PgPool,
}

impl PostgresStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn bind<'q>(
        sql: &'q str,
        params: &[SqlParam],
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlParam::Text(v) => query.bind(v.clone()),
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Float(v) => query.bind(*v),
            };
        }
        query
    }
}

#[async_trait]
impl StatsStore for PostgresStatsStore {
    #[instrument(skip(self, sql, params), fields(param_count = params.len()))]
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, StoreError> {
        let rows = Self::bind(sql, params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Stats query failed");
                StoreError::from(e)
            })?;

        debug!(row_count = rows.len(), "Stats query returned");
        rows.iter().map(decode_row).collect()
    }

    #[instrument(skip(self, sql, params), fields(param_count = params.len()))]
    async fn query_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Row>, StoreError> {
        let row = Self::bind(sql, params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Stats lookup failed");
                StoreError::from(e)
            })?;

        row.as_ref().map(decode_row).transpose()
    }
}

fn decode_row(row: &PgRow) -> Result<Row, StoreError> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let value = decode_value(row, column.ordinal(), column.type_info().name(), column.name())?;
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

fn decode_value(row: &PgRow, idx: usize, type_name: &str, column: &str) -> Result<Value, StoreError> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| Value::Int(v.into())),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| Value::Int(v.into())),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::Int),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(|v| Value::Float(v.into())),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::Float),
        "NUMERIC" => match row.try_get::<Option<Decimal>, _>(idx)? {
            Some(d) => Some(Value::Float(d.to_f64().ok_or_else(|| {
                StoreError::Other(format!("numeric out of range in column {column}"))
            })?)),
            None => None,
        },
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row.try_get::<Option<String>, _>(idx)?.map(Value::Text),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(Value::Date),
        "TIMESTAMPTZ" => row.try_get::<Option<DateTime<Utc>>, _>(idx)?.map(Value::Timestamp),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(|v| Value::Timestamp(v.and_utc())),
        other => {
            return Err(StoreError::UnsupportedType {
                column: column.to_string(),
                type_name: other.to_string(),
            })
        }
    };

    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lookup_ignores_case() {
        let row = Row::new().with("TEAM_NAME", "Boston Celtics").with("pace", 99.1);
        assert_eq!(row.value("team_name"), Some(&Value::Text("Boston Celtics".into())));
        assert_eq!(row.value("PACE"), Some(&Value::Float(99.1)));
        assert_eq!(row.value("missing"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn optional_values_become_null() {
        let row = Row::new().with("rank", None::<i64>).with("line", Some(5.5));
        assert!(row.value("rank").unwrap().is_null());
        assert_eq!(row.value("line"), Some(&Value::Float(5.5)));
    }

    struct StaticStore(Vec<Row>);

    #[async_trait]
    impl StatsStore for StaticStore {
        async fn query(&self, _sql: &str, _params: &[SqlParam]) -> Result<Vec<Row>, StoreError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn default_query_one_returns_first_row() {
        let store = StaticStore(vec![Row::new().with("n", 1i64), Row::new().with("n", 2i64)]);
        let row = store.query_one("SELECT 1", &[]).await.unwrap().unwrap();
        assert_eq!(row.value("n"), Some(&Value::Int(1)));

        let empty = StaticStore(vec![]);
        assert!(empty.query_one("SELECT 1", &[]).await.unwrap().is_none());
    }
}
