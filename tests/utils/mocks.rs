use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sharpr::stats::{Row, SqlParam, StatsStore, StoreError, Value};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Clone)]
struct Rule {
    needle: String,
    response: Result<Vec<Row>, String>,
}

/// Answers each query with the rows of the first rule whose needle appears in the SQL.
/// Unmatched queries return no rows.
#[derive(Clone, Default)]
pub struct ScriptedStore {
    rules: Vec<Rule>,
    delay: Option<Duration>,
    row_key: Option<String>,
    ranges: Vec<(String, String)>,
    calls: Arc<Mutex<Vec<(String, Vec<SqlParam>)>>>,
}

#[allow(dead_code)]
impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, rows: Vec<Row>) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            response: Ok(rows),
        });
        self
    }

    pub fn fail(mut self, needle: &str, message: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            response: Err(message.to_string()),
        });
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shapes scripted rows the way the store would: when the SQL numbers rows per key only the
    /// first row per `key` survives, and a bound `LIMIT` keeps that many rows.
    pub fn honour_row_shaping(mut self, key: &str) -> Self {
        self.row_key = Some(key.to_string());
        self
    }

    /// Drops rows whose `row_column` falls outside a bound `<sql_column> BETWEEN $a AND $b`.
    pub fn honour_range(mut self, sql_column: &str, row_column: &str) -> Self {
        self.ranges.push((sql_column.to_string(), row_column.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<SqlParam>)> {
        self.calls.lock().unwrap().clone()
    }

    /// SQL of every call whose text contains `needle`.
    pub fn calls_matching(&self, needle: &str) -> Vec<(String, Vec<SqlParam>)> {
        self.calls()
            .into_iter()
            .filter(|(sql, _)| sql.contains(needle))
            .collect()
    }
}

#[async_trait]
impl StatsStore for ScriptedStore {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.rules.iter().find(|r| sql.contains(&r.needle)) {
            Some(Rule { response: Ok(rows), .. }) => Ok(self.shape(sql, params, rows.clone())),
            Some(Rule { response: Err(msg), .. }) => Err(StoreError::Other(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}

impl ScriptedStore {
    fn shape(&self, sql: &str, params: &[SqlParam], mut rows: Vec<Row>) -> Vec<Row> {
        for (sql_column, row_column) in &self.ranges {
            if let Some((low, high)) = bound_range(sql, params, sql_column) {
                rows.retain(|row| {
                    number(row.value(row_column)).is_some_and(|v| low <= v && v <= high)
                });
            }
        }
        let Some(key) = &self.row_key else {
            return rows;
        };
        if sql.contains("PARTITION BY") {
            let mut seen = Vec::new();
            rows.retain(|row| {
                let value = row.value(key).cloned();
                if seen.contains(&value) {
                    false
                } else {
                    seen.push(value);
                    true
                }
            });
        }
        if sql.contains(" LIMIT $") {
            if let Some(SqlParam::Int(limit)) = params.last() {
                rows.truncate(*limit as usize);
            }
        }
        rows
    }
}

fn bound_range(sql: &str, params: &[SqlParam], column: &str) -> Option<(f64, f64)> {
    let needle = format!(".{column} BETWEEN $");
    let rest = &sql[sql.find(&needle)? + needle.len()..];
    let (low, rest) = rest.split_once(" AND $")?;
    let high: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let param = |index: &str| match params.get(index.parse::<usize>().ok()? - 1)? {
        SqlParam::Int(v) => Some(*v as f64),
        _ => None,
    };
    Some((param(low)?, param(&high)?))
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        _ => None,
    }
}
