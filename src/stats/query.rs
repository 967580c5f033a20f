//! Composes parameterized SQL from a catalog [`Resolution`].
//!
//! Identifiers only ever come from the static catalog. Every caller-supplied value, including the
//! window size, is pushed onto the parameter list and referenced by a `$n` placeholder.

use std::fmt::Write as _;

use super::catalog::{
    ColumnSpec, DatasetMapping, Expr, Filter, FilterSpec, JoinKind, JoinSpec, Match, Resolution,
};
use super::errors::StatsError;
use super::repository::SqlParam;

#[derive(Debug, Clone)]
pub struct QueryPlan {
    resolution: Resolution,
    predicates: Vec<String>,
    params: Vec<SqlParam>,
    limit: Option<usize>,
}

impl QueryPlan {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            predicates: Vec::new(),
            params: Vec::new(),
            limit: None,
        }
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Adds an equality predicate on the column the dataset maps `filter` to.
    pub fn filter(mut self, filter: Filter, value: impl Into<SqlParam>) -> Result<Self, StatsError> {
        let spec = self.filter_spec(filter)?;
        let placeholder = self.bind(value.into());
        let predicate = match spec.matching {
            Match::Exact => format!("{} = {placeholder}", qualified(spec.source, spec.column)),
            Match::IgnoreCase => format!(
                "UPPER({}) = UPPER({placeholder})",
                qualified(spec.source, spec.column)
            ),
        };
        self.predicates.push(predicate);
        Ok(self)
    }

    /// Adds a membership predicate. An empty set matches nothing.
    pub fn filter_in<I, V>(mut self, filter: Filter, values: I) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlParam>,
    {
        let spec = self.filter_spec(filter)?;
        let column = match spec.matching {
            Match::Exact => qualified(spec.source, spec.column),
            Match::IgnoreCase => format!("UPPER({})", qualified(spec.source, spec.column)),
        };
        let placeholders: Vec<String> = values
            .into_iter()
            .map(|v| {
                let placeholder = self.bind(v.into());
                match spec.matching {
                    Match::Exact => placeholder,
                    Match::IgnoreCase => format!("UPPER({placeholder})"),
                }
            })
            .collect();

        if placeholders.is_empty() {
            self.predicates.push("1 = 0".to_string());
        } else {
            self.predicates
                .push(format!("{column} IN ({})", placeholders.join(", ")));
        }
        Ok(self)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn filter_spec(&self, filter: Filter) -> Result<&'static FilterSpec, StatsError> {
        self.resolution
            .mapping
            .filter(filter)
            .ok_or_else(|| StatsError::UnknownEntity {
                league: self.resolution.league,
                entity: format!("{} filter on {}", filter, self.resolution.dataset),
            })
    }

    fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    /// Renders the SQL text and the parameters in placeholder order.
    pub fn render(&self) -> (String, Vec<SqlParam>) {
        let mapping = &self.resolution.mapping;
        let columns = &self.resolution.columns;
        let mut params = self.params.clone();
        let mut sql = String::from("SELECT ");

        if mapping.distinct {
            sql.push_str("DISTINCT ");
        }

        let mut select: Vec<String> = columns.iter().flat_map(|c| select_items(c)).collect();
        if let Some(key) = mapping.one_row_per {
            select.push(format!("{} AS row_num", row_number(mapping, key)));
        }
        sql.push_str(&select.join(", "));

        let _ = write!(sql, " FROM {} {}", table(mapping.base.table), mapping.base.alias);

        for join in mapping.joins {
            sql.push(' ');
            sql.push_str(&render_join(join, columns));
        }

        let mut predicates = self.predicates.clone();
        for bound in mapping.bounds {
            params.push(SqlParam::Int(bound.low));
            let low = params.len();
            params.push(SqlParam::Int(bound.high));
            predicates.push(format!(
                "{} BETWEEN ${low} AND ${}",
                qualified(bound.source, bound.column),
                params.len()
            ));
        }
        if !predicates.is_empty() {
            let _ = write!(sql, " WHERE {}", predicates.join(" AND "));
        }

        if columns.iter().any(|c| c.expr.is_aggregate()) {
            let group: Vec<String> = columns
                .iter()
                .filter(|c| !c.expr.is_aggregate())
                .map(|c| expression(c))
                .collect();
            if !group.is_empty() {
                let _ = write!(sql, " GROUP BY {}", group.join(", "));
            }
        }

        // One row per key, ahead of ORDER BY and LIMIT
        if mapping.one_row_per.is_some() {
            let outputs: Vec<String> = columns
                .iter()
                .flat_map(|c| std::iter::once(c.name.to_string()).chain(c.rank.map(|_| c.rank_alias())))
                .collect();
            sql = format!("SELECT {} FROM ({sql}) latest WHERE row_num = 1", outputs.join(", "));
        }

        if !mapping.order.is_empty() {
            let order: Vec<String> = mapping
                .order
                .iter()
                .map(|o| {
                    if o.descending {
                        format!("{} DESC", o.column)
                    } else {
                        o.column.to_string()
                    }
                })
                .collect();
            let _ = write!(sql, " ORDER BY {}", order.join(", "));
        }

        if let Some(limit) = self.limit {
            params.push(SqlParam::Int(i64::try_from(limit).unwrap_or(i64::MAX)));
            let _ = write!(sql, " LIMIT ${}", params.len());
        }

        (sql, params)
    }
}

/// `ROW_NUMBER()` over rows sharing `key`, numbered in the dataset's order.
fn row_number(mapping: &DatasetMapping, key: &str) -> String {
    let partition = mapping
        .column(key)
        .map_or_else(|| ident(key), expression);
    let order: Vec<String> = mapping
        .order
        .iter()
        .filter_map(|o| {
            let column = expression(mapping.column(o.column)?);
            Some(if o.descending {
                format!("{column} DESC")
            } else {
                column
            })
        })
        .collect();
    if order.is_empty() {
        format!("ROW_NUMBER() OVER (PARTITION BY {partition})")
    } else {
        format!(
            "ROW_NUMBER() OVER (PARTITION BY {partition} ORDER BY {})",
            order.join(", ")
        )
    }
}

fn select_items(column: &ColumnSpec) -> Vec<String> {
    let mut items = vec![format!("{} AS {}", expression(column), column.name)];
    if let Some(rank) = column.rank {
        items.push(format!(
            "{} AS {}",
            qualified(column.source, rank),
            column.rank_alias()
        ));
    }
    items
}

fn expression(column: &ColumnSpec) -> String {
    let target = qualified(column.source, column.column);
    match column.expr {
        Expr::Column => target,
        Expr::Coalesce(default) => format!("COALESCE({target}, {default})"),
        Expr::Present => format!("({target} IS NOT NULL)"),
        Expr::Count => "COUNT(*)".to_string(),
        Expr::SumFlag => format!("SUM(CAST({target} AS INTEGER))"),
    }
}

fn render_join(join: &JoinSpec, columns: &[&ColumnSpec]) -> String {
    let keyword = match join.kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::Left => "LEFT JOIN",
    };
    let alias = join.source.alias;

    let source = match join.dedupe_on {
        None => format!("{} {alias}", table(join.source.table)),
        Some(keys) => {
            // Collapse the joined table to one row per key so the base row is never fanned out.
            let mut projected: Vec<String> = keys.iter().map(|k| ident(k)).collect();
            let mut seen: Vec<&str> = keys.to_vec();
            for column in columns.iter().filter(|c| c.source == alias) {
                for name in std::iter::once(column.column).chain(column.rank) {
                    if !seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                        seen.push(name);
                        projected.push(format!("MAX({0}) AS {0}", ident(name)));
                    }
                }
            }
            let keys: Vec<String> = keys.iter().map(|k| ident(k)).collect();
            format!(
                "(SELECT {} FROM {} GROUP BY {}) {alias}",
                projected.join(", "),
                table(join.source.table),
                keys.join(", ")
            )
        }
    };

    let on: Vec<String> = join
        .on
        .iter()
        .map(|(left_alias, left, right)| format!("{} = {}", qualified(left_alias, left), qualified(alias, right)))
        .collect();

    format!("{keyword} {source} ON {}", on.join(" AND "))
}

fn table(name: &str) -> String {
    name.split('.').map(ident).collect::<Vec<_>>().join(".")
}

fn qualified(alias: &str, column: &str) -> String {
    format!("{alias}.{}", ident(column))
}

/// Quotes an identifier only when it is not a plain SQL identifier, so ordinary names keep the
/// store's case folding.
fn ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
