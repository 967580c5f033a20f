//! Entry points the HTTP layer calls, one per domain question.
//!
//! [`StatsService`] owns the catalog and the injected store. League-specific questions live on the
//! [`NbaStats`] and [`NflStats`] views.

mod nba;
mod nfl;

pub use nba::NbaStats;
pub use nfl::NflStats;

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::catalog::{Catalog, Dataset, Filter, Resolution};
use super::errors::{StatsError, StoreError};
use super::mapper::{map_rows, metric_record, FromRow};
use super::models::{EntityKey, League, MatchPolicy, MetricRecord, PropLine, Season, SubjectKind};
use super::query::QueryPlan;
use super::repository::{Row, SqlParam, StatsStore};
use super::snapshot::select_current;
use crate::config::StatsConfig;

/// Per-call options. A deadline bounds every storage call made on behalf of the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryContext {
    deadline: Option<Instant>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    async fn run<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, call)
                .await
                .map_err(|_| StoreError::DeadlineExceeded)?,
            None => call.await,
        }
    }
}

pub struct StatsService {
    store: Arc<dyn StatsStore>,
    catalog: Catalog,
    config: StatsConfig,
}

impl StatsService {
    pub fn new(store: Arc<dyn StatsStore>, config: StatsConfig) -> Self {
        Self {
            store,
            catalog: Catalog::new(&config),
            config,
        }
    }

    pub fn nba(&self) -> NbaStats<'_> {
        NbaStats::new(self)
    }

    pub fn nfl(&self) -> NflStats<'_> {
        NflStats::new(self)
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fetches a metric record for one subject, narrowed to `metrics` (all when empty).
    #[instrument(skip(self, ctx, key), fields(key = %key))]
    pub async fn metrics(
        &self,
        ctx: &QueryContext,
        dataset: Dataset,
        key: &EntityKey,
        metrics: &[&str],
    ) -> Result<MetricRecord, StatsError> {
        let resolution = self.catalog.resolve(key.league, dataset, metrics)?;
        let plan = self.subject_plan(ctx, resolution, key).await?;

        let row = self
            .fetch_one(ctx, "metrics", key, &plan)
            .await?
            .ok_or_else(|| StatsError::NotFound(format!("no {dataset} for {key}")))?;

        let population = self.catalog.league(key.league).team_population();
        let record = metric_record(plan.resolution(), population, &key.identifier, &row)?;

        debug!(
            metric_count = record.metrics.len(),
            missing = record.missing.len(),
            "Metric record assembled"
        );
        Ok(record)
    }

    /// Plan for a dataset filtered to one subject, by name when the dataset is keyed by name
    /// and by resolved id otherwise.
    async fn subject_plan(
        &self,
        ctx: &QueryContext,
        resolution: Resolution,
        key: &EntityKey,
    ) -> Result<QueryPlan, StatsError> {
        let plan = QueryPlan::new(resolution);
        if plan.resolution().mapping.filter(Filter::Subject).is_some() {
            plan.filter(Filter::Subject, key.identifier.as_str())
        } else {
            let id = self.resolve_id(ctx, key, MatchPolicy::First).await?;
            plan.filter(Filter::SubjectId, id)
        }
    }

    /// Rows naming the subject in the league's lookup table.
    async fn lookup(&self, ctx: &QueryContext, key: &EntityKey) -> Result<Vec<Row>, StatsError> {
        let dataset = match key.kind {
            SubjectKind::Player => Dataset::PlayerLookup,
            SubjectKind::Team => Dataset::TeamLookup,
        };
        let plan = QueryPlan::new(self.catalog.resolve(key.league, dataset, &[])?)
            .filter(Filter::Subject, key.identifier.as_str())?;
        self.fetch(ctx, "lookup", key, &plan).await
    }

    /// Resolves a name to the surrogate id the stats tables are keyed by.
    async fn resolve_id(
        &self,
        ctx: &QueryContext,
        key: &EntityKey,
        policy: MatchPolicy,
    ) -> Result<SqlParam, StatsError> {
        let id_field = match key.kind {
            SubjectKind::Player => "player_id",
            SubjectKind::Team => "team_id",
        };
        let rows = self.lookup(ctx, key).await?;
        let Some(first) = rows.first() else {
            return Err(StatsError::NotFound(key.to_string()));
        };
        let id = first.id_param(id_field)?;

        if policy == MatchPolicy::Unique {
            for row in &rows[1..] {
                if row.id_param(id_field)? != id {
                    return Err(StatsError::invalid(format!("{key} matches more than one {}", key.kind)));
                }
            }
        }

        debug!(key = %key, matches = rows.len(), "Resolved subject id");
        Ok(id)
    }

    /// Fails with `NotFound` unless the subject appears in the lookup table.
    async fn ensure_exists(&self, ctx: &QueryContext, key: &EntityKey) -> Result<(), StatsError> {
        if self.lookup(ctx, key).await?.is_empty() {
            return Err(StatsError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn fetch(
        &self,
        ctx: &QueryContext,
        stage: &'static str,
        key: impl Display,
        plan: &QueryPlan,
    ) -> Result<Vec<Row>, StatsError> {
        let (sql, params) = plan.render();
        debug!(stage, sql = %sql, param_count = params.len(), "Running stats query");
        ctx.run(self.store.query(&sql, &params))
            .await
            .map_err(|source| storage_error(stage, key, source))
    }

    async fn fetch_one(
        &self,
        ctx: &QueryContext,
        stage: &'static str,
        key: impl Display,
        plan: &QueryPlan,
    ) -> Result<Option<Row>, StatsError> {
        let (sql, params) = plan.render();
        debug!(stage, sql = %sql, param_count = params.len(), "Running stats lookup");
        ctx.run(self.store.query_one(&sql, &params))
            .await
            .map_err(|source| storage_error(stage, key, source))
    }

    /// Runs an unfiltered listing, or one filtered by `key`, and maps every row.
    async fn list<T: FromRow>(
        &self,
        ctx: &QueryContext,
        league: League,
        dataset: Dataset,
        key: Option<&EntityKey>,
    ) -> Result<Vec<T>, StatsError> {
        let mut plan = QueryPlan::new(self.catalog.resolve(league, dataset, &[])?);
        if let Some(key) = key {
            plan = plan.filter(Filter::Subject, key.identifier.as_str())?;
        }
        let label = match key {
            Some(key) => key.to_string(),
            None => format!("{league} {dataset}"),
        };
        let rows = self.fetch(ctx, "list", &label, &plan).await?;
        map_rows(&rows)
    }

    /// Current prop lines for a player and market, restricted to the configured books.
    async fn prop_lines(
        &self,
        ctx: &QueryContext,
        key: &EntityKey,
        market: &str,
    ) -> Result<Vec<PropLine>, StatsError> {
        let books = &self.config.sportsbooks;
        let mut plan = QueryPlan::new(self.catalog.resolve(key.league, Dataset::PropOdds, &[])?)
            .filter(Filter::Subject, key.identifier.as_str())?
            .filter(Filter::Market, market)?;
        if !books.is_unrestricted() {
            plan = plan.filter_in(Filter::Book, books.books().iter().map(String::as_str))?;
        }

        let rows = self.fetch(ctx, "prop_odds", key, &plan).await?;
        let snapshots: Vec<PropLine> = map_rows(&rows)?;
        let observed = snapshots.len();
        let current = select_current(snapshots, books, self.config.snapshot_tie_break);

        debug!(key = %key, market, observed, current = current.len(), "Selected current prop lines");
        Ok(current)
    }

    fn nba_season(&self, raw: Option<&str>) -> Result<Season, StatsError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Season::parse(League::Nba, raw),
            None => Season::parse(League::Nba, &self.config.default_nba_season),
        }
    }
}

fn storage_error(stage: &'static str, key: impl Display, source: StoreError) -> StatsError {
    let key = key.to_string();
    warn!(stage, key = %key, error = %source, "Stats storage call failed");
    StatsError::Storage { stage, key, source }
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, StatsError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StatsError::invalid(format!("{name} is required")));
    }
    Ok(value)
}

fn id_text(id: &SqlParam) -> String {
    match id {
        SqlParam::Text(v) => v.clone(),
        SqlParam::Int(v) => v.to_string(),
        SqlParam::Float(v) => v.to_string(),
    }
}
