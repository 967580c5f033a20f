//! Static mapping from semantic datasets and metrics to the physical warehouse tables of each league.
//!
//! The two leagues evolve independently, so each has its own table set (`nba`, `nfl`) and nothing
//! is shared between them except the vocabulary types below.

mod nba;
mod nfl;

use strum_macros::Display;

use crate::config::{OpponentZonesTable, StatsConfig};

use super::{errors::StatsError, models::League, models::Unit};

/// A semantic question the warehouse can answer for some league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Dataset {
    PlayerLookup,
    TeamLookup,
    Teams,
    Roster,
    Scoreboard,
    PlayerHeadline,
    PlayerShootingSplits,
    PlayerRushing,
    PlayerPassing,
    PlayerReceiving,
    TeamDefense,
    TeamOffense,
    PlayerGameLog,
    TeamGameLog,
    RushingReceivingGameLog,
    PassingGameLog,
    ShotChart,
    PlayerShotZones,
    TeamShotZones,
    OpponentZones,
    PassingPlays,
    PropOdds,
    MoneylineOdds,
}

/// A physical table and the alias it is referenced by in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub table: &'static str,
    pub alias: &'static str,
}

impl Source {
    pub const fn new(table: &'static str, alias: &'static str) -> Self {
        Self { table, alias }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub source: Source,
    /// `(left alias, left column, right column)`; right columns belong to `source`
    pub on: &'static [(&'static str, &'static str, &'static str)],
    /// When set, the joined table is collapsed to one row per these columns before joining
    pub dedupe_on: Option<&'static [&'static str]>,
}

/// How a result column is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr {
    Column,
    /// Column with a fixed numeric fallback for rows the join did not reach
    Coalesce(i64),
    /// Whether the column is non-null (used to flag enrichment joins)
    Present,
    Count,
    /// Sum of a 0/1 (or boolean) flag column
    SumFlag,
}

impl Expr {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Expr::Count | Expr::SumFlag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    /// Semantic name; also the alias the column is selected as
    pub name: &'static str,
    pub source: &'static str,
    pub column: &'static str,
    pub expr: Expr,
    /// Set for metrics; plain fields have no unit
    pub unit: Option<Unit>,
    pub rank: Option<&'static str>,
    /// Sourced from an enrichment table that may not join
    pub enrichment: bool,
}

impl ColumnSpec {
    pub const fn field(name: &'static str, source: &'static str, column: &'static str) -> Self {
        Self {
            name,
            source,
            column,
            expr: Expr::Column,
            unit: None,
            rank: None,
            enrichment: false,
        }
    }

    pub const fn metric(name: &'static str, source: &'static str, column: &'static str, unit: Unit) -> Self {
        Self {
            unit: Some(unit),
            ..Self::field(name, source, column)
        }
    }

    pub const fn ranked(
        name: &'static str,
        source: &'static str,
        column: &'static str,
        rank: &'static str,
        unit: Unit,
    ) -> Self {
        Self {
            unit: Some(unit),
            rank: Some(rank),
            ..Self::field(name, source, column)
        }
    }

    pub const fn coalesce(name: &'static str, source: &'static str, column: &'static str, default: i64) -> Self {
        Self {
            expr: Expr::Coalesce(default),
            ..Self::field(name, source, column)
        }
    }

    pub const fn present(name: &'static str, source: &'static str, column: &'static str) -> Self {
        Self {
            expr: Expr::Present,
            ..Self::field(name, source, column)
        }
    }

    pub const fn count(name: &'static str) -> Self {
        Self {
            expr: Expr::Count,
            ..Self::field(name, "", "")
        }
    }

    pub const fn sum_flag(name: &'static str, source: &'static str, column: &'static str) -> Self {
        Self {
            expr: Expr::SumFlag,
            ..Self::field(name, source, column)
        }
    }

    pub const fn enrichment(self) -> Self {
        Self {
            enrichment: true,
            ..self
        }
    }

    pub fn is_metric(&self) -> bool {
        self.unit.is_some()
    }

    pub fn rank_alias(&self) -> String {
        format!("{}_rank", self.name)
    }
}

/// Caller-supplied values a dataset can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Filter {
    Subject,
    SubjectId,
    Season,
    Market,
    Book,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    Exact,
    IgnoreCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub filter: Filter,
    pub source: &'static str,
    pub column: &'static str,
    pub matching: Match,
}

impl FilterSpec {
    pub const fn exact(filter: Filter, source: &'static str, column: &'static str) -> Self {
        Self {
            filter,
            source,
            column,
            matching: Match::Exact,
        }
    }

    pub const fn ignore_case(filter: Filter, source: &'static str, column: &'static str) -> Self {
        Self {
            matching: Match::IgnoreCase,
            ..Self::exact(filter, source, column)
        }
    }
}

/// A fixed inclusive range a column must fall in, whatever the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub source: &'static str,
    pub column: &'static str,
    pub low: i64,
    pub high: i64,
}

impl RangeSpec {
    pub const fn new(source: &'static str, column: &'static str, low: i64, high: i64) -> Self {
        Self {
            source,
            column,
            low,
            high,
        }
    }
}

/// Ordering over selected output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderSpec {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetMapping {
    pub base: Source,
    pub joins: &'static [JoinSpec],
    pub columns: &'static [ColumnSpec],
    pub filters: &'static [FilterSpec],
    pub bounds: &'static [RangeSpec],
    pub order: &'static [OrderSpec],
    pub distinct: bool,
    /// Keeps only the first row (in `order`) per value of this column, ahead of any limit
    pub one_row_per: Option<&'static str>,
}

impl DatasetMapping {
    pub fn filter(&self, filter: Filter) -> Option<&'static FilterSpec> {
        self.filters.iter().find(|f| f.filter == filter)
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// The catalog entry for one `(league, dataset)` narrowed to the requested metrics.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub league: League,
    pub dataset: Dataset,
    pub mapping: DatasetMapping,
    pub columns: Vec<&'static ColumnSpec>,
}

impl Resolution {
    pub fn tables(&self) -> Vec<&'static str> {
        std::iter::once(self.mapping.base.table)
            .chain(self.mapping.joins.iter().map(|j| j.source.table))
            .collect()
    }

    pub fn join_keys(&self) -> Vec<(&'static str, &'static str)> {
        self.mapping
            .joins
            .iter()
            .flat_map(|j| j.on.iter().map(move |(_, left, right)| (*left, *right)))
            .collect()
    }
}

/// Per-league catalog, selected by league tag.
#[derive(Debug, Clone, Copy)]
pub enum LeagueCatalog {
    Nba { opponent_zones: OpponentZonesTable },
    Nfl,
}

impl LeagueCatalog {
    fn mapping(&self, dataset: Dataset) -> Option<DatasetMapping> {
        match self {
            LeagueCatalog::Nba { opponent_zones } => nba::mapping(dataset, *opponent_zones),
            LeagueCatalog::Nfl => nfl::mapping(dataset),
        }
    }

    /// Number of teams league-wide ranks are computed over.
    pub fn team_population(&self) -> u32 {
        match self {
            LeagueCatalog::Nba { .. } => nba::TEAM_COUNT,
            LeagueCatalog::Nfl => nfl::TEAM_COUNT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    nba: LeagueCatalog,
    nfl: LeagueCatalog,
}

impl Catalog {
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            nba: LeagueCatalog::Nba {
                opponent_zones: config.opponent_zones_table,
            },
            nfl: LeagueCatalog::Nfl,
        }
    }

    pub fn league(&self, league: League) -> &LeagueCatalog {
        match league {
            League::Nba => &self.nba,
            League::Nfl => &self.nfl,
        }
    }

    pub fn mapping(&self, league: League, dataset: Dataset) -> Result<DatasetMapping, StatsError> {
        self.league(league)
            .mapping(dataset)
            .ok_or_else(|| StatsError::UnknownEntity {
                league,
                entity: dataset.to_string(),
            })
    }

    /// Resolves a dataset, keeping every plain field and only the requested metrics.
    /// An empty metric set selects all metrics.
    pub fn resolve(&self, league: League, dataset: Dataset, metrics: &[&str]) -> Result<Resolution, StatsError> {
        let mapping = self.mapping(league, dataset)?;

        if let Some(unknown) = metrics
            .iter()
            .find(|m| !mapping.columns.iter().any(|c| c.is_metric() && c.name == **m))
        {
            return Err(StatsError::UnknownMetric {
                league,
                metric: unknown.to_string(),
            });
        }

        let columns = mapping
            .columns
            .iter()
            .filter(|c| !c.is_metric() || metrics.is_empty() || metrics.contains(&c.name))
            .collect();

        Ok(Resolution {
            league,
            dataset,
            mapping,
            columns,
        })
    }
}
