use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::models::Snapshot;

/// Which of two snapshots sharing the maximal `observed_at` is current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SnapshotTieBreak {
    #[default]
    LowestRowId,
    HighestRowId,
}

impl SnapshotTieBreak {
    fn prefers(&self, candidate: i64, current: i64) -> bool {
        match self {
            SnapshotTieBreak::LowestRowId => candidate < current,
            SnapshotTieBreak::HighestRowId => candidate > current,
        }
    }
}

/// Sportsbooks whose quotes are considered. An empty list admits every book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAllowList(Vec<String>);

impl BookAllowList {
    pub fn new<I, S>(books: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(books.into_iter().map(Into::into).collect())
    }

    pub fn books(&self) -> &[String] {
        &self.0
    }

    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    pub fn permits(&self, book: &str) -> bool {
        self.is_unrestricted() || self.0.iter().any(|b| b == book)
    }
}

/// Keeps exactly one snapshot per `(subject, book, market)`: the latest one.
///
/// Books outside the allow-list are dropped before grouping, so a disallowed book can never
/// shadow the latest allowed quote. Output is ordered by key.
pub fn select_current<T>(
    snapshots: impl IntoIterator<Item = Snapshot<T>>,
    allow: &BookAllowList,
    tie_break: SnapshotTieBreak,
) -> Vec<Snapshot<T>> {
    let mut current: BTreeMap<(String, String, String), Snapshot<T>> = BTreeMap::new();

    for snapshot in snapshots.into_iter().filter(|s| allow.permits(&s.book)) {
        let key = (
            snapshot.subject.clone(),
            snapshot.book.clone(),
            snapshot.market.clone(),
        );
        match current.get(&key) {
            Some(held)
                if held.observed_at > snapshot.observed_at
                    || (held.observed_at == snapshot.observed_at
                        && !tie_break.prefers(snapshot.row_id, held.row_id)) => {}
            _ => {
                current.insert(key, snapshot);
            }
        }
    }

    current.into_values().collect()
}
