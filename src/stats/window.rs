use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;

use super::errors::StatsError;
use super::models::{NbaPlayerGame, NbaTeamGame, NflPassingGame, NflRushingReceivingGame};

/// Number of most recent games to return; always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize(usize);

impl WindowSize {
    pub fn new(n: i64) -> Result<Self, StatsError> {
        if n <= 0 {
            return Err(StatsError::invalid(format!("window size must be positive, got {n}")));
        }
        usize::try_from(n)
            .map(Self)
            .map_err(|_| StatsError::invalid(format!("window size {n} is too large")))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

/// A per-game row that can be ordered by recency.
pub trait GameRecord {
    fn game_id(&self) -> &str;
    fn game_date(&self) -> NaiveDate;
}

macro_rules! game_record {
    ($($ty:ty),* $(,)?) => {
        $(impl GameRecord for $ty {
            fn game_id(&self) -> &str {
                &self.game_id
            }

            fn game_date(&self) -> NaiveDate {
                self.game_date
            }
        })*
    };
}

game_record!(NbaPlayerGame, NbaTeamGame, NflRushingReceivingGame, NflPassingGame);

/// Numeric ids compare as numbers so `"10"` is newer than `"9"`.
fn cmp_game_id(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Most recent first, game id breaking ties, each game once, at most `size` entries.
pub fn apply<T: GameRecord>(mut games: Vec<T>, size: WindowSize) -> Vec<T> {
    games.sort_by(|a, b| {
        b.game_date()
            .cmp(&a.game_date())
            .then_with(|| cmp_game_id(b.game_id(), a.game_id()))
    });

    let mut seen = HashSet::new();
    games.retain(|g| seen.insert(g.game_id().to_string()));
    games.truncate(size.get());
    games
}
