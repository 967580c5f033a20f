use tracing::{debug, instrument};

use super::{required, QueryContext, StatsService};
use crate::stats::catalog::{Dataset, Filter};
use crate::stats::errors::StatsError;
use crate::stats::mapper::{map_rows, FromRow};
use crate::stats::models::{
    EntityKey, League, MetricRecord, NflPassingGame, NflRosterPlayer, NflRushingReceivingGame, PassingPlay,
    PropLine, Season, TeamMatchup,
};
use crate::stats::query::QueryPlan;
use crate::stats::window::{self, GameRecord, WindowSize};

/// NFL questions. Tables are keyed by player or team name directly.
pub struct NflStats<'a> {
    service: &'a StatsService,
}

impl<'a> NflStats<'a> {
    pub(super) fn new(service: &'a StatsService) -> Self {
        Self { service }
    }

    #[instrument(skip(self, ctx))]
    pub async fn teams(&self, ctx: &QueryContext) -> Result<Vec<String>, StatsError> {
        let plan = QueryPlan::new(self.service.catalog.resolve(League::Nfl, Dataset::Teams, &[])?);
        let rows = self.service.fetch(ctx, "list", "NFL teams", &plan).await?;
        rows.iter().map(|row| row.get("team")).collect()
    }

    #[instrument(skip(self, ctx))]
    pub async fn roster(&self, ctx: &QueryContext, team: &str) -> Result<Vec<NflRosterPlayer>, StatsError> {
        let key = EntityKey::team(League::Nfl, team)?;
        let players: Vec<NflRosterPlayer> = self
            .service
            .list(ctx, League::Nfl, Dataset::Roster, Some(&key))
            .await?;
        if players.is_empty() {
            return Err(StatsError::NotFound(key.to_string()));
        }
        Ok(players)
    }

    #[instrument(skip(self, ctx))]
    pub async fn player_rushing(&self, ctx: &QueryContext, player: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::player(League::Nfl, player)?;
        self.service.metrics(ctx, Dataset::PlayerRushing, &key, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn player_passing(&self, ctx: &QueryContext, player: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::player(League::Nfl, player)?;
        self.service.metrics(ctx, Dataset::PlayerPassing, &key, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn player_receiving(&self, ctx: &QueryContext, player: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::player(League::Nfl, player)?;
        self.service.metrics(ctx, Dataset::PlayerReceiving, &key, &[]).await
    }

    /// Most recent rushing and receiving lines with snap counts where available.
    #[instrument(skip(self, ctx))]
    pub async fn rushing_receiving_games(
        &self,
        ctx: &QueryContext,
        player: &str,
        n: i64,
    ) -> Result<Vec<NflRushingReceivingGame>, StatsError> {
        let size = WindowSize::new(n)?;
        let key = EntityKey::player(League::Nfl, player)?;
        self.last_games(ctx, &key, Dataset::RushingReceivingGameLog, size)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn passing_games(
        &self,
        ctx: &QueryContext,
        player: &str,
        n: i64,
    ) -> Result<Vec<NflPassingGame>, StatsError> {
        let size = WindowSize::new(n)?;
        let key = EntityKey::player(League::Nfl, player)?;
        self.last_games(ctx, &key, Dataset::PassingGameLog, size).await
    }

    async fn last_games<T: FromRow + GameRecord>(
        &self,
        ctx: &QueryContext,
        key: &EntityKey,
        dataset: Dataset,
        size: WindowSize,
    ) -> Result<Vec<T>, StatsError> {
        let plan = QueryPlan::new(self.service.catalog.resolve(League::Nfl, dataset, &[])?)
            .filter(Filter::Subject, key.identifier.as_str())?
            .limit(size.get());
        let rows = self.service.fetch(ctx, "game_log", key, &plan).await?;
        if rows.is_empty() {
            // No games for a rostered player is a valid empty window
            self.service.ensure_exists(ctx, key).await?;
        }
        let games = window::apply(map_rows(&rows)?, size);
        debug!(key = %key, games = games.len(), "Game log window assembled");
        Ok(games)
    }

    #[instrument(skip(self, ctx))]
    pub async fn team_defense(&self, ctx: &QueryContext, team: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::team(League::Nfl, team)?;
        self.service.metrics(ctx, Dataset::TeamDefense, &key, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn team_offense(&self, ctx: &QueryContext, team: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::team(League::Nfl, team)?;
        self.service.metrics(ctx, Dataset::TeamOffense, &key, &[]).await
    }

    /// Every dropback for a passer in a season, in week order.
    #[instrument(skip(self, ctx))]
    pub async fn passing_plays(
        &self,
        ctx: &QueryContext,
        player: &str,
        season: &str,
    ) -> Result<Vec<PassingPlay>, StatsError> {
        let key = EntityKey::player(League::Nfl, player)?;
        let season = Season::parse(League::Nfl, required("season", season)?)?;
        let plan = QueryPlan::new(self.service.catalog.resolve(League::Nfl, Dataset::PassingPlays, &[])?)
            .filter(Filter::Subject, key.identifier.as_str())?
            .filter(Filter::Season, season.param())?;

        let rows = self.service.fetch(ctx, "passing_plays", &key, &plan).await?;
        if rows.is_empty() {
            self.service.ensure_exists(ctx, &key).await?;
        }
        map_rows(&rows)
    }

    #[instrument(skip(self, ctx))]
    pub async fn prop_odds(&self, ctx: &QueryContext, player: &str, market: &str) -> Result<Vec<PropLine>, StatsError> {
        let key = EntityKey::player(League::Nfl, player)?;
        let market = required("market", market)?;
        self.service.prop_lines(ctx, &key, market).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn team_matchup(&self, ctx: &QueryContext, team: &str, opponent: &str) -> Result<TeamMatchup, StatsError> {
        let (offense, defense) =
            futures::future::try_join(self.team_offense(ctx, team), self.team_defense(ctx, opponent)).await?;
        Ok(TeamMatchup { offense, defense })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use crate::shared::test_utils::ScriptedStore;
    use crate::stats::models::EnrichmentSource;
    use crate::stats::repository::{Row, SqlParam};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn service(store: &ScriptedStore) -> StatsService {
        StatsService::new(Arc::new(store.clone()), StatsConfig::default())
    }

    fn qb_game(game_id: &str, week: i64, snaps: Option<(i64, f64)>) -> Row {
        let (offense_snaps, pct) = snaps.unwrap_or((0, 0.0));
        Row::new()
            .with("game_id", game_id)
            .with("game_date", NaiveDate::from_ymd_opt(2024, 9, 1).unwrap() + chrono::Days::new(7 * week as u64))
            .with("game_week", week)
            .with("passing_attempts", 34i64)
            .with("completions", 23i64)
            .with("passing_yards", 262i64)
            .with("passing_touchdowns", 2i64)
            .with("interceptions", 0i64)
            .with("qb_rating", 108.4)
            .with("yards_per_pass_attempt", 7.7)
            .with("rushing_attempts", 6i64)
            .with("rushing_yards", 31i64)
            .with("yards_per_rush_attempt", 5.2)
            .with("rushing_touchdowns", 1i64)
            .with("long_rushing", 12i64)
            .with("offense_snaps", offense_snaps)
            .with("offense_snap_pct", pct)
            .with("snaps_joined", snaps.is_some())
    }

    #[tokio::test]
    async fn game_without_snap_counts_is_kept_and_flagged() {
        let store = ScriptedStore::new().on(
            "FROM nfl_data.nfl_qb_gamelog",
            vec![qb_game("2024_02_BUF_MIA", 2, None), qb_game("2024_01_ARI_BUF", 1, Some((68, 1.0)))],
        );

        let games = service(&store)
            .nfl()
            .passing_games(&QueryContext::new(), "Josh Allen", 5)
            .await
            .unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_week, 2);
        assert_eq!(games[0].snaps.source, EnrichmentSource::Defaulted);
        assert_eq!(games[0].snaps.offense_snaps, 0);
        assert_eq!(games[1].snaps.source, EnrichmentSource::Joined);
    }

    #[tokio::test]
    async fn unknown_passer_is_not_found_but_rostered_passer_without_plays_is_empty() {
        let store = ScriptedStore::new();
        let err = service(&store)
            .nfl()
            .passing_plays(&QueryContext::new(), "Nobody", "2024")
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let store = ScriptedStore::new().on(
            "FROM nfl_data.nfl_roster_db",
            vec![Row::new().with("subject", "Joe Milton").with("team", "Patriots")],
        );
        let plays = service(&store)
            .nfl()
            .passing_plays(&QueryContext::new(), "Joe Milton", "2024")
            .await
            .unwrap();
        assert!(plays.is_empty());
        assert_eq!(store.calls()[0].1, vec![SqlParam::from("Joe Milton"), SqlParam::Int(2024)]);
    }

    #[tokio::test]
    async fn nba_style_season_is_rejected() {
        let store = ScriptedStore::new();
        let err = service(&store)
            .nfl()
            .passing_plays(&QueryContext::new(), "Josh Allen", "2024-25")
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn defense_without_enrichment_lists_missing_metrics() {
        let mut row = Row::new().with("subject", "Carolina Panthers");
        for metric in [
            "rush_epa_allowed",
            "rush_success_rate_allowed",
            "dropback_epa_allowed",
            "dropback_success_rate_allowed",
        ] {
            row.push(metric, 0.1);
            row.push(&format!("{metric}_rank"), 32i64);
        }
        for metric in [
            "sack_rate",
            "epa_per_play_allowed",
            "success_rate_allowed",
            "adot",
            "scramble_rate",
            "int_rate",
            "explosive_play_rate_allowed",
            "pressure_rate",
            "blitz_rate",
            "man_rate",
            "zone_rate",
            "rush_stuff_rate",
            "yards_before_contact_per_rb_rush",
            "down_conversion_rate_allowed",
            "yards_per_play_allowed",
        ] {
            row.push(metric, None::<f64>);
            row.push(&format!("{metric}_rank"), None::<i64>);
        }
        let store = ScriptedStore::new().on("FROM nfl_data.nfl_team_defensive_stats_db", vec![row]);

        let record = service(&store)
            .nfl()
            .team_defense(&QueryContext::new(), "Carolina Panthers")
            .await
            .unwrap();

        assert_eq!(record.metrics.len(), 4);
        assert_eq!(record.missing.len(), 15);
        assert_eq!(record.rank("rush_epa_allowed"), Some(32));
        assert_eq!(record.get("rush_epa_allowed").unwrap().out_of, Some(32));
    }

    #[tokio::test]
    async fn empty_market_is_invalid() {
        let store = ScriptedStore::new();
        let err = service(&store)
            .nfl()
            .prop_odds(&QueryContext::new(), "Josh Allen", "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument(msg) if msg.contains("market")));
    }
}
