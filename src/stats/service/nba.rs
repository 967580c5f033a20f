use tracing::{debug, info, instrument};

use super::{id_text, required, QueryContext, StatsService};
use crate::stats::catalog::{Dataset, Filter};
use crate::stats::errors::StatsError;
use crate::stats::mapper::{map_rows, FromRow};
use crate::stats::models::{
    EntityKey, League, MatchPolicy, MetricRecord, MoneylineQuote, NbaPlayerGame, NbaRosterPlayer, NbaTeam, NbaTeamGame,
    OpponentZones, PropLine, ScoreboardGame, ShotChart, ShotPoint, ShotZones, TeamMatchup, ZoneStat,
};
use crate::stats::query::QueryPlan;
use crate::stats::snapshot::select_current;
use crate::stats::window::{self, GameRecord, WindowSize};
use crate::stats::zones::{rank_population, tally, ShotEvent, ZoneCount};

/// NBA questions. Stats tables are keyed by player or team id, so most operations resolve the
/// caller's name first and report an unknown name as `NotFound`.
pub struct NbaStats<'a> {
    service: &'a StatsService,
}

impl<'a> NbaStats<'a> {
    pub(super) fn new(service: &'a StatsService) -> Self {
        Self { service }
    }

    #[instrument(skip(self, ctx))]
    pub async fn teams(&self, ctx: &QueryContext) -> Result<Vec<NbaTeam>, StatsError> {
        self.service.list(ctx, League::Nba, Dataset::Teams, None).await
    }

    /// Players on a team, by team city as stored in the roster table.
    #[instrument(skip(self, ctx))]
    pub async fn roster(&self, ctx: &QueryContext, team: &str) -> Result<Vec<NbaRosterPlayer>, StatsError> {
        let key = EntityKey::team(League::Nba, team)?;
        let players: Vec<NbaRosterPlayer> = self
            .service
            .list(ctx, League::Nba, Dataset::Roster, Some(&key))
            .await?;
        if players.is_empty() {
            return Err(StatsError::NotFound(key.to_string()));
        }
        Ok(players)
    }

    #[instrument(skip(self, ctx))]
    pub async fn scoreboard(&self, ctx: &QueryContext) -> Result<Vec<ScoreboardGame>, StatsError> {
        self.service.list(ctx, League::Nba, Dataset::Scoreboard, None).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn player_last_games(
        &self,
        ctx: &QueryContext,
        player: &str,
        n: i64,
    ) -> Result<Vec<NbaPlayerGame>, StatsError> {
        let size = WindowSize::new(n)?;
        let key = EntityKey::player(League::Nba, player)?;
        self.last_games(ctx, &key, Dataset::PlayerGameLog, size).await
    }

    /// Most recent games for a team city, the same key `teams` lists and `roster` takes.
    #[instrument(skip(self, ctx))]
    pub async fn team_last_games(&self, ctx: &QueryContext, team: &str, n: i64) -> Result<Vec<NbaTeamGame>, StatsError> {
        let size = WindowSize::new(n)?;
        let key = EntityKey::team(League::Nba, team)?;
        let games: Vec<NbaTeamGame> = self.last_games(ctx, &key, Dataset::TeamGameLog, size).await?;
        if games.is_empty() {
            // An empty window is only valid for a city on the roster
            self.roster(ctx, team).await?;
        }
        Ok(games)
    }

    async fn last_games<T: FromRow + GameRecord>(
        &self,
        ctx: &QueryContext,
        key: &EntityKey,
        dataset: Dataset,
        size: WindowSize,
    ) -> Result<Vec<T>, StatsError> {
        let resolution = self.service.catalog.resolve(League::Nba, dataset, &[])?;
        let plan = self
            .service
            .subject_plan(ctx, resolution, key)
            .await?
            .limit(size.get());
        let rows = self.service.fetch(ctx, "game_log", key, &plan).await?;
        let games = window::apply(map_rows(&rows)?, size);
        debug!(key = %key, games = games.len(), "Game log window assembled");
        Ok(games)
    }

    #[instrument(skip(self, ctx))]
    pub async fn team_defense(&self, ctx: &QueryContext, team: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::team(League::Nba, team)?;
        self.service.metrics(ctx, Dataset::TeamDefense, &key, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn team_offense(&self, ctx: &QueryContext, team: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::team(League::Nba, team)?;
        self.service.metrics(ctx, Dataset::TeamOffense, &key, &[]).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn player_shooting_splits(&self, ctx: &QueryContext, player: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::player(League::Nba, player)?;
        self.service
            .metrics(ctx, Dataset::PlayerShootingSplits, &key, &[])
            .await
    }

    /// Points, assists and rebounds per game.
    #[instrument(skip(self, ctx))]
    pub async fn player_headline(&self, ctx: &QueryContext, player: &str) -> Result<MetricRecord, StatsError> {
        let key = EntityKey::player(League::Nba, player)?;
        self.service.metrics(ctx, Dataset::PlayerHeadline, &key, &[]).await
    }

    /// Every shot the player took in a season with the opponent it came against.
    #[instrument(skip(self, ctx))]
    pub async fn player_shot_chart(
        &self,
        ctx: &QueryContext,
        player: &str,
        season: Option<&str>,
    ) -> Result<ShotChart, StatsError> {
        let key = EntityKey::player(League::Nba, player)?;
        let season = self.service.nba_season(season)?;
        let resolution = self.service.catalog.resolve(League::Nba, Dataset::ShotChart, &[])?;
        let plan = self
            .service
            .subject_plan(ctx, resolution, &key)
            .await?
            .filter(Filter::Season, season.param())?;

        let rows = self.service.fetch(ctx, "shot_chart", &key, &plan).await?;
        let shots: Vec<ShotPoint> = map_rows(&rows)?;
        let zones = tally(shots.iter().map(|s| ShotEvent {
            zone: s.zone.clone(),
            made: s.made,
        }));

        info!(key = %key, season = %season, shots = shots.len(), "Shot chart loaded");
        Ok(ShotChart {
            player: key.identifier,
            season: season.label(),
            shots,
            zones,
        })
    }

    /// Per-zone shooting for one player, ranked against every player that season.
    #[instrument(skip(self, ctx))]
    pub async fn player_shot_zones(
        &self,
        ctx: &QueryContext,
        player: &str,
        season: Option<&str>,
    ) -> Result<ShotZones, StatsError> {
        let key = EntityKey::player(League::Nba, player)?;
        self.shot_zones(ctx, key, Dataset::PlayerShotZones, season).await
    }

    /// Per-zone shooting for one team, ranked against the league that season.
    #[instrument(skip(self, ctx))]
    pub async fn team_shot_zones(
        &self,
        ctx: &QueryContext,
        team: &str,
        season: Option<&str>,
    ) -> Result<ShotZones, StatsError> {
        let key = EntityKey::team(League::Nba, team)?;
        self.shot_zones(ctx, key, Dataset::TeamShotZones, season).await
    }

    async fn shot_zones(
        &self,
        ctx: &QueryContext,
        key: EntityKey,
        dataset: Dataset,
        season: Option<&str>,
    ) -> Result<ShotZones, StatsError> {
        let season = self.service.nba_season(season)?;
        let subject_id = id_text(&self.service.resolve_id(ctx, &key, MatchPolicy::First).await?);

        // The whole season's population is needed to rank the subject
        let plan = QueryPlan::new(self.service.catalog.resolve(League::Nba, dataset, &[])?)
            .filter(Filter::Season, season.param())?;
        let rows = self.service.fetch(ctx, "shot_zones", &key, &plan).await?;
        let counts: Vec<ZoneCount> = map_rows(&rows)?;
        let zones = rank_population(&counts, &subject_id);

        debug!(
            key = %key,
            population_rows = counts.len(),
            zones = zones.len(),
            "Shot zones ranked"
        );
        Ok(ShotZones {
            subject: key.identifier,
            season: season.label(),
            zones,
        })
    }

    /// Opponent shooting by zone, already aggregated and ranked upstream.
    #[instrument(skip(self, ctx))]
    pub async fn opponent_zones(
        &self,
        ctx: &QueryContext,
        team_abbr: &str,
        season: Option<&str>,
    ) -> Result<OpponentZones, StatsError> {
        let key = EntityKey::team(League::Nba, team_abbr)?;
        let season = self.service.nba_season(season)?;
        let plan = QueryPlan::new(self.service.catalog.resolve(League::Nba, Dataset::OpponentZones, &[])?)
            .filter(Filter::Season, season.param())?
            .filter(Filter::Subject, key.identifier.as_str())?;

        let rows = self.service.fetch(ctx, "opponent_zones", &key, &plan).await?;
        if rows.is_empty() {
            return Err(StatsError::NotFound(format!("no opponent zones for {key} in {season}")));
        }
        let zones = rows
            .iter()
            .map(|row| ZoneStat::from_row(row).map(|z| (z.zone.clone(), z)))
            .collect::<Result<_, _>>()?;

        Ok(OpponentZones {
            team: key.identifier,
            season: season.label(),
            zones,
        })
    }

    /// Current player prop lines, one per book. No quotes is an empty list, not an error.
    #[instrument(skip(self, ctx))]
    pub async fn prop_odds(&self, ctx: &QueryContext, player: &str, market: &str) -> Result<Vec<PropLine>, StatsError> {
        let key = EntityKey::player(League::Nba, player)?;
        let market = required("market", market)?;
        self.service.prop_lines(ctx, &key, market).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn moneyline_odds(&self, ctx: &QueryContext, team: &str) -> Result<Vec<MoneylineQuote>, StatsError> {
        let key = EntityKey::team(League::Nba, team)?;
        let config = &self.service.config;

        let mut plan = QueryPlan::new(self.service.catalog.resolve(League::Nba, Dataset::MoneylineOdds, &[])?)
            .filter(Filter::Subject, key.identifier.as_str())?;
        if !config.sportsbooks.is_unrestricted() {
            plan = plan.filter_in(Filter::Book, config.sportsbooks.books().iter().map(String::as_str))?;
        }

        let rows = self.service.fetch(ctx, "moneyline_odds", &key, &plan).await?;
        let quotes: Vec<MoneylineQuote> = map_rows(&rows)?;
        Ok(select_current(quotes, &config.sportsbooks, config.snapshot_tie_break))
    }

    /// Team offense next to the opponent's defense, fetched concurrently.
    #[instrument(skip(self, ctx))]
    pub async fn team_matchup(&self, ctx: &QueryContext, team: &str, opponent: &str) -> Result<TeamMatchup, StatsError> {
        let (offense, defense) =
            futures::future::try_join(self.team_offense(ctx, team), self.team_defense(ctx, opponent)).await?;
        Ok(TeamMatchup { offense, defense })
    }
}
