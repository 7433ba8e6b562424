use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use log::warn;
use pickem_core::{GameId, Week};

use crate::{
    ServiceResult,
    picks::ArcPickRepository,
    schedule::{ArcScheduleRepository, ScheduledGame},
    user::UserId,
};

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredPick {
    pub user_id: UserId,
    pub game_id: GameId,
    pub season: i32,
    pub week: Week,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekSummary {
    pub week: Week,
    pub correct_picks: u32,
    pub finished_games: u32,
}

pub type ArcScoredPickRepository = Arc<Box<dyn ScoredPickRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait ScoredPickRepository {
    /// Keyed on (user, game); re-scoring must never append duplicates.
    async fn upsert_scored_picks(&self, scored: &[ScoredPick]) -> ServiceResult<()>;
    /// Rows ordered by user id, then game id.
    async fn scored_picks(&self, season: i32, user: Option<UserId>)
    -> ServiceResult<Vec<ScoredPick>>;
}

pub type ArcScoringService = Arc<Box<dyn ScoringService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait ScoringService {
    async fn score_season(&self, season: i32) -> ServiceResult<usize>;
    async fn week_summary(&self, user_id: UserId, season: i32, week: Week)
    -> ServiceResult<WeekSummary>;
}

pub struct ScoringServiceImpl {
    schedule_repository: ArcScheduleRepository,
    pick_repository: ArcPickRepository,
    scored_pick_repository: ArcScoredPickRepository,
}

impl ScoringServiceImpl {
    pub fn new(
        schedule_repository: ArcScheduleRepository,
        pick_repository: ArcPickRepository,
        scored_pick_repository: ArcScoredPickRepository,
    ) -> Self {
        Self {
            schedule_repository,
            pick_repository,
            scored_pick_repository,
        }
    }
}

#[async_trait::async_trait]
impl ScoringService for ScoringServiceImpl {
    /// Joins finished games with stored picks and upserts one scored pick
    /// per match. Unfinished games are excluded, picks referencing unknown
    /// games are skipped, and ties count every pick as incorrect.
    async fn score_season(&self, season: i32) -> ServiceResult<usize> {
        let finished = self.schedule_repository.finished_games(season).await?;
        let finished_by_id: HashMap<&GameId, &ScheduledGame> =
            finished.iter().map(|game| (&game.game_id, game)).collect();
        let known_ids: HashSet<GameId> = self
            .schedule_repository
            .season_schedule(season)
            .await?
            .into_iter()
            .map(|game| game.game_id)
            .collect();

        let picks = self.pick_repository.all_picks().await?;
        let mut scored = Vec::new();
        for pick in &picks {
            let Some(game) = finished_by_id.get(&pick.game_id) else {
                if !known_ids.contains(&pick.game_id) {
                    warn!(
                        "Pick by user {} references unknown game {}, skipping",
                        pick.user_id, pick.game_id
                    );
                }
                continue;
            };
            let Some(outcome) = game.outcome() else {
                continue;
            };
            scored.push(ScoredPick {
                user_id: pick.user_id,
                game_id: pick.game_id.clone(),
                season,
                week: game.week,
                correct: outcome.matches_pick(&pick.picked_team),
            });
        }

        self.scored_pick_repository
            .upsert_scored_picks(&scored)
            .await?;
        Ok(scored.len())
    }

    async fn week_summary(
        &self,
        user_id: UserId,
        season: i32,
        week: Week,
    ) -> ServiceResult<WeekSummary> {
        self.score_season(season).await?;
        let scored = self
            .scored_pick_repository
            .scored_picks(season, Some(user_id))
            .await?;
        let correct_picks = scored
            .iter()
            .filter(|s| s.week == week && s.correct)
            .count() as u32;
        let finished_games = self
            .schedule_repository
            .finished_games(season)
            .await?
            .iter()
            .filter(|game| game.week == week)
            .count() as u32;
        Ok(WeekSummary {
            week,
            correct_picks,
            finished_games,
        })
    }
}

#[derive(Default, Clone)]
pub struct MockScoredPickRepository {
    scored: Arc<std::sync::Mutex<Vec<ScoredPick>>>,
}

#[async_trait::async_trait]
impl ScoredPickRepository for MockScoredPickRepository {
    async fn upsert_scored_picks(&self, scored: &[ScoredPick]) -> ServiceResult<()> {
        let mut stored = self.scored.lock().expect("Failed to lock mock scored picks");
        for pick in scored {
            if let Some(existing) = stored
                .iter_mut()
                .find(|s| s.user_id == pick.user_id && s.game_id == pick.game_id)
            {
                *existing = pick.clone();
            } else {
                stored.push(pick.clone());
            }
        }
        Ok(())
    }

    async fn scored_picks(
        &self,
        season: i32,
        user: Option<UserId>,
    ) -> ServiceResult<Vec<ScoredPick>> {
        let stored = self.scored.lock().expect("Failed to lock mock scored picks");
        let mut rows: Vec<ScoredPick> = stored
            .iter()
            .filter(|s| s.season == season && user.is_none_or(|id| s.user_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.user_id, &a.game_id).cmp(&(b.user_id, &b.game_id)));
        Ok(rows)
    }
}
