use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use pickem_core::{GameId, GameOutcome, TeamAbbrev, Week};

use crate::{ServiceError, ServiceResult};

/// One game row of a season schedule. Scores stay `None` until the
/// external source reports them; there is no partial-score state.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledGame {
    pub game_id: GameId,
    pub season: i32,
    pub week: Week,
    pub away_team: TeamAbbrev,
    pub home_team: TeamAbbrev,
    pub kickoff: DateTime<Utc>,
    pub weekday: String,
    pub gametime: String,
    pub stadium: String,
    pub away_rest: i32,
    pub home_rest: i32,
    pub spread_line: f64,
    pub away_score: Option<i64>,
    pub home_score: Option<i64>,
}

impl ScheduledGame {
    pub fn is_finished(&self) -> bool {
        self.away_score.is_some() && self.home_score.is_some()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match (self.away_score, self.home_score) {
            (Some(away), Some(home)) => Some(GameOutcome::from_scores(
                &self.away_team,
                away,
                &self.home_team,
                home,
            )),
            _ => None,
        }
    }

    pub fn has_team(&self, team: &str) -> bool {
        self.away_team == team || self.home_team == team
    }

    pub fn has_kicked_off(&self, now: DateTime<Utc>) -> bool {
        self.kickoff <= now
    }
}

pub type ArcScheduleRepository = Arc<Box<dyn ScheduleRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait ScheduleRepository {
    async fn upsert_games(&self, games: &[ScheduledGame]) -> ServiceResult<usize>;
    async fn season_schedule(&self, season: i32) -> ServiceResult<Vec<ScheduledGame>>;
    async fn week_schedule(&self, season: i32, week: Week) -> ServiceResult<Vec<ScheduledGame>>;
    async fn finished_games(&self, season: i32) -> ServiceResult<Vec<ScheduledGame>>;
    async fn week_game_counts(&self, season: i32) -> ServiceResult<Vec<(Week, u32)>>;
}

pub type ArcScheduleService = Arc<Box<dyn ScheduleService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait ScheduleService {
    async fn ingest_games(&self, games: Vec<ScheduledGame>) -> ServiceResult<usize>;
    async fn week_schedule(&self, season: i32, week: Week) -> ServiceResult<Vec<ScheduledGame>>;
    async fn current_week(&self, season: i32, now: DateTime<Utc>) -> ServiceResult<Week>;
}

pub struct ScheduleServiceImpl {
    schedule_repository: ArcScheduleRepository,
}

impl ScheduleServiceImpl {
    pub fn new(schedule_repository: ArcScheduleRepository) -> Self {
        Self {
            schedule_repository,
        }
    }
}

#[async_trait::async_trait]
impl ScheduleService for ScheduleServiceImpl {
    async fn ingest_games(&self, games: Vec<ScheduledGame>) -> ServiceResult<usize> {
        for game in &games {
            if game.away_score.is_some() != game.home_score.is_some() {
                return ServiceError::unavailable(format!(
                    "Malformed schedule row for game {}: only one score present",
                    game.game_id
                ));
            }
            if game.week == 0 || game.away_team.is_empty() || game.home_team.is_empty() {
                return ServiceError::unavailable(format!(
                    "Malformed schedule row for game {}",
                    game.game_id
                ));
            }
        }
        let applied = self.schedule_repository.upsert_games(&games).await?;
        info!("Ingested {} schedule rows", applied);
        Ok(applied)
    }

    async fn week_schedule(&self, season: i32, week: Week) -> ServiceResult<Vec<ScheduledGame>> {
        self.schedule_repository.week_schedule(season, week).await
    }

    async fn current_week(&self, season: i32, now: DateTime<Utc>) -> ServiceResult<Week> {
        let schedule = self.schedule_repository.season_schedule(season).await?;
        let week = schedule
            .iter()
            .filter(|game| game.kickoff.date_naive() <= now.date_naive())
            .map(|game| game.week)
            .max()
            .unwrap_or(1);
        Ok(week)
    }
}

#[derive(Default, Clone)]
pub struct MockScheduleRepository {
    games: Arc<std::sync::Mutex<Vec<ScheduledGame>>>,
}

#[async_trait::async_trait]
impl ScheduleRepository for MockScheduleRepository {
    async fn upsert_games(&self, games: &[ScheduledGame]) -> ServiceResult<usize> {
        let mut stored = self.games.lock().expect("Failed to lock mock games");
        for game in games {
            if let Some(existing) = stored.iter_mut().find(|g| g.game_id == game.game_id) {
                *existing = game.clone();
            } else {
                stored.push(game.clone());
            }
        }
        Ok(games.len())
    }

    async fn season_schedule(&self, season: i32) -> ServiceResult<Vec<ScheduledGame>> {
        let stored = self.games.lock().expect("Failed to lock mock games");
        Ok(stored.iter().filter(|g| g.season == season).cloned().collect())
    }

    async fn week_schedule(&self, season: i32, week: Week) -> ServiceResult<Vec<ScheduledGame>> {
        let stored = self.games.lock().expect("Failed to lock mock games");
        let mut games: Vec<ScheduledGame> = stored
            .iter()
            .filter(|g| g.season == season && g.week == week)
            .cloned()
            .collect();
        games.sort_by_key(|g| g.kickoff);
        Ok(games)
    }

    async fn finished_games(&self, season: i32) -> ServiceResult<Vec<ScheduledGame>> {
        let stored = self.games.lock().expect("Failed to lock mock games");
        Ok(stored
            .iter()
            .filter(|g| g.season == season && g.is_finished())
            .cloned()
            .collect())
    }

    async fn week_game_counts(&self, season: i32) -> ServiceResult<Vec<(Week, u32)>> {
        let stored = self.games.lock().expect("Failed to lock mock games");
        let mut counts = std::collections::BTreeMap::new();
        for game in stored.iter().filter(|g| g.season == season) {
            *counts.entry(game.week).or_insert(0u32) += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_game(
        game_id: &str,
        week: Week,
        away_team: &str,
        home_team: &str,
        kickoff: DateTime<Utc>,
        scores: Option<(i64, i64)>,
    ) -> ScheduledGame {
        ScheduledGame {
            game_id: game_id.to_string(),
            season: 2022,
            week,
            away_team: away_team.to_string(),
            home_team: home_team.to_string(),
            kickoff,
            weekday: "Sunday".to_string(),
            gametime: "13:00".to_string(),
            stadium: "Stadium".to_string(),
            away_rest: 7,
            home_rest: 7,
            spread_line: -1.5,
            away_score: scores.map(|(away, _)| away),
            home_score: scores.map(|(_, home)| home),
        }
    }

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 9, n, 17, 0, 0).unwrap()
    }

    #[test]
    fn test_outcome_requires_both_scores() {
        let unplayed = make_game("g1", 1, "BUF", "LA", day(8), None);
        assert!(!unplayed.is_finished());
        assert_eq!(unplayed.outcome(), None);

        let played = make_game("g1", 1, "BUF", "LA", day(8), Some((31, 10)));
        assert!(played.is_finished());
        assert_eq!(
            played.outcome(),
            Some(GameOutcome::Winner("BUF".to_string()))
        );
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent() {
        let repo = MockScheduleRepository::default();
        let service = ScheduleServiceImpl::new(Arc::new(Box::new(repo.clone())));

        let games = vec![
            make_game("g1", 1, "BUF", "LA", day(8), None),
            make_game("g2", 1, "NO", "ATL", day(11), None),
        ];
        service.ingest_games(games.clone()).await.expect("Failed to ingest");
        service.ingest_games(games).await.expect("Failed to ingest");

        assert_eq!(repo.season_schedule(2022).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_rejects_partial_scores() {
        let service =
            ScheduleServiceImpl::new(Arc::new(Box::new(MockScheduleRepository::default())));
        let mut game = make_game("g1", 1, "BUF", "LA", day(8), Some((31, 10)));
        game.home_score = None;
        assert!(matches!(
            service.ingest_games(vec![game]).await,
            Err(ServiceError::Unavailable(..))
        ));
    }

    #[tokio::test]
    async fn test_current_week_is_latest_started_week() {
        let repo = MockScheduleRepository::default();
        repo.upsert_games(&[
            make_game("g1", 1, "BUF", "LA", day(8), Some((31, 10))),
            make_game("g2", 2, "NO", "ATL", day(18), None),
            make_game("g3", 3, "KC", "TB", day(25), None),
        ])
        .await
        .unwrap();
        let service = ScheduleServiceImpl::new(Arc::new(Box::new(repo)));

        let week = service.current_week(2022, day(19)).await.unwrap();
        assert_eq!(week, 2);
    }

    #[tokio::test]
    async fn test_current_week_defaults_to_one_before_season() {
        let repo = MockScheduleRepository::default();
        repo.upsert_games(&[make_game("g1", 1, "BUF", "LA", day(8), None)])
            .await
            .unwrap();
        let service = ScheduleServiceImpl::new(Arc::new(Box::new(repo)));

        let week = service.current_week(2022, day(1)).await.unwrap();
        assert_eq!(week, 1);
    }
}
