use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use log::info;
use pickem_core::{GameId, TeamAbbrev, Week};

use crate::{
    ServiceError, ServiceResult,
    schedule::ArcScheduleRepository,
    user::UserId,
};

/// At most one chosen team per game, by construction.
pub type PickSelection = BTreeMap<GameId, TeamAbbrev>;

#[derive(Clone, Debug, PartialEq)]
pub struct Pick {
    pub user_id: UserId,
    pub game_id: GameId,
    pub picked_team: TeamAbbrev,
    pub submitted_at: DateTime<Utc>,
}

pub type ArcPickRepository = Arc<Box<dyn PickRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PickRepository {
    async fn picks_of_user(&self, user_id: UserId) -> ServiceResult<Vec<Pick>>;
    async fn all_picks(&self) -> ServiceResult<Vec<Pick>>;
    async fn upsert_pick(&self, pick: &Pick) -> ServiceResult<()>;
}

pub type ArcPickService = Arc<Box<dyn PickService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PickService {
    async fn submit_picks(
        &self,
        user_id: UserId,
        season: i32,
        week: Week,
        selection: &PickSelection,
        now: DateTime<Utc>,
    ) -> ServiceResult<usize>;
    async fn picks_of_user(&self, user_id: UserId) -> ServiceResult<Vec<Pick>>;
}

pub struct PickServiceImpl {
    schedule_repository: ArcScheduleRepository,
    pick_repository: ArcPickRepository,
}

impl PickServiceImpl {
    pub fn new(
        schedule_repository: ArcScheduleRepository,
        pick_repository: ArcPickRepository,
    ) -> Self {
        Self {
            schedule_repository,
            pick_repository,
        }
    }
}

#[async_trait::async_trait]
impl PickService for PickServiceImpl {
    /// Applies the selection one game at a time: insert when no pick is
    /// stored, skip when the stored pick is unchanged, overwrite team and
    /// timestamp when it differs. Returns the number of writes.
    async fn submit_picks(
        &self,
        user_id: UserId,
        season: i32,
        week: Week,
        selection: &PickSelection,
        now: DateTime<Utc>,
    ) -> ServiceResult<usize> {
        let schedule = self.schedule_repository.week_schedule(season, week).await?;

        for (game_id, picked_team) in selection {
            let Some(game) = schedule.iter().find(|g| &g.game_id == game_id) else {
                return ServiceError::bad_request(format!(
                    "Game {} is not on the week {} schedule",
                    game_id, week
                ));
            };
            if !game.has_team(picked_team) {
                return ServiceError::bad_request(format!(
                    "{} is not playing in game {}",
                    picked_team, game_id
                ));
            }
            if game.has_kicked_off(now) {
                return ServiceError::not_possible(format!(
                    "Game {} has started, picks are closed",
                    game_id
                ));
            }
        }

        let current: BTreeMap<GameId, Pick> = self
            .pick_repository
            .picks_of_user(user_id)
            .await?
            .into_iter()
            .map(|pick| (pick.game_id.clone(), pick))
            .collect();

        let mut written = 0;
        for (game_id, picked_team) in selection {
            match current.get(game_id) {
                Some(existing) if &existing.picked_team == picked_team => continue,
                _ => {}
            }
            self.pick_repository
                .upsert_pick(&Pick {
                    user_id,
                    game_id: game_id.clone(),
                    picked_team: picked_team.clone(),
                    submitted_at: now,
                })
                .await?;
            written += 1;
        }

        info!(
            "User {} submitted {} picks for week {} ({} written)",
            user_id,
            selection.len(),
            week,
            written
        );
        Ok(written)
    }

    async fn picks_of_user(&self, user_id: UserId) -> ServiceResult<Vec<Pick>> {
        self.pick_repository.picks_of_user(user_id).await
    }
}

#[derive(Default, Clone)]
pub struct MockPickRepository {
    picks: Arc<std::sync::Mutex<Vec<Pick>>>,
    writes: Arc<std::sync::Mutex<usize>>,
}

impl MockPickRepository {
    pub fn write_count(&self) -> usize {
        *self.writes.lock().expect("Failed to lock write count")
    }
}

#[async_trait::async_trait]
impl PickRepository for MockPickRepository {
    async fn picks_of_user(&self, user_id: UserId) -> ServiceResult<Vec<Pick>> {
        let picks = self.picks.lock().expect("Failed to lock mock picks");
        Ok(picks.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn all_picks(&self) -> ServiceResult<Vec<Pick>> {
        let picks = self.picks.lock().expect("Failed to lock mock picks");
        Ok(picks.clone())
    }

    async fn upsert_pick(&self, pick: &Pick) -> ServiceResult<()> {
        let mut picks = self.picks.lock().expect("Failed to lock mock picks");
        if let Some(existing) = picks
            .iter_mut()
            .find(|p| p.user_id == pick.user_id && p.game_id == pick.game_id)
        {
            *existing = pick.clone();
        } else {
            picks.push(pick.clone());
        }
        *self.writes.lock().expect("Failed to lock write count") += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{MockScheduleRepository, ScheduleRepository, ScheduledGame};
    use chrono::TimeZone;

    fn make_game(game_id: &str, away_team: &str, home_team: &str) -> ScheduledGame {
        ScheduledGame {
            game_id: game_id.to_string(),
            season: 2022,
            week: 1,
            away_team: away_team.to_string(),
            home_team: home_team.to_string(),
            kickoff: Utc.with_ymd_and_hms(2022, 9, 11, 17, 0, 0).unwrap(),
            weekday: "Sunday".to_string(),
            gametime: "13:00".to_string(),
            stadium: "Stadium".to_string(),
            away_rest: 7,
            home_rest: 7,
            spread_line: -1.5,
            away_score: None,
            home_score: None,
        }
    }

    fn before_kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 9, 10, 12, 0, 0).unwrap()
    }

    async fn make_service() -> (PickServiceImpl, MockPickRepository) {
        let schedule_repo = MockScheduleRepository::default();
        schedule_repo
            .upsert_games(&[make_game("g1", "BUF", "LA"), make_game("g2", "NO", "ATL")])
            .await
            .unwrap();
        let pick_repo = MockPickRepository::default();
        let service = PickServiceImpl::new(
            Arc::new(Box::new(schedule_repo)),
            Arc::new(Box::new(pick_repo.clone())),
        );
        (service, pick_repo)
    }

    #[tokio::test]
    async fn test_resubmitting_same_team_is_a_no_op() {
        let (service, pick_repo) = make_service().await;
        let selection: PickSelection = [("g1".to_string(), "BUF".to_string())].into();

        let first = before_kickoff();
        let later = first + chrono::Duration::hours(1);
        service
            .submit_picks(1, 2022, 1, &selection, first)
            .await
            .expect("Failed to submit");
        service
            .submit_picks(1, 2022, 1, &selection, later)
            .await
            .expect("Failed to submit");

        assert_eq!(pick_repo.write_count(), 1);
        let picks = pick_repo.picks_of_user(1).await.unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].submitted_at, first);
    }

    #[tokio::test]
    async fn test_changing_the_pick_updates_team_and_timestamp() {
        let (service, pick_repo) = make_service().await;

        let first = before_kickoff();
        let later = first + chrono::Duration::hours(1);
        service
            .submit_picks(1, 2022, 1, &[("g1".to_string(), "BUF".to_string())].into(), first)
            .await
            .expect("Failed to submit");
        service
            .submit_picks(1, 2022, 1, &[("g1".to_string(), "LA".to_string())].into(), later)
            .await
            .expect("Failed to submit");

        assert_eq!(pick_repo.write_count(), 2);
        let picks = pick_repo.picks_of_user(1).await.unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].picked_team, "LA");
        assert_eq!(picks[0].submitted_at, later);
    }

    #[tokio::test]
    async fn test_picks_are_closed_after_kickoff() {
        let (service, pick_repo) = make_service().await;
        let after_kickoff = Utc.with_ymd_and_hms(2022, 9, 11, 18, 0, 0).unwrap();

        let result = service
            .submit_picks(
                1,
                2022,
                1,
                &[("g1".to_string(), "BUF".to_string())].into(),
                after_kickoff,
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotPossible(..))));
        assert_eq!(pick_repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unknown_game_and_wrong_team() {
        let (service, _) = make_service().await;
        let now = before_kickoff();

        assert!(matches!(
            service
                .submit_picks(1, 2022, 1, &[("nope".to_string(), "BUF".to_string())].into(), now)
                .await,
            Err(ServiceError::BadRequest(..))
        ));
        assert!(matches!(
            service
                .submit_picks(1, 2022, 1, &[("g1".to_string(), "KC".to_string())].into(), now)
                .await,
            Err(ServiceError::BadRequest(..))
        ));
    }

    #[tokio::test]
    async fn test_picks_for_different_games_are_independent() {
        let (service, pick_repo) = make_service().await;
        let now = before_kickoff();
        let selection: PickSelection = [
            ("g1".to_string(), "BUF".to_string()),
            ("g2".to_string(), "ATL".to_string()),
        ]
        .into();

        let written = service.submit_picks(1, 2022, 1, &selection, now).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(pick_repo.all_picks().await.unwrap().len(), 2);
    }
}
