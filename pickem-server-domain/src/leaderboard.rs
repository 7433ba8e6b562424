use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use log::warn;
use pickem_core::Week;

use crate::{
    ServiceResult,
    schedule::ArcScheduleRepository,
    scoring::{ArcScoredPickRepository, ArcScoringService},
    user::{ArcUserRepository, UserId, Username},
};

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub username: Username,
    pub correct_picks: u32,
    /// Correct picks over attempted picks, rounded to 3 decimals.
    pub pct_correct: f64,
    pub weeks_played: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyPercentage {
    pub username: Username,
    pub week: Week,
    pub correct_picks: u32,
    /// Correct picks over games scheduled that week, rounded to 3 decimals.
    pub pct_correct: f64,
}

pub type ArcLeaderboardService = Arc<Box<dyn LeaderboardService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait LeaderboardService {
    async fn season_leaderboard(
        &self,
        season: i32,
        user: Option<UserId>,
    ) -> ServiceResult<Vec<LeaderboardRow>>;
    async fn weekly_percentages(
        &self,
        season: i32,
        user: Option<UserId>,
    ) -> ServiceResult<Vec<WeeklyPercentage>>;
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub struct LeaderboardServiceImpl {
    scoring_service: ArcScoringService,
    scored_pick_repository: ArcScoredPickRepository,
    schedule_repository: ArcScheduleRepository,
    user_repository: ArcUserRepository,
}

impl LeaderboardServiceImpl {
    pub fn new(
        scoring_service: ArcScoringService,
        scored_pick_repository: ArcScoredPickRepository,
        schedule_repository: ArcScheduleRepository,
        user_repository: ArcUserRepository,
    ) -> Self {
        Self {
            scoring_service,
            scored_pick_repository,
            schedule_repository,
            user_repository,
        }
    }

    async fn usernames_by_id(&self) -> ServiceResult<HashMap<UserId, Username>> {
        let users = self.user_repository.get_users().await?;
        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }
}

#[derive(Default)]
struct SeasonTally {
    correct: u32,
    attempted: u32,
    weeks: BTreeSet<Week>,
}

#[async_trait::async_trait]
impl LeaderboardService for LeaderboardServiceImpl {
    /// One row per user with at least one scored pick, ordered by correct
    /// count descending. Ties keep user-id order. Users with no picks are
    /// absent, so the attempted-picks denominator is never zero.
    async fn season_leaderboard(
        &self,
        season: i32,
        user: Option<UserId>,
    ) -> ServiceResult<Vec<LeaderboardRow>> {
        self.scoring_service.score_season(season).await?;
        let scored = self.scored_pick_repository.scored_picks(season, user).await?;

        let mut tallies: BTreeMap<UserId, SeasonTally> = BTreeMap::new();
        for pick in &scored {
            let tally = tallies.entry(pick.user_id).or_default();
            tally.attempted += 1;
            if pick.correct {
                tally.correct += 1;
            }
            tally.weeks.insert(pick.week);
        }

        let usernames = self.usernames_by_id().await?;
        let mut rows = Vec::new();
        for (user_id, tally) in tallies {
            let Some(username) = usernames.get(&user_id) else {
                warn!("Scored picks for unknown user {}, skipping", user_id);
                continue;
            };
            rows.push(LeaderboardRow {
                user_id,
                username: username.clone(),
                correct_picks: tally.correct,
                pct_correct: round3(f64::from(tally.correct) / f64::from(tally.attempted)),
                weeks_played: tally.weeks.len() as u32,
            });
        }
        rows.sort_by(|a, b| b.correct_picks.cmp(&a.correct_picks));
        Ok(rows)
    }

    /// Per user and week, correct picks over games *scheduled* that week.
    /// A skipped pick still counts against the denominator here, unlike
    /// the season aggregate.
    async fn weekly_percentages(
        &self,
        season: i32,
        user: Option<UserId>,
    ) -> ServiceResult<Vec<WeeklyPercentage>> {
        self.scoring_service.score_season(season).await?;
        let scored = self.scored_pick_repository.scored_picks(season, user).await?;
        let games_per_week: HashMap<Week, u32> = self
            .schedule_repository
            .week_game_counts(season)
            .await?
            .into_iter()
            .collect();

        let mut correct_by_user_week: BTreeMap<(UserId, Week), u32> = BTreeMap::new();
        for pick in &scored {
            let correct = correct_by_user_week
                .entry((pick.user_id, pick.week))
                .or_insert(0);
            if pick.correct {
                *correct += 1;
            }
        }

        let usernames = self.usernames_by_id().await?;
        let mut rows = Vec::new();
        for ((user_id, week), correct) in correct_by_user_week {
            let Some(username) = usernames.get(&user_id) else {
                warn!("Scored picks for unknown user {}, skipping", user_id);
                continue;
            };
            let Some(&scheduled) = games_per_week.get(&week) else {
                continue;
            };
            if scheduled == 0 {
                continue;
            }
            rows.push(WeeklyPercentage {
                username: username.clone(),
                week,
                correct_picks: correct,
                pct_correct: round3(f64::from(correct) / f64::from(scheduled)),
            });
        }
        rows.sort_by(|a, b| (a.week, &a.username).cmp(&(b.week, &b.username)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        picks::{MockPickRepository, Pick, PickRepository},
        schedule::{MockScheduleRepository, ScheduleRepository, ScheduledGame},
        scoring::{MockScoredPickRepository, ScoringServiceImpl},
        user::MockUserRepository,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn make_game(
        game_id: &str,
        week: Week,
        away_team: &str,
        home_team: &str,
        scores: Option<(i64, i64)>,
    ) -> ScheduledGame {
        ScheduledGame {
            game_id: game_id.to_string(),
            season: 2022,
            week,
            away_team: away_team.to_string(),
            home_team: home_team.to_string(),
            kickoff: Utc.with_ymd_and_hms(2022, 9, 11, 17, 0, 0).unwrap(),
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

    fn make_pick(user_id: UserId, game_id: &str, picked_team: &str) -> Pick {
        Pick {
            user_id,
            game_id: game_id.to_string(),
            picked_team: picked_team.to_string(),
            submitted_at: DateTime::UNIX_EPOCH,
        }
    }

    struct Fixture {
        schedule_repo: MockScheduleRepository,
        pick_repo: MockPickRepository,
        service: LeaderboardServiceImpl,
    }

    fn make_fixture(usernames: &[&str]) -> Fixture {
        let schedule_repo = MockScheduleRepository::default();
        let pick_repo = MockPickRepository::default();
        let scored_repo = MockScoredPickRepository::default();
        let scoring_service = ScoringServiceImpl::new(
            Arc::new(Box::new(schedule_repo.clone())),
            Arc::new(Box::new(pick_repo.clone())),
            Arc::new(Box::new(scored_repo.clone())),
        );
        let service = LeaderboardServiceImpl::new(
            Arc::new(Box::new(scoring_service)),
            Arc::new(Box::new(scored_repo)),
            Arc::new(Box::new(schedule_repo.clone())),
            Arc::new(Box::new(MockUserRepository::with_users(usernames))),
        );
        Fixture {
            schedule_repo,
            pick_repo,
            service,
        }
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(2.0 / 3.0), 0.667);
        assert_eq!(round3(0.5), 0.5);
        assert_eq!(round3(1.0), 1.0);
    }

    #[tokio::test]
    async fn test_weekly_denominator_is_games_scheduled() {
        // Week of 3 games; alice picked 2, both correct.
        let f = make_fixture(&["alice"]);
        f.schedule_repo
            .upsert_games(&[
                make_game("g1", 1, "BUF", "LA", Some((31, 10))),
                make_game("g2", 1, "NO", "ATL", Some((20, 24))),
                make_game("g3", 1, "KC", "TB", Some((41, 31))),
            ])
            .await
            .unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g1", "BUF")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g2", "ATL")).await.unwrap();

        let weekly = f.service.weekly_percentages(2022, None).await.unwrap();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].correct_picks, 2);
        assert_eq!(weekly[0].pct_correct, 0.667);

        // the season aggregate divides by attempted picks instead
        let season = f.service.season_leaderboard(2022, None).await.unwrap();
        assert_eq!(season[0].pct_correct, 1.0);
    }

    #[tokio::test]
    async fn test_user_with_no_picks_is_excluded() {
        let f = make_fixture(&["alice", "bob"]);
        f.schedule_repo
            .upsert_games(&[make_game("g1", 1, "BUF", "LA", Some((31, 10)))])
            .await
            .unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g1", "BUF")).await.unwrap();

        let rows = f.service.season_leaderboard(2022, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "alice");
    }

    #[tokio::test]
    async fn test_ordering_and_tie_break() {
        let f = make_fixture(&["alice", "bob", "carol"]);
        f.schedule_repo
            .upsert_games(&[
                make_game("g1", 1, "BUF", "LA", Some((31, 10))),
                make_game("g2", 1, "NO", "ATL", Some((20, 24))),
            ])
            .await
            .unwrap();
        // bob gets 2 correct, alice and carol tie on 1
        f.pick_repo.upsert_pick(&make_pick(1, "g1", "BUF")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g2", "NO")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(2, "g1", "BUF")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(2, "g2", "ATL")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(3, "g1", "LA")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(3, "g2", "ATL")).await.unwrap();

        let rows = f.service.season_leaderboard(2022, None).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice", "carol"]);
        assert_eq!(rows[0].correct_picks, 2);
    }

    #[tokio::test]
    async fn test_weeks_played_counts_distinct_weeks() {
        let f = make_fixture(&["alice"]);
        f.schedule_repo
            .upsert_games(&[
                make_game("g1", 1, "BUF", "LA", Some((31, 10))),
                make_game("g2", 1, "NO", "ATL", Some((20, 24))),
                make_game("g3", 2, "KC", "TB", Some((41, 31))),
            ])
            .await
            .unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g1", "BUF")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g2", "NO")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g3", "KC")).await.unwrap();

        let rows = f.service.season_leaderboard(2022, None).await.unwrap();
        assert_eq!(rows[0].weeks_played, 2);
    }

    #[tokio::test]
    async fn test_tie_game_counts_in_weekly_denominator() {
        let f = make_fixture(&["alice"]);
        f.schedule_repo
            .upsert_games(&[
                make_game("g1", 1, "BUF", "LA", Some((31, 10))),
                make_game("g2", 1, "IND", "HOU", Some((21, 21))),
            ])
            .await
            .unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g1", "BUF")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g2", "IND")).await.unwrap();

        let weekly = f.service.weekly_percentages(2022, None).await.unwrap();
        assert_eq!(weekly[0].correct_picks, 1);
        assert_eq!(weekly[0].pct_correct, 0.5);
    }

    #[tokio::test]
    async fn test_user_filter() {
        let f = make_fixture(&["alice", "bob"]);
        f.schedule_repo
            .upsert_games(&[make_game("g1", 1, "BUF", "LA", Some((31, 10)))])
            .await
            .unwrap();
        f.pick_repo.upsert_pick(&make_pick(1, "g1", "BUF")).await.unwrap();
        f.pick_repo.upsert_pick(&make_pick(2, "g1", "LA")).await.unwrap();

        let rows = f.service.season_leaderboard(2022, Some(2)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "bob");
        assert_eq!(rows[0].correct_picks, 0);
        assert_eq!(rows[0].pct_correct, 0.0);
    }
}
