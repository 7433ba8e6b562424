use std::sync::Arc;

use crate::{
    jwt::ArcJwtService,
    leaderboard::{ArcLeaderboardService, LeaderboardServiceImpl},
    picks::{ArcPickRepository, ArcPickService, PickServiceImpl},
    schedule::{ArcScheduleRepository, ArcScheduleService, ScheduleServiceImpl},
    scoring::{ArcScoredPickRepository, ArcScoringService, ScoringServiceImpl},
    user::{ArcUserRepository, ArcUserService, UserServiceImpl},
};

#[derive(Clone)]
pub struct AppState {
    pub season: i32,

    pub user_service: ArcUserService,
    pub schedule_service: ArcScheduleService,
    pub pick_service: ArcPickService,
    pub scoring_service: ArcScoringService,
    pub leaderboard_service: ArcLeaderboardService,
    pub jwt_service: ArcJwtService,

    pub user_repository: ArcUserRepository,
    pub schedule_repository: ArcScheduleRepository,
    pub pick_repository: ArcPickRepository,
    pub scored_pick_repository: ArcScoredPickRepository,
}

impl AppState {
    pub async fn start(&self) {
        self.user_service
            .load_taken_usernames()
            .await
            .expect("Failed to load taken usernames");
    }
}

pub fn construct_app(
    season: i32,
    user_repository: ArcUserRepository,
    schedule_repository: ArcScheduleRepository,
    pick_repository: ArcPickRepository,
    scored_pick_repository: ArcScoredPickRepository,
    jwt_service: ArcJwtService,
) -> AppState {
    let user_service: ArcUserService = Arc::new(Box::new(UserServiceImpl::new(
        jwt_service.clone(),
        user_repository.clone(),
    )));

    let schedule_service: ArcScheduleService = Arc::new(Box::new(ScheduleServiceImpl::new(
        schedule_repository.clone(),
    )));

    let pick_service: ArcPickService = Arc::new(Box::new(PickServiceImpl::new(
        schedule_repository.clone(),
        pick_repository.clone(),
    )));

    let scoring_service: ArcScoringService = Arc::new(Box::new(ScoringServiceImpl::new(
        schedule_repository.clone(),
        pick_repository.clone(),
        scored_pick_repository.clone(),
    )));

    let leaderboard_service: ArcLeaderboardService = Arc::new(Box::new(
        LeaderboardServiceImpl::new(
            scoring_service.clone(),
            scored_pick_repository.clone(),
            schedule_repository.clone(),
            user_repository.clone(),
        ),
    ));

    AppState {
        season,
        user_service,
        schedule_service,
        pick_service,
        scoring_service,
        leaderboard_service,
        jwt_service,
        user_repository,
        schedule_repository,
        pick_repository,
        scored_pick_repository,
    }
}
