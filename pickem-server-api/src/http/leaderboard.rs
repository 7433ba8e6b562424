use axum::{
    Json,
    extract::{Query, State},
};
use pickem_core::Week;
use pickem_server_domain::user::UserId;
use serde::{Deserialize, Serialize};

use crate::{ApiError, http::ApiState, jwt::Claims};

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub user: Option<String>,
}

#[derive(Serialize)]
pub struct JsonLeaderboardRow {
    pub username: String,
    pub correct_picks: u32,
    /// Percentage of attempted picks, e.g. 66.7.
    pub pct_correct: f64,
    pub weeks_played: u32,
}

#[derive(Serialize)]
pub struct JsonWeeklyPercentage {
    pub username: String,
    pub week: Week,
    pub correct_picks: u32,
    /// Fraction of games scheduled that week, e.g. 0.667.
    pub pct_correct: f64,
}

async fn resolve_user_filter(
    state: &ApiState,
    username: Option<&str>,
) -> Result<Option<UserId>, ApiError> {
    match username {
        Some(name) => {
            let user = state.app.user_service.fetch_user(name).await?;
            Ok(Some(user.id))
        }
        None => Ok(None),
    }
}

pub async fn season(
    _claims: Claims,
    Query(query): Query<LeaderboardQuery>,
    State(state): State<ApiState>,
) -> Result<Json<Vec<JsonLeaderboardRow>>, ApiError> {
    let user_filter = resolve_user_filter(&state, query.user.as_deref()).await?;
    let rows = state
        .app
        .leaderboard_service
        .season_leaderboard(state.app.season, user_filter)
        .await?;
    let rows = rows
        .into_iter()
        .map(|row| JsonLeaderboardRow {
            username: row.username,
            correct_picks: row.correct_picks,
            pct_correct: 100.0 * row.pct_correct,
            weeks_played: row.weeks_played,
        })
        .collect();
    Ok(Json(rows))
}

pub async fn weekly(
    _claims: Claims,
    Query(query): Query<LeaderboardQuery>,
    State(state): State<ApiState>,
) -> Result<Json<Vec<JsonWeeklyPercentage>>, ApiError> {
    let user_filter = resolve_user_filter(&state, query.user.as_deref()).await?;
    let rows = state
        .app
        .leaderboard_service
        .weekly_percentages(state.app.season, user_filter)
        .await?;
    let rows = rows
        .into_iter()
        .map(|row| JsonWeeklyPercentage {
            username: row.username,
            week: row.week,
            correct_picks: row.correct_picks,
            pct_correct: row.pct_correct,
        })
        .collect();
    Ok(Json(rows))
}
