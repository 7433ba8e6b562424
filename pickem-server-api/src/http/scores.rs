use axum::{
    Json,
    extract::{Path, State},
};
use pickem_core::Week;
use serde::Serialize;

use crate::{ApiError, http::ApiState, jwt::Claims};

#[derive(Serialize)]
pub struct JsonWeekSummary {
    pub week: Week,
    pub correct_picks: u32,
    pub finished_games: u32,
}

pub async fn week_summary(
    claims: Claims,
    Path(week): Path<Week>,
    State(state): State<ApiState>,
) -> Result<Json<JsonWeekSummary>, ApiError> {
    let user = state.current_user(&claims).await?;
    let summary = state
        .app
        .scoring_service
        .week_summary(user.id, state.app.season, week)
        .await?;
    Ok(Json(JsonWeekSummary {
        week: summary.week,
        correct_picks: summary.correct_picks,
        finished_games: summary.finished_games,
    }))
}
