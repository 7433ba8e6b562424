use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use pickem_core::Week;
use pickem_server_domain::picks::PickSelection;
use serde::{Deserialize, Serialize};

use crate::{ApiError, http::ApiState, jwt::Claims};

#[derive(Deserialize)]
pub struct SubmitPicksPayload {
    /// One chosen team per game id.
    pub picks: PickSelection,
}

#[derive(Serialize)]
pub struct SubmitPicksResponse {
    pub submitted: usize,
    pub written: usize,
}

pub async fn submit_picks(
    claims: Claims,
    Path(week): Path<Week>,
    State(state): State<ApiState>,
    Json(payload): Json<SubmitPicksPayload>,
) -> Result<Json<SubmitPicksResponse>, ApiError> {
    let user = state.current_user(&claims).await?;
    let written = state
        .app
        .pick_service
        .submit_picks(user.id, state.app.season, week, &payload.picks, Utc::now())
        .await?;
    Ok(Json(SubmitPicksResponse {
        submitted: payload.picks.len(),
        written,
    }))
}

#[derive(Serialize)]
pub struct JsonPick {
    pub game_id: String,
    pub picked_team: String,
    pub submitted_at: i64,
}

pub async fn current_picks(
    claims: Claims,
    State(state): State<ApiState>,
) -> Result<Json<Vec<JsonPick>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let picks = state.app.pick_service.picks_of_user(user.id).await?;
    let picks = picks
        .into_iter()
        .map(|pick| JsonPick {
            game_id: pick.game_id,
            picked_team: pick.picked_team,
            submitted_at: pick.submitted_at.timestamp(),
        })
        .collect();
    Ok(Json(picks))
}
