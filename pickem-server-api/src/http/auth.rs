use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{ApiError, http::ApiState};

#[derive(Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub username: String,
}

pub async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<RegisterResponse>, ApiError> {
    state
        .app
        .user_service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok(Json(RegisterResponse {
        username: payload.username,
    }))
}

#[derive(Deserialize)]
pub struct AuthPayload {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthBody {
    pub token: String,
}

pub async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<AuthPayload>,
) -> Result<Json<AuthBody>, ApiError> {
    let username = state
        .app
        .user_service
        .try_login(&payload.username, &payload.password)
        .await?;
    let token = state.app.jwt_service.generate_jwt(&username);
    Ok(Json(AuthBody { token }))
}
