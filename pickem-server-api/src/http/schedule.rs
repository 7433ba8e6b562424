use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use pickem_core::{Countdown, Week, away_vs_home_text, day_time_place_text, rest_and_spread_text};
use pickem_server_domain::schedule::ScheduledGame;
use serde::{Deserialize, Serialize};

use crate::{
    ApiError,
    http::ApiState,
    jwt::Claims,
};

#[derive(Serialize)]
pub struct CurrentWeekResponse {
    pub season: i32,
    pub week: Week,
}

pub async fn current_week(
    _claims: Claims,
    State(state): State<ApiState>,
) -> Result<Json<CurrentWeekResponse>, ApiError> {
    let week = state
        .app
        .schedule_service
        .current_week(state.app.season, Utc::now())
        .await?;
    Ok(Json(CurrentWeekResponse {
        season: state.app.season,
        week,
    }))
}

#[derive(Serialize)]
pub struct JsonMatchupCard {
    pub game_id: String,
    pub away_team: String,
    pub home_team: String,
    pub matchup: String,
    pub day_time_place: String,
    pub rest_and_spread: String,
    pub countdown: String,
    pub started: bool,
}

pub async fn week_schedule(
    _claims: Claims,
    Path(week): Path<Week>,
    State(state): State<ApiState>,
) -> Result<Json<Vec<JsonMatchupCard>>, ApiError> {
    let now = Utc::now();
    let games = state
        .app
        .schedule_service
        .week_schedule(state.app.season, week)
        .await?;
    let cards = games
        .into_iter()
        .map(|game| {
            let countdown = Countdown::until(game.kickoff, now);
            JsonMatchupCard {
                matchup: away_vs_home_text(&game.away_team, &game.home_team),
                day_time_place: day_time_place_text(&game.weekday, &game.gametime, &game.stadium),
                rest_and_spread: rest_and_spread_text(
                    &game.away_team,
                    game.away_rest,
                    &game.home_team,
                    game.home_rest,
                    game.spread_line,
                ),
                countdown: countdown.text(),
                started: countdown.has_kicked_off(),
                game_id: game.game_id,
                away_team: game.away_team,
                home_team: game.home_team,
            }
        })
        .collect();
    Ok(Json(cards))
}

#[derive(Deserialize)]
pub struct JsonGameRow {
    pub game_id: String,
    pub week: Week,
    pub away_team: String,
    pub home_team: String,
    /// Unix timestamp of the scheduled start.
    pub kickoff: i64,
    pub weekday: String,
    pub gametime: String,
    pub stadium: String,
    pub away_rest: i32,
    pub home_rest: i32,
    pub spread_line: f64,
    pub away_score: Option<i64>,
    pub home_score: Option<i64>,
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub applied: usize,
}

pub async fn ingest(
    _claims: Claims,
    State(state): State<ApiState>,
    Json(rows): Json<Vec<JsonGameRow>>,
) -> Result<Json<IngestResponse>, ApiError> {
    let season = state.app.season;
    let games: Vec<ScheduledGame> = rows
        .into_iter()
        .map(|row| ScheduledGame {
            game_id: row.game_id,
            season,
            week: row.week,
            away_team: row.away_team,
            home_team: row.home_team,
            kickoff: chrono::DateTime::from_timestamp(row.kickoff, 0)
                .unwrap_or(chrono::DateTime::UNIX_EPOCH),
            weekday: row.weekday,
            gametime: row.gametime,
            stadium: row.stadium,
            away_rest: row.away_rest,
            home_rest: row.home_rest,
            spread_line: row.spread_line,
            away_score: row.away_score,
            home_score: row.home_score,
        })
        .collect();
    let applied = state.app.schedule_service.ingest_games(games).await?;
    Ok(Json(IngestResponse { applied }))
}
