use pickem_core::Week;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use pickem_server_domain::{
    ServiceError, ServiceResult,
    schedule::{ScheduleRepository, ScheduledGame},
};

use crate::{create_db_pool, datetime_from_timestamp};

pub struct SqliteScheduleRepository {
    pool: Pool<Sqlite>,
}

impl SqliteScheduleRepository {
    pub async fn new() -> Self {
        let pool = create_db_pool().await;
        Self { pool }
    }

    fn game_from_row(row: &SqliteRow) -> sqlx::Result<ScheduledGame> {
        Ok(ScheduledGame {
            game_id: row.try_get("game_id")?,
            season: row.try_get("season")?,
            week: row.try_get::<i64, _>("week")? as Week,
            away_team: row.try_get("away_team")?,
            home_team: row.try_get("home_team")?,
            kickoff: datetime_from_timestamp(row.try_get("kickoff")?),
            weekday: row.try_get("weekday")?,
            gametime: row.try_get("gametime")?,
            stadium: row.try_get("stadium")?,
            away_rest: row.try_get("away_rest")?,
            home_rest: row.try_get("home_rest")?,
            spread_line: row.try_get("spread_line")?,
            away_score: row.try_get("away_score")?,
            home_score: row.try_get("home_score")?,
        })
    }

    fn games_from_rows(rows: &[SqliteRow]) -> ServiceResult<Vec<ScheduledGame>> {
        rows.iter()
            .map(|row| {
                Self::game_from_row(row).map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ScheduleRepository for SqliteScheduleRepository {
    async fn upsert_games(&self, games: &[ScheduledGame]) -> ServiceResult<usize> {
        for game in games {
            sqlx::query(
                "INSERT INTO games (game_id, season, week, away_team, home_team, kickoff, weekday, gametime, stadium, away_rest, home_rest, spread_line, away_score, home_score) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(game_id) DO UPDATE SET \
                 season = excluded.season, week = excluded.week, away_team = excluded.away_team, home_team = excluded.home_team, \
                 kickoff = excluded.kickoff, weekday = excluded.weekday, gametime = excluded.gametime, stadium = excluded.stadium, \
                 away_rest = excluded.away_rest, home_rest = excluded.home_rest, spread_line = excluded.spread_line, \
                 away_score = excluded.away_score, home_score = excluded.home_score",
            )
            .bind(&game.game_id)
            .bind(game.season)
            .bind(game.week as i64)
            .bind(&game.away_team)
            .bind(&game.home_team)
            .bind(game.kickoff.timestamp())
            .bind(&game.weekday)
            .bind(&game.gametime)
            .bind(&game.stadium)
            .bind(game.away_rest)
            .bind(game.home_rest)
            .bind(game.spread_line)
            .bind(game.away_score)
            .bind(game.home_score)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        }
        Ok(games.len())
    }

    async fn season_schedule(&self, season: i32) -> ServiceResult<Vec<ScheduledGame>> {
        let rows = sqlx::query("SELECT * FROM games WHERE season = ? ORDER BY kickoff, game_id")
            .bind(season)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        Self::games_from_rows(&rows)
    }

    async fn week_schedule(&self, season: i32, week: Week) -> ServiceResult<Vec<ScheduledGame>> {
        let rows = sqlx::query(
            "SELECT * FROM games WHERE season = ? AND week = ? ORDER BY kickoff, game_id",
        )
        .bind(season)
        .bind(week as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        Self::games_from_rows(&rows)
    }

    async fn finished_games(&self, season: i32) -> ServiceResult<Vec<ScheduledGame>> {
        let rows = sqlx::query(
            "SELECT * FROM games WHERE season = ? AND away_score IS NOT NULL AND home_score IS NOT NULL ORDER BY kickoff, game_id",
        )
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        Self::games_from_rows(&rows)
    }

    async fn week_game_counts(&self, season: i32) -> ServiceResult<Vec<(Week, u32)>> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT week, COUNT(game_id) FROM games WHERE season = ? GROUP BY week ORDER BY week",
        )
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        Ok(counts
            .into_iter()
            .map(|(week, count)| (week as Week, count as u32))
            .collect())
    }
}
