use pickem_core::Week;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use pickem_server_domain::{
    ServiceError, ServiceResult,
    picks::{Pick, PickRepository},
    scoring::{ScoredPick, ScoredPickRepository},
    user::UserId,
};

use crate::{create_db_pool, datetime_from_timestamp};

pub struct SqlitePickRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePickRepository {
    pub async fn new() -> Self {
        let pool = create_db_pool().await;
        Self { pool }
    }

    fn pick_from_row(row: &SqliteRow) -> sqlx::Result<Pick> {
        Ok(Pick {
            user_id: row.try_get("user_id")?,
            game_id: row.try_get("game_id")?,
            picked_team: row.try_get("picked_team")?,
            submitted_at: datetime_from_timestamp(row.try_get("submitted_at")?),
        })
    }
}

#[async_trait::async_trait]
impl PickRepository for SqlitePickRepository {
    async fn picks_of_user(&self, user_id: UserId) -> ServiceResult<Vec<Pick>> {
        let rows = sqlx::query("SELECT * FROM picks WHERE user_id = ? ORDER BY game_id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        rows.iter()
            .map(|row| {
                Self::pick_from_row(row).map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }

    async fn all_picks(&self) -> ServiceResult<Vec<Pick>> {
        let rows = sqlx::query("SELECT * FROM picks ORDER BY user_id, game_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        rows.iter()
            .map(|row| {
                Self::pick_from_row(row).map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }

    async fn upsert_pick(&self, pick: &Pick) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO picks (user_id, game_id, picked_team, submitted_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(user_id, game_id) DO UPDATE SET \
             picked_team = excluded.picked_team, submitted_at = excluded.submitted_at",
        )
        .bind(pick.user_id)
        .bind(&pick.game_id)
        .bind(&pick.picked_team)
        .bind(pick.submitted_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

pub struct SqliteScoredPickRepository {
    pool: Pool<Sqlite>,
}

impl SqliteScoredPickRepository {
    pub async fn new() -> Self {
        let pool = create_db_pool().await;
        Self { pool }
    }

    fn scored_pick_from_row(row: &SqliteRow) -> sqlx::Result<ScoredPick> {
        Ok(ScoredPick {
            user_id: row.try_get("user_id")?,
            game_id: row.try_get("game_id")?,
            season: row.try_get("season")?,
            week: row.try_get::<i64, _>("week")? as Week,
            correct: row.try_get("correct")?,
        })
    }
}

#[async_trait::async_trait]
impl ScoredPickRepository for SqliteScoredPickRepository {
    async fn upsert_scored_picks(&self, scored: &[ScoredPick]) -> ServiceResult<()> {
        for pick in scored {
            sqlx::query(
                "INSERT INTO scored_picks (user_id, game_id, season, week, correct) VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT(user_id, game_id) DO UPDATE SET \
                 season = excluded.season, week = excluded.week, correct = excluded.correct",
            )
            .bind(pick.user_id)
            .bind(&pick.game_id)
            .bind(pick.season)
            .bind(pick.week as i64)
            .bind(pick.correct)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        }
        Ok(())
    }

    async fn scored_picks(
        &self,
        season: i32,
        user: Option<UserId>,
    ) -> ServiceResult<Vec<ScoredPick>> {
        let mut query = "SELECT * FROM scored_picks WHERE season = ?".to_string();
        if user.is_some() {
            query.push_str(" AND user_id = ?");
        }
        query.push_str(" ORDER BY user_id, game_id");

        let mut query = sqlx::query(&query).bind(season);
        if let Some(user_id) = user {
            query = query.bind(user_id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        rows.iter()
            .map(|row| {
                Self::scored_pick_from_row(row)
                    .map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }
}
