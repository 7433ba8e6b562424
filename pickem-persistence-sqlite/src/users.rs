use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use pickem_server_domain::{
    ServiceError, ServiceResult,
    user::{NewUser, User, UserId, UserRepository, Username},
};

use crate::{create_db_pool, datetime_from_timestamp};

pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub async fn new() -> Self {
        let pool = create_db_pool().await;
        Self { pool }
    }

    fn user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            created_at: datetime_from_timestamp(row.try_get("created_at")?),
        })
    }

    async fn get_user_where(&self, query: &str, param: &str) -> ServiceResult<Option<User>> {
        let row = sqlx::query(query)
            .bind(param)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        match row {
            Some(row) => Self::user_from_row(&row)
                .map(Some)
                .map_err(|e| ServiceError::Internal(e.to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        match row {
            Some(row) => Self::user_from_row(&row)
                .map(Some)
                .map_err(|e| ServiceError::Internal(e.to_string())),
            None => Ok(None),
        }
    }

    async fn get_user_by_name(&self, name: &str) -> ServiceResult<Option<User>> {
        self.get_user_where("SELECT * FROM users WHERE username = ?", name)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        self.get_user_where("SELECT * FROM users WHERE email = ?", email)
            .await
    }

    async fn create_user(&self, user: &NewUser) -> ServiceResult<UserId> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        Ok(result.last_insert_rowid())
    }

    async fn get_users(&self) -> ServiceResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        rows.iter()
            .map(|row| {
                Self::user_from_row(row).map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }

    async fn get_usernames(&self) -> ServiceResult<Vec<Username>> {
        sqlx::query_scalar::<_, String>("SELECT username FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }
}
