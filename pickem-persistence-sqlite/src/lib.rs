use chrono::{DateTime, Utc};
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod picks;
pub mod schedule;
pub mod users;

pub use picks::{SqlitePickRepository, SqliteScoredPickRepository};
pub use schedule::SqliteScheduleRepository;
pub use users::SqliteUserRepository;

pub async fn create_db_pool() -> Pool<Sqlite> {
    let db_path = std::env::var("PICKEM_DB").expect("PICKEM_DB env var not set");
    let connect_options = SqliteConnectOptions::new().filename(&db_path);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("Failed to create DB pool")
}

pub(crate) fn datetime_from_timestamp(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
