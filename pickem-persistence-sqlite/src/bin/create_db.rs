use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const USERS_SQL: &str = "CREATE TABLE users (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    username TEXT NOT NULL UNIQUE, \
    email TEXT NOT NULL UNIQUE, \
    password TEXT NOT NULL, \
    created_at INTEGER NOT NULL)";

const GAMES_SQL: &str = "CREATE TABLE games (\
    game_id TEXT PRIMARY KEY, \
    season INTEGER NOT NULL, \
    week INTEGER NOT NULL, \
    away_team TEXT NOT NULL, \
    home_team TEXT NOT NULL, \
    kickoff INTEGER NOT NULL, \
    weekday TEXT NOT NULL, \
    gametime TEXT NOT NULL, \
    stadium TEXT NOT NULL, \
    away_rest INTEGER NOT NULL DEFAULT 0, \
    home_rest INTEGER NOT NULL DEFAULT 0, \
    spread_line REAL NOT NULL DEFAULT 0, \
    away_score INTEGER, \
    home_score INTEGER)";

const PICKS_SQL: &str = "CREATE TABLE picks (\
    user_id INTEGER NOT NULL, \
    game_id TEXT NOT NULL, \
    picked_team TEXT NOT NULL, \
    submitted_at INTEGER NOT NULL, \
    PRIMARY KEY (user_id, game_id))";

const SCORED_PICKS_SQL: &str = "CREATE TABLE scored_picks (\
    user_id INTEGER NOT NULL, \
    game_id TEXT NOT NULL, \
    season INTEGER NOT NULL, \
    week INTEGER NOT NULL, \
    correct INTEGER NOT NULL, \
    PRIMARY KEY (user_id, game_id))";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = std::env::var("PICKEM_DB").expect("PICKEM_DB env var not set");
    let parent = std::path::Path::new(&db_path)
        .parent()
        .expect("Failed to get parent directory of DB path");
    if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory for DB");
        println!("Created parent directory for DB at {}", parent.display());
    }

    if std::path::Path::new(&db_path).exists() {
        std::fs::remove_file(&db_path).expect("Failed to remove existing DB");
        println!("Removed existing DB at {}", db_path);
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create DB pool");

    for (table, sql) in [
        ("users", USERS_SQL),
        ("games", GAMES_SQL),
        ("picks", PICKS_SQL),
        ("scored_picks", SCORED_PICKS_SQL),
    ] {
        sqlx::query(sql)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to create {} table: {}", table, e));
        println!("Created {} table", table);
    }

    println!("Created new DB at {}", db_path);
}
