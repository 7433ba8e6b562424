use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: add_user <username> <email> <password>");
        std::process::exit(1);
    }

    let db_path = std::env::var("PICKEM_DB").expect("PICKEM_DB env var not set");

    let username = &args[1];
    let email = &args[2];
    let password = &args[3];

    let connect_options = SqliteConnectOptions::new().filename(&db_path);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create pool");

    create_user(&pool, username, email, password).await;
}

async fn create_user(pool: &Pool<Sqlite>, username: &str, email: &str, password: &str) {
    let existing_user: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .expect("Failed to query for existing user");

    if existing_user.is_some() {
        panic!("User with name [{}] already exists", username);
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).expect("Failed to hash password");

    sqlx::query("INSERT INTO users (username, email, password, created_at) VALUES (?, ?, ?, ?)")
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(chrono::Utc::now().timestamp())
        .execute(pool)
        .await
        .expect("Failed to insert new user");

    println!("Created user [{}]", username);
}
