use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use log::info;
use pickem_server_domain::app::AppState;

use crate::{ApiError, jwt::Claims};

mod auth;
mod leaderboard;
mod picks;
mod schedule;
mod scores;

#[derive(Clone)]
pub struct ApiState {
    pub app: Arc<AppState>,
}

impl ApiState {
    /// Resolves the bearer token's subject to a stored user.
    async fn current_user(
        &self,
        claims: &Claims,
    ) -> Result<pickem_server_domain::user::User, ApiError> {
        Ok(self.app.user_service.fetch_user(&claims.sub).await?)
    }
}

pub async fn run(
    app: Arc<AppState>,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let router: Router<ApiState> = Router::new().nest(
        "/v1",
        Router::new()
            .route("/auth/register", post(auth::register))
            .route("/auth/login", post(auth::login))
            .route("/schedule/current-week", get(schedule::current_week))
            .route("/schedule/ingest", post(schedule::ingest))
            .route("/schedule/{week}", get(schedule::week_schedule))
            .route("/picks", get(picks::current_picks))
            .route("/picks/{week}", post(picks::submit_picks))
            .route("/leaderboard", get(leaderboard::season))
            .route("/leaderboard/weekly", get(leaderboard::weekly))
            .route("/scores/{week}", get(scores::week_summary)),
    );

    let port = std::env::var("PICKEM_HTTP_PORT")
        .expect("PICKEM_HTTP_PORT must be set")
        .parse::<u16>()
        .expect("PICKEM_HTTP_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .unwrap();

    info!("API server listening on port {}", port);
    axum::serve(listener, router.with_state(ApiState { app }))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .unwrap();

    info!("HTTP API shut down gracefully");
}
