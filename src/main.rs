use std::sync::Arc;

use log::info;
use pickem_persistence_sqlite::{
    SqlitePickRepository, SqliteScheduleRepository, SqliteScoredPickRepository,
    SqliteUserRepository,
};
use pickem_server_api::JwtServiceImpl;
use pickem_server_domain::{
    app::construct_app,
    jwt::ArcJwtService,
    picks::ArcPickRepository,
    schedule::ArcScheduleRepository,
    scoring::ArcScoredPickRepository,
    user::ArcUserRepository,
};

mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    logs::init_logger();

    let season = std::env::var("PICKEM_SEASON")
        .expect("PICKEM_SEASON must be set")
        .parse::<i32>()
        .expect("PICKEM_SEASON must be a valid year");

    let user_repository: ArcUserRepository =
        Arc::new(Box::new(SqliteUserRepository::new().await));
    let schedule_repository: ArcScheduleRepository =
        Arc::new(Box::new(SqliteScheduleRepository::new().await));
    let pick_repository: ArcPickRepository =
        Arc::new(Box::new(SqlitePickRepository::new().await));
    let scored_pick_repository: ArcScoredPickRepository =
        Arc::new(Box::new(SqliteScoredPickRepository::new().await));
    let jwt_service: ArcJwtService = Arc::new(Box::new(JwtServiceImpl::new()));

    let app = Arc::new(construct_app(
        season,
        user_repository,
        schedule_repository,
        pick_repository,
        scored_pick_repository,
        jwt_service,
    ));
    app.start().await;

    info!("Starting application for season {}", season);

    pickem_server_api::http::run(app, shutdown_signal()).await;
}
