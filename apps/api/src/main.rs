//! Fieldtrack API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use fieldtrack_application::RateLimitService;
use fieldtrack_core::AppError;
use tracing::{info, warn};

use crate::api_config::ApiConfig;

/// Interval between sweeps of expired rate limit windows.
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_layer =
        api_services::build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;
    let app_state = api_services::build_app_state(pool, &config).await?;

    if config.dev_seed {
        dev_seed::run(&app_state).await?;
    }

    spawn_rate_limit_cleanup(app_state.rate_limit_service.clone());

    let app = api_router::build_router(app_state, &config.rate_limits, session_layer)?;
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "fieldtrack-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn spawn_rate_limit_cleanup(rate_limit_service: RateLimitService) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match rate_limit_service.cleanup().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "expired rate limit windows removed"),
                Err(error) => warn!(error = %error, "rate limit cleanup failed"),
            }
        }
    });
}
