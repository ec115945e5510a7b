use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use grubdash::api;
use grubdash::config::Config;
use grubdash::error::AppError;
use grubdash::state::AppState;
use grubdash::store::seed::Seed;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    let state = match &config.seed_file {
        Some(path) => {
            let state = AppState::with_seed(Seed::from_file(path)?)?;
            tracing::info!(
                seed_file = %path.display(),
                dishes = state.dishes.len().await,
                orders = state.orders.len().await,
                "seed data loaded"
            );
            state
        }
        None => AppState::new(),
    };

    let app = api::rest::router(Arc::new(state));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
