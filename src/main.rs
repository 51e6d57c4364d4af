use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acrodash::{
    auth::PermissiveCredentials, config::AppConfig, roster::MockRoster, server, state::AppState,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acrodash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AcroDash...");

    let config = AppConfig::from_env();
    tracing::info!(
        "Countdown: {}s/letter phrase entry, {}s/letter voting, tick every {:?}",
        config.room.phrase_seconds_per_letter,
        config.room.voting_seconds_per_letter,
        config.tick_interval
    );

    let state = Arc::new(AppState::new(
        Arc::new(MockRoster::default()),
        Arc::new(PermissiveCredentials),
        config.room.clone(),
        config.tick_interval,
    ));

    let app = server::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
