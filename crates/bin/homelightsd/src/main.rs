//! # homelightsd, the homelights daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and install logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repositories, services and the three lighting backends
//! - Start every backend once (discovery, pairing, reconciliation)
//! - Build the axum router and serve until Ctrl+C or SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use homelights_adapter_http_axum::router;
use homelights_adapter_http_axum::state::AppState;
use homelights_adapter_lifx::LifxBackend;
use homelights_adapter_philips_hue::HueBackend;
use homelights_adapter_rvl::RvlBackend;
use homelights_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteLightRepository, SqlitePatternRepository,
    SqliteSceneRepository, SqliteZoneRepository,
};
use homelights_app::dispatcher::Dispatcher;
use homelights_app::services::light_service::LightService;
use homelights_app::services::pattern_service::PatternService;
use homelights_app::services::scene_service::SceneService;
use homelights_app::services::zone_service::ZoneService;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting homelightsd");

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let zone_repo = SqliteZoneRepository::new(pool.clone());
    let light_repo = SqliteLightRepository::new(pool.clone());
    let scene_repo = SqliteSceneRepository::new(pool.clone());
    let pattern_repo = SqlitePatternRepository::new(pool);

    // Services
    let zone_service = ZoneService::new(zone_repo);
    let light_service = LightService::new(light_repo.clone());
    let scene_service = SceneService::new(scene_repo, light_repo, pattern_repo.clone());
    let pattern_service = PatternService::new(pattern_repo);

    // Backends
    let dispatcher = Dispatcher::new(
        RvlBackend::new(config.rvl.clone()),
        HueBackend::new(config.philips_hue.clone())?,
        LifxBackend::new(config.lifx.clone()),
    )
    .with_transition(config.transition());

    for status in dispatcher.start_all(&light_service).await {
        tracing::info!(
            backend = %status.light_type,
            state = status.state.as_str(),
            devices = status.device_count,
            "backend started"
        );
    }

    // HTTP
    let state = AppState::new(
        zone_service,
        light_service,
        scene_service,
        pattern_service,
        dispatcher,
    );
    let app = router::build(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "homelightsd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
