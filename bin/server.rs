// Club Registry - Web Server
// Form submission + registration search over HTTP

use anyhow::{Context, Result};
use club_registry::web::{router, AppState};
use club_registry::{telemetry, Config, RegistrationStore};
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();
    telemetry::init();

    let config = Config::from_env().context("Failed to load configuration")?;

    // One store for the whole process, handed to every request through State
    let store = RegistrationStore::open(&config.data_file);
    info!("{} registrations loaded from {:?}", store.len(), store.path());

    let state = AppState::new(store, &config.intake_path);
    let app = router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;

    info!("Server running on http://{}", config.listen_addr);
    info!("   Submit: POST /register");
    info!("   Search: GET  /api/registrations?search=...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
