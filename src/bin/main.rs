use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cert_bridge::config::AppConfig;
use cert_bridge::handlers::routes::{create_router, AppState};
use cert_bridge::infrastructure::auth::{AuthRelay, HttpAuthGateway, MemoryTokenStore};
use cert_bridge::infrastructure::contracts::abis::{certificate_management_abi, load_abi};
use cert_bridge::infrastructure::wallet::detect_provider;
use cert_bridge::infrastructure::workers::WorkerManager;
use cert_bridge::SessionBridge;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let abi = match &config.contract.abi_path {
        Some(path) => load_abi(path)?,
        None => certificate_management_abi()?,
    };

    let provider = detect_provider(&config.wallet)?;
    let gateway = HttpAuthGateway::new(config.auth.auth_url.clone(), config.auth.timeout)?;
    let relay = AuthRelay::new(config.auth.relay_upstream.clone(), config.auth.timeout)?;

    let mut bridge = SessionBridge::new(
        provider,
        config.contract.address,
        abi,
        Arc::new(gateway),
        Arc::new(MemoryTokenStore::new()),
    )
    .with_retry_policy(config.retry);

    // Page-load sequence; the gateway stays up without a wallet.
    match bridge.connect().await {
        Ok(account) => info!("Session connected as {:?}", account),
        Err(e) => warn!("Session not connected at startup: {}", e),
    }

    let state = AppState::new(bridge, relay);

    let mut worker_manager = WorkerManager::new();
    worker_manager.start(state.bridge.clone(), config.account_poll_interval);

    let app = create_router(state, &config.allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Start the server
    info!("Server running at http://{}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker_manager.stop().await;
    info!("Application shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
