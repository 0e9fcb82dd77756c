use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use image_vault::{config::Config, routes::create_router, storage, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    let store = storage::create_store(&config.storage)?;
    info!(
        provider = store.provider(),
        bucket = %config.storage.bucket,
        "Object store ready"
    );

    let state = AppState::new(store, config.clone());
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;
    info!("Server running on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
