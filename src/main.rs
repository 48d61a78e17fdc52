use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use storefront_cart::{
    handlers::{create_router, CartState, ServiceInfo},
    init_observability,
    repositories::{FilePersistenceSlot, HttpStorefrontApi},
    CartManager, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_environment().context("Failed to load configuration")?;

    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        &config.observability.log_level,
        config.observability.enable_json_logging,
    )?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!("Storefront API: {}", config.storefront.api_base_url);

    let metrics = Arc::new(Metrics::new()?);

    let api = Arc::new(
        HttpStorefrontApi::new(&config.storefront.api_base_url)
            .context("Failed to build storefront API client")?,
    );
    let slot = Arc::new(FilePersistenceSlot::new(
        &config.storage.storage_dir,
        config.storage.storage_key.clone(),
    ));
    info!("Persistence slot: {}", slot.path().display());

    let manager = CartManager::load(api.clone(), api, slot)
        .await
        .context("Failed to read persisted cart")?;
    info!("Cart loaded with {} line items", manager.cart_size());

    let service = ServiceInfo::new(
        config.observability.service_name.clone(),
        config.observability.service_version.clone(),
    );
    let app = create_router(CartState::new(manager, metrics, service));

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("Failed to parse host address")?,
        config.server.port,
    );
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
