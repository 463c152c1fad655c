use std::sync::Arc;

use product_catalog::app::product::ProductRepository;
use product_catalog::infrastructure::logger::Logger;
use product_catalog::{
    build_router, find_config_file, load_config, Config, MemoryProductRepository, ProductService,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = find_config_file();
    let config = load_config(config_path)?;
    let _log_guard = Logger::init(&config.logging)?;

    info!("Starting product catalog server...");
    match config_path {
        Some(path) => info!("Loaded configuration from {}", path),
        None => info!("No configuration file found, using defaults"),
    }

    let repository = open_repository(&config).await?;
    let service = ProductService::new(repository);
    let app = build_router(service, config.http.timeout());

    let listener = TcpListener::bind(config.http.socket_address()).await?;
    let addr = listener.local_addr()?;

    info!("🚀 Product catalog running on http://{}", addr);
    info!("   GET    /api/products      - List products (ascending price)");
    info!("   POST   /api/products      - Create product");
    info!("   GET    /api/products/:id  - Get product");
    info!("   PUT    /api/products/:id  - Update product");
    info!("   DELETE /api/products/:id  - Delete product");
    info!("   GET    /health            - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "database")]
async fn open_repository(config: &Config) -> anyhow::Result<Arc<dyn ProductRepository>> {
    use product_catalog::app::product::repository::PgProductRepository;
    use product_catalog::infrastructure::database::DatabaseManager;

    let Some(url) = config.database.url.as_deref() else {
        warn!("No database url configured, products are kept in memory only");
        return Ok(Arc::new(MemoryProductRepository::new()));
    };

    let database = DatabaseManager::new(url, &config.database).await?;
    let repository = PgProductRepository::new(database.into_pool());
    repository.ensure_schema().await?;
    Ok(Arc::new(repository))
}

#[cfg(not(feature = "database"))]
async fn open_repository(config: &Config) -> anyhow::Result<Arc<dyn ProductRepository>> {
    if config.database.url.is_some() {
        warn!("Built without the `database` feature, ignoring database url");
    }
    Ok(Arc::new(MemoryProductRepository::new()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
