use anyhow::Result;
use partforge_api_gateway::{create_app, AppState};
use partforge_database::{initialize_database, PurchaseHistoryRepository};
use partforge_utils::{init_logging, AppConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting Partforge API Gateway");

    // Initialize database
    let db_config = partforge_database::DatabaseConfig {
        postgres_url: config.database.postgres_url.clone(),
        max_connections: config.database.max_connections,
        connection_timeout: std::time::Duration::from_secs(config.database.connection_timeout_seconds),
    };
    let postgres_pool = initialize_database(&db_config).await?;
    info!("Database connection established");

    let price_history = Arc::new(PurchaseHistoryRepository::new(postgres_pool.clone()));
    info!(
        composition_root = %config.bom.composition_root.display(),
        parts_root = %config.bom.parts_root.display(),
        max_depth = config.bom.max_depth,
        cycle_policy = ?config.bom.cycle_policy,
        "BOM engine configured"
    );

    // Build application router
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(config, price_history, Some(postgres_pool))?;
    let app = create_app(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("API Gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
