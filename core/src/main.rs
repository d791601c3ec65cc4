//! Medistock sync runner
//!
//! Opens the local store, seeds the demo catalog when configured, runs one
//! reconciliation pass against the remote document store, and prints the
//! system stats.

use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medistock_core::external::RestDocumentStore;
use medistock_core::services::{
    CatalogService, OrderService, ReconcileService, ReportService, SyncService,
};
use medistock_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medistock=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Medistock sync runner");
    tracing::info!("Environment: {}", config.environment);

    // Open the local store
    let db_pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Local store opened");

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("Migrations completed");

    let catalog = CatalogService::new(db_pool.clone());
    let orders = OrderService::new(db_pool.clone());
    let reports = ReportService::new(db_pool.clone());

    if config.seed.demo_data {
        let seeded = catalog.seed_demo_products().await?;
        if seeded > 0 {
            tracing::info!(count = seeded, "demo catalog seeded");
        }
    }

    if config.remote.enabled {
        let store = Arc::new(RestDocumentStore::new(
            config.remote.base_url.clone(),
            config.remote.api_key.clone(),
        ));
        let sync = SyncService::new(store);
        let reconcile = ReconcileService::new(catalog.clone(), orders.clone(), sync);

        let report = reconcile.run().await?;
        tracing::info!(
            products_pushed = report.products_pushed,
            products_pulled = report.products_pulled,
            orders_pushed = report.orders_pushed,
            "sync finished"
        );
    } else {
        tracing::info!("Remote sync disabled, skipping reconciliation");
    }

    let stats = reports.system_stats().await?;
    tracing::info!(
        active_products = stats.active_products,
        orders = stats.orders,
        low_stock = stats.low_stock_products,
        delivered = stats.delivered_orders,
        "system stats"
    );

    Ok(())
}
