//! Dashboard HTTP Server Binary
//!
//! Main entry point for the dashboard REST API server. It loads configuration,
//! creates the warehouse, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run against the built-in demo dataset (default)
//! cargo run --bin fiberops-server
//!
//! # Run against a JSON seed
//! WAREHOUSE_SEED_PATH=data/seed.json cargo run --bin fiberops-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `WAREHOUSE_TYPE`: Warehouse backend (default: local)
//! - `WAREHOUSE_SEED_PATH`: JSON dataset for the local warehouse
//! - `WAREHOUSE_SCHEMA`: Schema qualifier (default: SNOWFLAKE_EXAMPLE.FIBERIFIC)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fiberops::db::{DashboardConfig, WarehouseFactory};
use fiberops::http::{create_router, AppState};
use fiberops::query::QueryBuilder;
use fiberops::services::{Dashboard, ReportRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting dashboard HTTP server");

    let config = DashboardConfig::load()?;
    let warehouse = WarehouseFactory::create(&config)?;
    info!("Warehouse initialized ({})", warehouse.backend_name());

    let runner = ReportRunner::new(warehouse, QueryBuilder::new(config.schema()?));
    let state = AppState::new(Dashboard::new(runner));

    // Create router with all endpoints
    let app = create_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
