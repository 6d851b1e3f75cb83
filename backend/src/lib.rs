//! # Fiber Network Operations Dashboard Backend
//!
//! Report engine behind the network operations dashboard of a fiber
//! provider: network health, circuit utilization, customer intelligence and
//! AI-assisted ticket analysis, all computed from one set of filters.
//!
//! ## Architecture
//!
//! - [`models`]: filter state, report identifiers, tabular results, derived metrics
//! - [`query`]: the report catalog and the SQL statement builder
//! - [`db`]: the warehouse contract, local and scripted warehouses, configuration
//! - [`services`]: report execution, normalization and the concurrent render pass
//! - [`http`]: axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fiberops::db::LocalWarehouse;
//! use fiberops::query::QueryBuilder;
//! use fiberops::services::{Dashboard, ReportRunner};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = ReportRunner::new(Arc::new(LocalWarehouse::demo()), QueryBuilder::default());
//! let dashboard = Dashboard::new(runner);
//!
//! let mut filters = dashboard.initial_filters().await?;
//! filters.select_states(["CA", "TX"]);
//! let snapshot = dashboard.render(&filters).await;
//! assert_eq!(snapshot.reports.len(), 10);
//! # Ok(())
//! # }
//! ```

// WarehouseError carries a structured context for every failure
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod query;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
