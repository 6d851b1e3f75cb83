//! Warehouse access for dashboard reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer / embedding host                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service layer (services) - ReportRunner, Dashboard     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Warehouse trait (warehouse) - Abstract Interface       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │ LocalWarehouse  TestWarehouse │
//!     └──────────────────────────────┘
//! ```
//!
//! There is no process-wide warehouse. Hosts create a handle (directly or via
//! [`WarehouseFactory`]) and pass it to the services that need it.

pub mod config;
pub mod factory;
pub mod warehouse;
pub mod warehouses;

pub use config::{DashboardConfig, ServerSettings, WarehouseSettings};
pub use factory::{WarehouseFactory, WarehouseType};
pub use warehouse::{ErrorContext, Warehouse, WarehouseError, WarehouseResult};
#[cfg(feature = "local-warehouse")]
pub use warehouses::{Dataset, LocalWarehouse};
pub use warehouses::{ScriptedResponse, TestWarehouse};
