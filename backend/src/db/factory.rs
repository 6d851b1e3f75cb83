//! Warehouse factory for dependency injection.
//!
//! The dashboard never opens warehouse sessions itself. This module turns a
//! [`DashboardConfig`] into an `Arc<dyn Warehouse>` for hosts that do not bring
//! their own handle.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::DashboardConfig;
use super::warehouse::{Warehouse, WarehouseError, WarehouseResult};
#[cfg(feature = "local-warehouse")]
use super::warehouses::{Dataset, LocalWarehouse};

/// Warehouse backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseType {
    /// In-memory local warehouse
    Local,
    /// Hosted Snowflake session supplied by the embedding application
    Snowflake,
}

impl FromStr for WarehouseType {
    type Err = String;

    /// Parse warehouse type from string ("local", "snowflake").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "snowflake" | "sf" => Ok(Self::Snowflake),
            _ => Err(format!("Unknown warehouse type: {}", s)),
        }
    }
}

impl WarehouseType {
    /// Get warehouse type from the `WAREHOUSE_TYPE` environment variable,
    /// defaulting to Local.
    pub fn from_env() -> Self {
        std::env::var("WAREHOUSE_TYPE")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(Self::Local)
    }
}

/// Factory for creating warehouse instances.
///
/// # Example
/// ```ignore
/// use fiberops::db::{DashboardConfig, WarehouseFactory};
///
/// let config = DashboardConfig::load()?;
/// let warehouse = WarehouseFactory::create(&config)?;
/// ```
pub struct WarehouseFactory;

impl WarehouseFactory {
    /// Create the warehouse named by `config`.
    ///
    /// # Errors
    /// A configuration error when the type is unknown, the seed cannot be
    /// loaded, or the backend cannot be created by this process.
    pub fn create(config: &DashboardConfig) -> WarehouseResult<Arc<dyn Warehouse>> {
        match config.warehouse_type()? {
            WarehouseType::Local => {
                #[cfg(feature = "local-warehouse")]
                {
                    let warehouse = Self::create_local(config.warehouse.seed_path.as_deref())?;
                    Ok(Arc::new(warehouse) as Arc<dyn Warehouse>)
                }
                #[cfg(not(feature = "local-warehouse"))]
                {
                    Err(WarehouseError::configuration(
                        "Local warehouse feature not enabled",
                    ))
                }
            }
            WarehouseType::Snowflake => Err(WarehouseError::configuration(
                "Snowflake sessions are owned by the host application; inject an Arc<dyn Warehouse> instead",
            )),
        }
    }

    /// Create a local warehouse from a JSON seed, or the demo dataset when no
    /// seed is given.
    #[cfg(feature = "local-warehouse")]
    pub fn create_local(seed_path: Option<&Path>) -> WarehouseResult<LocalWarehouse> {
        match seed_path {
            Some(path) => {
                log::info!("Loading local warehouse seed from {}", path.display());
                Ok(LocalWarehouse::new(Dataset::from_json_file(path)?))
            }
            None => Ok(LocalWarehouse::demo()),
        }
    }

    /// Create a warehouse from environment configuration only.
    pub fn from_env() -> WarehouseResult<Arc<dyn Warehouse>> {
        Self::create(&DashboardConfig::from_env()?)
    }

    /// Create a warehouse from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(config_path: P) -> WarehouseResult<Arc<dyn Warehouse>> {
        Self::create(&DashboardConfig::from_file(config_path)?)
    }
}
