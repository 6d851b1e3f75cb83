//! Dashboard configuration file and environment variable handling.
//!
//! Configuration comes from `dashboard.toml` when one is found, with
//! environment variables layered on top:
//!
//! - `WAREHOUSE_TYPE` (optional, default: `local`)
//! - `WAREHOUSE_SEED_PATH` (optional): JSON dataset for the local warehouse
//! - `WAREHOUSE_SCHEMA` (optional, default: `SNOWFLAKE_EXAMPLE.FIBERIFIC`)
//! - `HOST` (optional, default: `0.0.0.0`)
//! - `PORT` (optional, default: `8080`)

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::factory::WarehouseType;
use super::warehouse::{WarehouseError, WarehouseResult};
use crate::query::{SchemaName, DEFAULT_SCHEMA};

/// Configuration loaded from `dashboard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub warehouse: WarehouseSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// `[warehouse]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSettings {
    #[serde(rename = "type", default = "default_warehouse_type")]
    pub warehouse_type: String,
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    #[serde(default = "default_schema")]
    pub schema: String,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_warehouse_type() -> String {
    "local".to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            warehouse_type: default_warehouse_type(),
            seed_path: None,
            schema: default_schema(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// A configuration error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> WarehouseResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            WarehouseError::configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            WarehouseError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `dashboard.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> WarehouseResult<Self> {
        let search_paths = [
            PathBuf::from("dashboard.toml"),
            PathBuf::from("backend/dashboard.toml"),
            PathBuf::from("../dashboard.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(WarehouseError::configuration(
            "No dashboard.toml found in standard locations",
        ))
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> WarehouseResult<Self> {
        Self::default().with_env_overrides()
    }

    /// The file from the default location if there is one, otherwise the
    /// defaults; environment variables win either way.
    pub fn load() -> WarehouseResult<Self> {
        let base = match Self::from_default_location() {
            Ok(config) => config,
            Err(_) => {
                log::debug!("No dashboard.toml found, using defaults");
                Self::default()
            }
        };
        base.with_env_overrides()
    }

    /// Apply `WAREHOUSE_*`, `HOST` and `PORT` on top of this configuration.
    pub fn with_env_overrides(mut self) -> WarehouseResult<Self> {
        if let Ok(value) = env::var("WAREHOUSE_TYPE") {
            self.warehouse.warehouse_type = value;
        }
        if let Ok(value) = env::var("WAREHOUSE_SEED_PATH") {
            self.warehouse.seed_path = (!value.trim().is_empty()).then(|| PathBuf::from(value));
        }
        if let Ok(value) = env::var("WAREHOUSE_SCHEMA") {
            self.warehouse.schema = value;
        }
        if let Ok(value) = env::var("HOST") {
            self.server.host = value;
        }
        if let Ok(value) = env::var("PORT") {
            self.server.port = value.trim().parse().map_err(|_| {
                WarehouseError::configuration(format!("PORT must be a port number, got '{}'", value))
            })?;
        }
        Ok(self)
    }

    /// Parsed `[warehouse] type`.
    pub fn warehouse_type(&self) -> WarehouseResult<WarehouseType> {
        self.warehouse
            .warehouse_type
            .parse()
            .map_err(WarehouseError::configuration)
    }

    /// Validated schema qualifier.
    pub fn schema(&self) -> WarehouseResult<SchemaName> {
        SchemaName::parse(&self.warehouse.schema).map_err(|e| {
            WarehouseError::configuration(format!("Invalid warehouse schema: {}", e))
        })
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.warehouse_type().unwrap(), WarehouseType::Local);
        assert_eq!(config.schema().unwrap().as_str(), DEFAULT_SCHEMA);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_from_file_with_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[warehouse]\nschema = \"ANALYTICS.NETOPS\"\n\n[server]\nport = 9000"
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.warehouse.warehouse_type, "local");
        assert_eq!(config.schema().unwrap().as_str(), "ANALYTICS.NETOPS");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[warehouse\ntype = ").unwrap();
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_invalid_schema_is_configuration_error() {
        let mut config = DashboardConfig::default();
        config.warehouse.schema = "FIBER; DROP".to_string();
        assert_eq!(config.schema().unwrap_err().kind(), "configuration");
    }

    #[test]
    fn test_unknown_warehouse_type() {
        let mut config = DashboardConfig::default();
        config.warehouse.warehouse_type = "oracle".to_string();
        assert!(config.warehouse_type().is_err());
    }
}
