//! Warehouse implementations.
//!
//! - [`LocalWarehouse`]: in-memory tables for development and demos
//! - [`TestWarehouse`]: scripted responses for tests

#[cfg(feature = "local-warehouse")]
pub mod dataset;
#[cfg(feature = "local-warehouse")]
pub mod local;
pub mod scripted;

#[cfg(feature = "local-warehouse")]
pub use dataset::Dataset;
#[cfg(feature = "local-warehouse")]
pub use local::LocalWarehouse;
pub use scripted::{ScriptedResponse, TestWarehouse};
