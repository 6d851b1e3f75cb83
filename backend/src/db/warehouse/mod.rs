//! Warehouse collaborator contract.
//!
//! The dashboard never opens or owns a warehouse session. Whatever hosts it
//! creates a [`Warehouse`] implementation and hands an `Arc<dyn Warehouse>` to
//! the [`ReportRunner`](crate::services::ReportRunner).
//!
//! # Cancellation
//!
//! Dropping the future returned by [`Warehouse::execute`] is the cancellation
//! signal. Implementations must release any in-flight work when that happens
//! and must not hand partial results to anyone.

use async_trait::async_trait;

pub mod error;

pub use error::{ErrorContext, WarehouseError, WarehouseResult};

use crate::models::TabularResult;
use crate::query::Statement;

/// Executes SQL statements and returns tabular results.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; a render pass executes several
/// statements concurrently against the same handle.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute `statement` and return its full result set.
    ///
    /// An empty result set is `Ok` with zero rows.
    async fn execute(&self, statement: &Statement) -> WarehouseResult<TabularResult>;

    /// Check whether the warehouse is reachable.
    async fn health_check(&self) -> WarehouseResult<bool>;

    /// Short backend name for diagnostics ("local", "test", ...).
    fn backend_name(&self) -> &'static str;
}
