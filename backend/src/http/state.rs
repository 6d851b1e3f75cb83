//! Application state for the HTTP server.

use parking_lot::RwLock;
use std::sync::Arc;

use super::error::AppError;
use crate::models::FilterState;
use crate::services::Dashboard;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    /// Filter panel seeded from the warehouse on first use.
    base_filters: Arc<RwLock<Option<FilterState>>>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            base_filters: Arc::new(RwLock::new(None)),
        }
    }

    /// Start from an already known filter panel instead of querying the
    /// warehouse for it.
    pub fn with_base_filters(self, filters: FilterState) -> Self {
        *self.base_filters.write() = Some(filters);
        self
    }

    /// The default filter panel: every known state selected.
    ///
    /// Loaded once from the warehouse; a failed load is retried on the next
    /// request.
    pub async fn base_filters(&self) -> Result<FilterState, AppError> {
        let cached = self.base_filters.read().clone();
        if let Some(filters) = cached {
            return Ok(filters);
        }
        let filters = self.dashboard.initial_filters().await?;
        *self.base_filters.write() = Some(filters.clone());
        Ok(filters)
    }
}
