//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for report execution.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{
    DashboardResponse, FilterQuery, FiltersResponse, HealthResponse, ReportCatalogResponse,
    ReportPanel,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::ReportKind;
use crate::query::REPORT_CATALOG;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the warehouse is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let warehouse = state.dashboard.runner().warehouse();
    let status = match warehouse.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        backend: warehouse.backend_name().to_string(),
        warehouse: status,
    }))
}

// =============================================================================
// Filters and catalog
// =============================================================================

/// GET /v1/filters
///
/// Filter panel options: known states, severity choices, AI sample size range.
pub async fn get_filters(State(state): State<AppState>) -> HandlerResult<FiltersResponse> {
    let filters = state.base_filters().await?;
    Ok(Json(FiltersResponse::from_filters(&filters)))
}

/// GET /v1/reports
///
/// Static description of every report in layout order.
pub async fn list_reports() -> HandlerResult<ReportCatalogResponse> {
    Ok(Json(ReportCatalogResponse {
        reports: REPORT_CATALOG.to_vec(),
        total: REPORT_CATALOG.len(),
    }))
}

// =============================================================================
// Rendering
// =============================================================================

/// GET /v1/dashboard?states=CA,TX&severity=CRITICAL&ai_limit=10
///
/// Recompute every report. Failed reports come back as failed panels; the
/// request itself succeeds.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> HandlerResult<DashboardResponse> {
    let filters = query.apply(state.base_filters().await?)?;
    let snapshot = state.dashboard.render(&filters).await;
    Ok(Json(DashboardResponse::from(&snapshot)))
}

/// GET /v1/reports/{report}
///
/// Recompute one report with the same filter parameters as the dashboard.
pub async fn get_report(
    State(state): State<AppState>,
    Path(report): Path<String>,
    Query(query): Query<FilterQuery>,
) -> HandlerResult<ReportPanel> {
    let kind: ReportKind = report
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown report: {}", report)))?;
    let filters = query.apply(state.base_filters().await?)?;
    let result = state.dashboard.report(kind, &filters).await;
    match result {
        Ok(_) => Ok(Json(ReportPanel::from_result(kind, &result))),
        Err(e) => Err(AppError::Report(e)),
    }
}
