//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::WarehouseError;
use crate::query::QueryBuildError;
use crate::services::ReportError;

/// API error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&ReportError> for ApiError {
    fn from(err: &ReportError) -> Self {
        let details = match err {
            ReportError::InvalidFilterValue { source, .. } => source.to_string(),
            ReportError::QueryExecutionFailed { source, .. } => source.context().to_string(),
        };
        ApiError::new(err.code(), err.to_string()).with_details(details)
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// A filter parameter failed literal sanitation
    InvalidFilter(QueryBuildError),
    /// Internal server error
    Internal(String),
    /// A single report failed
    Report(ReportError),
    /// Warehouse error outside of a report (health, filter lookup)
    Warehouse(WarehouseError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::InvalidFilter(e) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_FILTER_VALUE", "Invalid filter value")
                    .with_details(e.to_string()),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Report(e) => {
                let status = match e {
                    ReportError::InvalidFilterValue { .. } => StatusCode::BAD_REQUEST,
                    ReportError::QueryExecutionFailed { .. } => StatusCode::BAD_GATEWAY,
                };
                (status, ApiError::from(&e))
            }
            AppError::Warehouse(e) => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("WAREHOUSE_ERROR", e.to_string()).with_details(e.kind()),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::Report(err)
    }
}

impl From<WarehouseError> for AppError {
    fn from(err: WarehouseError) -> Self {
        AppError::Warehouse(err)
    }
}
