//! Report failures.

use thiserror::Error;

use crate::db::WarehouseError;
use crate::models::ReportKind;
use crate::query::QueryBuildError;

/// Why a single report could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    /// The current filters cannot be rendered into a statement.
    #[error("{report}: invalid filter value: {source}")]
    InvalidFilterValue {
        report: ReportKind,
        #[source]
        source: QueryBuildError,
    },

    /// The warehouse failed, or returned a result the report cannot use.
    #[error("{report}: query execution failed: {source}")]
    QueryExecutionFailed {
        report: ReportKind,
        #[source]
        source: WarehouseError,
    },
}

impl ReportError {
    pub fn report(&self) -> ReportKind {
        match self {
            ReportError::InvalidFilterValue { report, .. }
            | ReportError::QueryExecutionFailed { report, .. } => *report,
        }
    }

    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::InvalidFilterValue { .. } => "INVALID_FILTER_VALUE",
            ReportError::QueryExecutionFailed { .. } => "QUERY_EXECUTION_FAILED",
        }
    }
}
