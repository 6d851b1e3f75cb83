//! Single-report execution.

use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

use super::error::ReportError;
use super::normalize::{normalize, Normalized};
use crate::db::{Warehouse, WarehouseError, WarehouseResult};
use crate::models::{
    CellValue, DashboardTab, DerivedMetric, FilterState, ReportKind, TabularResult,
};
use crate::query::{report_spec, QueryBuilder, Statement};

/// One report's normalized rows and derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutput {
    pub report: ReportKind,
    pub title: &'static str,
    pub tab: DashboardTab,
    /// Fingerprint of the statement that produced the rows.
    pub fingerprint: String,
    pub table: TabularResult,
    pub metrics: Vec<DerivedMetric>,
}

impl ReportOutput {
    /// Scalar metric by key.
    pub fn scalar(&self, key: &str) -> Option<&CellValue> {
        self.metrics.iter().find_map(|m| match m {
            DerivedMetric::Scalar { key: k, value, .. } if k == key => Some(value),
            _ => None,
        })
    }

    /// Table metric by key.
    pub fn metric_table(&self, key: &str) -> Option<&TabularResult> {
        self.metrics.iter().find_map(|m| match m {
            DerivedMetric::Table { key: k, table } if k == key => Some(table),
            _ => None,
        })
    }
}

/// Builds, executes and normalizes reports against an injected warehouse.
///
/// Cloning is cheap; clones share the warehouse handle.
#[derive(Clone)]
pub struct ReportRunner {
    warehouse: Arc<dyn Warehouse>,
    builder: QueryBuilder,
}

impl ReportRunner {
    pub fn new(warehouse: Arc<dyn Warehouse>, builder: QueryBuilder) -> Self {
        Self { warehouse, builder }
    }

    pub fn warehouse(&self) -> &Arc<dyn Warehouse> {
        &self.warehouse
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Produce one report for the current filters.
    ///
    /// No retries: a warehouse failure is returned as `QueryExecutionFailed`
    /// and left to the caller.
    pub async fn run(
        &self,
        kind: ReportKind,
        filters: &FilterState,
    ) -> Result<ReportOutput, ReportError> {
        let statement = self
            .builder
            .build(kind, filters)
            .map_err(|source| ReportError::InvalidFilterValue {
                report: kind,
                source,
            })?;

        let raw = self.execute(&statement).await.map_err(|source| {
            ReportError::QueryExecutionFailed {
                report: kind,
                source,
            }
        })?;

        let Normalized { table, metrics } = normalize(kind, raw).map_err(|e| {
            ReportError::QueryExecutionFailed {
                report: kind,
                source: WarehouseError::from(e)
                    .with_operation("normalize")
                    .with_report(kind.as_str())
                    .with_fingerprint(statement.fingerprint()),
            }
        })?;

        let spec = report_spec(kind);
        Ok(ReportOutput {
            report: kind,
            title: spec.title,
            tab: spec.tab,
            fingerprint: statement.fingerprint().to_string(),
            table,
            metrics,
        })
    }

    /// Seed a [`FilterState`] from the distinct states in the warehouse.
    pub async fn load_filter_state(&self) -> WarehouseResult<FilterState> {
        let statement = self.builder.states_lookup();
        let raw = self.execute(&statement).await?;
        let idx = raw.require_column("state").map_err(|e| {
            WarehouseError::from(e)
                .with_operation("load_filter_state")
                .with_report(statement.target().label())
        })?;

        let states: Vec<String> = raw
            .rows()
            .iter()
            .filter_map(|row| match row.get(idx) {
                Some(CellValue::String(s)) => Some(s.trim().to_string()),
                Some(CellValue::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect();
        debug!("Loaded {} states for the filter panel", states.len());
        Ok(FilterState::new(states))
    }

    async fn execute(&self, statement: &Statement) -> WarehouseResult<TabularResult> {
        debug!(
            "Executing {} on {} warehouse (statement {})",
            statement.target().label(),
            self.warehouse.backend_name(),
            statement.fingerprint()
        );
        match self.warehouse.execute(statement).await {
            Ok(result) => {
                debug!(
                    "{} returned {} rows",
                    statement.target().label(),
                    result.row_count()
                );
                Ok(result)
            }
            Err(e) => {
                warn!("{} failed: {}", statement.target().label(), e);
                Err(e)
            }
        }
    }
}
