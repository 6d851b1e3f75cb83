//! Render pass: every report recomputed from one [`FilterState`].
//!
//! The reports are independent, so a pass fans them out on a [`JoinSet`] and
//! collects the results back into catalog order. A failing report only fails
//! its own panel.
//!
//! Dropping the future returned by [`Dashboard::render`] drops the `JoinSet`,
//! which aborts every report still waiting on the warehouse. Nothing from an
//! abandoned pass is ever returned.

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::task::JoinSet;
use uuid::Uuid;

use super::error::ReportError;
use super::runner::{ReportOutput, ReportRunner};
use crate::db::{WarehouseError, WarehouseResult};
use crate::models::{FilterState, ReportKind};
use crate::query::REPORT_CATALOG;

/// Outcome of one report within a pass.
pub type ReportResult = Result<ReportOutput, ReportError>;

/// Everything produced by one render pass.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub render_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Filters the pass was computed from.
    pub filters: FilterState,
    /// One entry per catalog report, in catalog order.
    pub reports: Vec<ReportResult>,
}

impl DashboardSnapshot {
    pub fn report(&self, kind: ReportKind) -> Option<&ReportResult> {
        self.reports.get(kind.ordinal())
    }

    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_err()).count()
    }
}

/// Dashboard front door used by hosts.
#[derive(Clone)]
pub struct Dashboard {
    runner: ReportRunner,
}

impl Dashboard {
    pub fn new(runner: ReportRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &ReportRunner {
        &self.runner
    }

    /// Initial filter state: every state the warehouse knows, all selected.
    pub async fn initial_filters(&self) -> WarehouseResult<FilterState> {
        self.runner.load_filter_state().await
    }

    /// Recompute a single report.
    pub async fn report(&self, kind: ReportKind, filters: &FilterState) -> ReportResult {
        self.runner.run(kind, filters).await
    }

    /// Recompute every report from `filters`.
    pub async fn render(&self, filters: &FilterState) -> DashboardSnapshot {
        let render_id = Uuid::new_v4();
        let mut tasks = JoinSet::new();
        for (idx, spec) in REPORT_CATALOG.iter().enumerate() {
            let runner = self.runner.clone();
            let filters = filters.clone();
            let kind = spec.kind;
            tasks.spawn(async move { (idx, runner.run(kind, &filters).await) });
        }

        let mut slots: Vec<Option<ReportResult>> = (0..REPORT_CATALOG.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => warn!("Render {}: report task ended abnormally: {}", render_id, e),
            }
        }

        let reports: Vec<ReportResult> = slots
            .into_iter()
            .zip(REPORT_CATALOG.iter())
            .map(|(slot, spec)| {
                slot.unwrap_or_else(|| {
                    Err(ReportError::QueryExecutionFailed {
                        report: spec.kind,
                        source: WarehouseError::internal("Report task did not complete")
                            .with_operation("render")
                            .with_report(spec.kind.as_str()),
                    })
                })
            })
            .collect();

        let snapshot = DashboardSnapshot {
            render_id,
            generated_at: Utc::now(),
            filters: filters.clone(),
            reports,
        };
        info!(
            "Render {} finished: {} reports, {} failed",
            render_id,
            snapshot.reports.len(),
            snapshot.failed_count()
        );
        snapshot
    }
}
