//! Data Transfer Objects for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, AppError};
use crate::models::{
    DashboardTab, DerivedMetric, FilterState, ReportKind, Severity, TabularResult,
    AI_SAMPLE_SIZE_DEFAULT, AI_SAMPLE_SIZE_MAX, AI_SAMPLE_SIZE_MIN,
};
use crate::query::{report_spec, validate_literal, ReportSpec};
use crate::services::{DashboardSnapshot, ReportResult};

/// Filter query parameters shared by the dashboard and report endpoints.
///
/// `states` is a comma-separated list. When absent every known state is
/// selected; when present but empty no state is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub states: Option<String>,
    pub severity: Option<String>,
    pub ai_limit: Option<i64>,
}

impl FilterQuery {
    /// Apply the query on top of the default filter panel.
    ///
    /// A requested state that could never be a safe literal is rejected
    /// before unknown states are dropped.
    pub fn apply(&self, mut filters: FilterState) -> Result<FilterState, AppError> {
        if let Some(states) = &self.states {
            let requested: Vec<&str> = states
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            for state in &requested {
                validate_literal(state).map_err(AppError::InvalidFilter)?;
            }
            filters.select_states(requested);
        }
        if let Some(severity) = &self.severity {
            let severity: Severity = severity.parse().map_err(AppError::BadRequest)?;
            filters.set_severity(severity);
        }
        if let Some(limit) = self.ai_limit {
            filters.set_ai_sample_size(limit);
        }
        Ok(filters)
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub warehouse: String,
}

/// AI sample size slider bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSizeRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

/// Filter panel options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersResponse {
    pub states: Vec<String>,
    pub severity_options: Vec<Severity>,
    pub ai_sample_size: SampleSizeRange,
}

impl FiltersResponse {
    pub fn from_filters(filters: &FilterState) -> Self {
        Self {
            states: filters.known_states().map(str::to_string).collect(),
            severity_options: Severity::OPTIONS.to_vec(),
            ai_sample_size: SampleSizeRange {
                min: AI_SAMPLE_SIZE_MIN,
                max: AI_SAMPLE_SIZE_MAX,
                default: AI_SAMPLE_SIZE_DEFAULT,
            },
        }
    }
}

/// Report catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct ReportCatalogResponse {
    pub reports: Vec<ReportSpec>,
    pub total: usize,
}

/// Panel payload, successful or not.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelOutcome {
    Ready {
        fingerprint: String,
        table: TabularResult,
        metrics: Vec<DerivedMetric>,
    },
    Failed {
        error: ApiError,
    },
}

/// One dashboard panel.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPanel {
    pub report: ReportKind,
    pub title: &'static str,
    pub tab: DashboardTab,
    #[serde(flatten)]
    pub outcome: PanelOutcome,
}

impl ReportPanel {
    pub fn from_result(kind: ReportKind, result: &ReportResult) -> Self {
        let spec = report_spec(kind);
        let outcome = match result {
            Ok(output) => PanelOutcome::Ready {
                fingerprint: output.fingerprint.clone(),
                table: output.table.clone(),
                metrics: output.metrics.clone(),
            },
            Err(e) => PanelOutcome::Failed {
                error: ApiError::from(e),
            },
        };
        Self {
            report: kind,
            title: spec.title,
            tab: spec.tab,
            outcome,
        }
    }
}

/// Full render pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub render_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub filters: FilterState,
    pub panels: Vec<ReportPanel>,
}

impl From<&DashboardSnapshot> for DashboardResponse {
    fn from(snapshot: &DashboardSnapshot) -> Self {
        let panels = ReportKind::ALL
            .iter()
            .zip(&snapshot.reports)
            .map(|(kind, result)| ReportPanel::from_result(*kind, result))
            .collect();
        Self {
            render_id: snapshot.render_id,
            generated_at: snapshot.generated_at,
            filters: snapshot.filters.clone(),
            panels,
        }
    }
}
