//! Static description of every dashboard report.

use serde::Serialize;

use crate::models::{DashboardTab, ReportKind};

/// Rolling window for critical events on the KPI row.
pub const KPI_EVENT_WINDOW_DAYS: u32 = 7;
/// Rolling window for node health and the event breakdown charts.
pub const NETWORK_EVENT_WINDOW_DAYS: u32 = 30;
/// Rolling window for traffic samples.
pub const TRAFFIC_WINDOW_DAYS: u32 = 7;

/// Customers below this NPS are flagged as churn risks.
pub const CHURN_NPS_BELOW: i64 = 20;
/// Customers renewing within this many days are flagged as churn risks.
pub const CHURN_RENEWAL_WITHIN_DAYS: i64 = 90;

/// Table names inside the warehouse schema.
pub mod tables {
    pub const NETWORK_NODES: &str = "RAW_NETWORK_NODES";
    pub const NETWORK_CIRCUITS: &str = "RAW_NETWORK_CIRCUITS";
    pub const NETWORK_EVENTS: &str = "RAW_NETWORK_EVENTS";
    pub const TRAFFIC_METRICS: &str = "RAW_TRAFFIC_METRICS";
    pub const CUSTOMERS: &str = "RAW_CUSTOMERS";
    pub const TICKETS: &str = "RAW_TICKETS";
}

/// Immutable definition of one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSpec {
    pub kind: ReportKind,
    pub title: &'static str,
    pub tab: DashboardTab,
    /// Consumes the state selection.
    pub uses_states: bool,
    /// Consumes the severity selection.
    pub uses_severity: bool,
    /// Consumes the AI sample size as its row limit.
    pub uses_ai_sample_size: bool,
    /// Rolling window relative to execution time, if any.
    pub window_days: Option<u32>,
    /// Fixed row limit, if any.
    pub row_limit: Option<u32>,
}

const fn spec(kind: ReportKind, title: &'static str, tab: DashboardTab) -> ReportSpec {
    ReportSpec {
        kind,
        title,
        tab,
        uses_states: false,
        uses_severity: false,
        uses_ai_sample_size: false,
        window_days: None,
        row_limit: None,
    }
}

/// All reports in layout order.
pub static REPORT_CATALOG: [ReportSpec; 10] = [
    ReportSpec {
        uses_states: true,
        window_days: Some(KPI_EVENT_WINDOW_DAYS),
        ..spec(ReportKind::KpiSummary, "Key Metrics", DashboardTab::Kpi)
    },
    ReportSpec {
        uses_states: true,
        uses_severity: true,
        window_days: Some(NETWORK_EVENT_WINDOW_DAYS),
        row_limit: Some(25),
        ..spec(
            ReportKind::NodeHealth,
            "Network Health by Node",
            DashboardTab::NetworkHealth,
        )
    },
    ReportSpec {
        window_days: Some(NETWORK_EVENT_WINDOW_DAYS),
        ..spec(
            ReportKind::EventsByType,
            "Events by Type (30 days)",
            DashboardTab::NetworkHealth,
        )
    },
    ReportSpec {
        window_days: Some(NETWORK_EVENT_WINDOW_DAYS),
        ..spec(
            ReportKind::EventsBySeverity,
            "Events by Severity (30 days)",
            DashboardTab::NetworkHealth,
        )
    },
    ReportSpec {
        window_days: Some(TRAFFIC_WINDOW_DAYS),
        row_limit: Some(30),
        ..spec(
            ReportKind::CircuitUtilization,
            "Circuit Utilization Overview",
            DashboardTab::CircuitUtilization,
        )
    },
    ReportSpec {
        window_days: Some(TRAFFIC_WINDOW_DAYS),
        ..spec(
            ReportKind::CapacityDistribution,
            "Capacity Status Distribution",
            DashboardTab::CircuitUtilization,
        )
    },
    spec(
        ReportKind::MrrBySegment,
        "MRR by Segment",
        DashboardTab::CustomerIntelligence,
    ),
    ReportSpec {
        row_limit: Some(15),
        ..spec(
            ReportKind::ChurnRisk,
            "Churn Risk Indicators",
            DashboardTab::CustomerIntelligence,
        )
    },
    spec(
        ReportKind::CustomersByIndustry,
        "Customers by Industry",
        DashboardTab::CustomerIntelligence,
    ),
    ReportSpec {
        uses_ai_sample_size: true,
        ..spec(
            ReportKind::AiTicketSentiment,
            "AI-Powered Ticket Analysis",
            DashboardTab::AiTicketAnalysis,
        )
    },
];

/// Look up the definition of `kind`.
pub fn report_spec(kind: ReportKind) -> &'static ReportSpec {
    &REPORT_CATALOG[kind.ordinal()]
}
