//! Report identifiers and dashboard placement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independently executable query + normalization unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    KpiSummary,
    NodeHealth,
    EventsByType,
    EventsBySeverity,
    CircuitUtilization,
    CapacityDistribution,
    MrrBySegment,
    ChurnRisk,
    CustomersByIndustry,
    AiTicketSentiment,
}

impl ReportKind {
    /// Every report, in the order the dashboard lays them out.
    pub const ALL: [ReportKind; 10] = [
        ReportKind::KpiSummary,
        ReportKind::NodeHealth,
        ReportKind::EventsByType,
        ReportKind::EventsBySeverity,
        ReportKind::CircuitUtilization,
        ReportKind::CapacityDistribution,
        ReportKind::MrrBySegment,
        ReportKind::ChurnRisk,
        ReportKind::CustomersByIndustry,
        ReportKind::AiTicketSentiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::KpiSummary => "kpi_summary",
            ReportKind::NodeHealth => "node_health",
            ReportKind::EventsByType => "events_by_type",
            ReportKind::EventsBySeverity => "events_by_severity",
            ReportKind::CircuitUtilization => "circuit_utilization",
            ReportKind::CapacityDistribution => "capacity_distribution",
            ReportKind::MrrBySegment => "mrr_by_segment",
            ReportKind::ChurnRisk => "churn_risk",
            ReportKind::CustomersByIndustry => "customers_by_industry",
            ReportKind::AiTicketSentiment => "ai_ticket_sentiment",
        }
    }

    /// Position in [`ReportKind::ALL`].
    pub fn ordinal(&self) -> usize {
        ReportKind::ALL
            .iter()
            .position(|k| k == self)
            .unwrap_or(ReportKind::ALL.len())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    /// Accepts both `node_health` and `node-health` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ReportKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("Unknown report: {}", s))
    }
}

/// Section of the dashboard a report feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    /// Metric tiles above the tabs.
    Kpi,
    NetworkHealth,
    CircuitUtilization,
    CustomerIntelligence,
    AiTicketAnalysis,
}

impl DashboardTab {
    pub fn title(&self) -> &'static str {
        match self {
            DashboardTab::Kpi => "KPIs",
            DashboardTab::NetworkHealth => "Network Health",
            DashboardTab::CircuitUtilization => "Circuit Utilization",
            DashboardTab::CustomerIntelligence => "Customer Intelligence",
            DashboardTab::AiTicketAnalysis => "AI Ticket Analysis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_round_trips_through_str() {
        for kind in ReportKind::ALL {
            assert_eq!(kind.as_str().parse::<ReportKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_report_kind_accepts_kebab_case() {
        assert_eq!(
            "capacity-distribution".parse::<ReportKind>().unwrap(),
            ReportKind::CapacityDistribution
        );
        assert!("sky_map".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_ordinal_follows_layout_order() {
        assert_eq!(ReportKind::KpiSummary.ordinal(), 0);
        assert_eq!(ReportKind::AiTicketSentiment.ordinal(), 9);
    }
}
