//! Statement construction.
//!
//! [`QueryBuilder::build`] maps a report and the current [`FilterState`] to a
//! [`Statement`]: SQL text for the warehouse plus the typed values that were
//! bound into it. The text is assembled line by line so that optional clauses
//! disappear completely when unused, and the same inputs always produce
//! byte-identical SQL.

use serde::Serialize;

use super::catalog::{
    report_spec, tables, CHURN_NPS_BELOW, CHURN_RENEWAL_WITHIN_DAYS, KPI_EVENT_WINDOW_DAYS,
};
use super::error::QueryBuildResult;
use super::fingerprint::fingerprint_sql;
use super::literal::{in_list, quote_literal, SchemaName};
use crate::models::{FilterState, ReportKind, Severity};

/// What a statement computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "report", rename_all = "snake_case")]
pub enum StatementTarget {
    /// Distinct states used to seed a [`FilterState`].
    StatesLookup,
    Report(ReportKind),
}

impl StatementTarget {
    pub fn label(&self) -> &'static str {
        match self {
            StatementTarget::StatesLookup => "states_lookup",
            StatementTarget::Report(kind) => kind.as_str(),
        }
    }
}

/// Typed values embedded in a statement's SQL text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementBindings {
    /// Selected states, present only for state-filtered reports.
    pub states: Option<Vec<String>>,
    /// Severity equality filter; `None` when unused or `ALL`.
    pub severity: Option<Severity>,
    /// Row limit.
    pub limit: Option<u32>,
    /// Rolling window in days.
    pub window_days: Option<u32>,
}

/// SQL text ready for the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    target: StatementTarget,
    sql: String,
    bindings: StatementBindings,
    fingerprint: String,
}

impl Statement {
    fn new(target: StatementTarget, sql: String, bindings: StatementBindings) -> Self {
        let fingerprint = fingerprint_sql(&sql);
        Self {
            target,
            sql,
            bindings,
            fingerprint,
        }
    }

    pub fn target(&self) -> StatementTarget {
        self.target
    }

    /// Report this statement belongs to, if any.
    pub fn report(&self) -> Option<ReportKind> {
        match self.target {
            StatementTarget::Report(kind) => Some(kind),
            StatementTarget::StatesLookup => None,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &StatementBindings {
        &self.bindings
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Line-oriented SQL writer.
#[derive(Default)]
struct Sql {
    lines: Vec<String>,
}

impl Sql {
    fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn window(days: u32, column: &str) -> String {
    format!("{} >= DATEADD('day', -{}, CURRENT_TIMESTAMP())", column, days)
}

/// Renders report statements against one warehouse schema.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    schema: SchemaName,
}

impl QueryBuilder {
    pub fn new(schema: SchemaName) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SchemaName {
        &self.schema
    }

    fn table(&self, name: &str) -> String {
        self.schema.table(name)
    }

    /// Statement listing the distinct states known to the warehouse.
    pub fn states_lookup(&self) -> Statement {
        let sql = format!(
            "SELECT DISTINCT state FROM {} ORDER BY state",
            self.table(tables::NETWORK_NODES)
        );
        Statement::new(
            StatementTarget::StatesLookup,
            sql,
            StatementBindings::default(),
        )
    }

    /// Render the statement for `kind` under `filters`.
    ///
    /// Fails with `InvalidFilterValue` when a selected state cannot be
    /// embedded as a quoted literal.
    pub fn build(&self, kind: ReportKind, filters: &FilterState) -> QueryBuildResult<Statement> {
        let spec = report_spec(kind);
        let states: Vec<String> = filters.selected_states().map(str::to_string).collect();
        let severity = (spec.uses_severity && !filters.severity().is_all())
            .then(|| filters.severity());
        let limit = if spec.uses_ai_sample_size {
            Some(filters.ai_sample_size())
        } else {
            spec.row_limit
        };

        let bindings = StatementBindings {
            states: spec.uses_states.then(|| states.clone()),
            severity,
            limit,
            window_days: spec.window_days,
        };

        let sql = match kind {
            ReportKind::KpiSummary => self.kpi_summary(&states)?,
            ReportKind::NodeHealth => self.node_health(&states, severity, &bindings)?,
            ReportKind::EventsByType => self.events_breakdown("event_type", &bindings),
            ReportKind::EventsBySeverity => self.events_breakdown("severity", &bindings),
            ReportKind::CircuitUtilization => self.circuit_utilization(&bindings),
            ReportKind::CapacityDistribution => self.capacity_distribution(&bindings),
            ReportKind::MrrBySegment => self.mrr_by_segment(),
            ReportKind::ChurnRisk => self.churn_risk(&bindings),
            ReportKind::CustomersByIndustry => self.customers_by_industry(),
            ReportKind::AiTicketSentiment => self.ai_ticket_sentiment(&bindings),
        };

        Ok(Statement::new(StatementTarget::Report(kind), sql, bindings))
    }

    fn kpi_summary(&self, states: &[String]) -> QueryBuildResult<String> {
        let nodes = self.table(tables::NETWORK_NODES);
        let circuits = self.table(tables::NETWORK_CIRCUITS);
        let customers = self.table(tables::CUSTOMERS);
        let events = self.table(tables::NETWORK_EVENTS);
        let tickets = self.table(tables::TICKETS);

        let mut sql = Sql::default();
        sql.line("SELECT")
            .line(format!("  (SELECT COUNT(DISTINCT node_id) FROM {}", nodes))
            .line(format!("   WHERE {}) AS total_nodes,", in_list("state", states)?))
            .line(format!("  (SELECT COUNT(DISTINCT circuit_id) FROM {}", circuits))
            .line("   WHERE status = 'ACTIVE') AS active_circuits,")
            .line(format!("  (SELECT COUNT(DISTINCT customer_id) FROM {}", customers))
            .line("   WHERE status = 'ACTIVE') AS active_customers,")
            .line(format!("  (SELECT COUNT(DISTINCT event_id) FROM {}", events))
            .line(format!(
                "   WHERE {}",
                window(KPI_EVENT_WINDOW_DAYS, "event_timestamp")
            ))
            .line("     AND severity = 'CRITICAL') AS critical_events_7d,")
            .line(format!("  (SELECT ROUND(SUM(mrr), 0) FROM {}", customers))
            .line("   WHERE status = 'ACTIVE') AS total_mrr,")
            .line(format!("  (SELECT COUNT(DISTINCT ticket_id) FROM {}", tickets))
            .line("   WHERE status = 'OPEN') AS open_tickets");
        Ok(sql.finish())
    }

    fn node_health(
        &self,
        states: &[String],
        severity: Option<Severity>,
        bindings: &StatementBindings,
    ) -> QueryBuildResult<String> {
        let mut sql = Sql::default();
        sql.line("SELECT")
            .line("  n.node_name,")
            .line("  n.node_type,")
            .line("  n.city,")
            .line("  n.state,")
            .line("  n.status AS node_status,")
            .line("  COUNT(DISTINCT e.event_id) AS events_30d,")
            .line("  COUNT(DISTINCT CASE WHEN e.severity = 'CRITICAL' THEN e.event_id END) AS critical_30d,")
            .line("  COUNT(DISTINCT CASE WHEN e.resolved_at IS NULL AND e.event_type != 'MAINTENANCE'")
            .line("        THEN e.event_id END) AS open_incidents,")
            .line("  ROUND(AVG(e.duration_minutes), 1) AS avg_resolution_min")
            .line(format!("FROM {} n", self.table(tables::NETWORK_NODES)))
            .line(format!("LEFT JOIN {} e", self.table(tables::NETWORK_EVENTS)))
            .line("  ON n.node_id = e.node_id")
            .line(format!(
                "  AND {}",
                window(bindings.window_days.unwrap_or(30), "e.event_timestamp")
            ));
        if let Some(severity) = severity {
            sql.line(format!(
                "  AND e.severity = {}",
                quote_literal(severity.as_str())?
            ));
        }
        sql.line(format!("WHERE {}", in_list("n.state", states)?))
            .line("GROUP BY n.node_name, n.node_type, n.city, n.state, n.status")
            .line("ORDER BY events_30d DESC")
            .line(format!("LIMIT {}", bindings.limit.unwrap_or(25)));
        Ok(sql.finish())
    }

    fn events_breakdown(&self, dimension: &str, bindings: &StatementBindings) -> String {
        let mut sql = Sql::default();
        sql.line(format!("SELECT {}, COUNT(event_id) AS event_count", dimension))
            .line(format!("FROM {}", self.table(tables::NETWORK_EVENTS)))
            .line(format!(
                "WHERE {}",
                window(bindings.window_days.unwrap_or(30), "event_timestamp")
            ))
            .line(format!(
                "GROUP BY {} ORDER BY event_count DESC",
                dimension
            ));
        sql.finish()
    }

    fn circuit_utilization(&self, bindings: &StatementBindings) -> String {
        let mut sql = Sql::default();
        sql.line("SELECT")
            .line("  c.circuit_name,")
            .line("  c.circuit_type,")
            .line("  c.capacity_gbps,")
            .line("  ROUND(AVG(tm.inbound_gbps + tm.outbound_gbps), 4) AS avg_total_gbps,")
            .line("  ROUND(AVG(tm.inbound_gbps + tm.outbound_gbps) / NULLIF(c.capacity_gbps, 0) * 100, 1)")
            .line("    AS avg_util_pct,")
            .line("  ROUND(MAX(tm.inbound_gbps + tm.outbound_gbps) / NULLIF(c.capacity_gbps, 0) * 100, 1)")
            .line("    AS peak_util_pct,")
            .line("  ROUND(AVG(tm.latency_ms), 2) AS avg_latency_ms,")
            .line("  ROUND(AVG(tm.packet_loss_pct), 3) AS avg_loss_pct")
            .line(format!("FROM {} c", self.table(tables::NETWORK_CIRCUITS)))
            .line(format!("JOIN {} tm", self.table(tables::TRAFFIC_METRICS)))
            .line("  ON c.circuit_id = tm.circuit_id")
            .line(format!(
                "  AND {}",
                window(bindings.window_days.unwrap_or(7), "tm.metric_timestamp")
            ))
            .line("WHERE c.status = 'ACTIVE'")
            .line("GROUP BY c.circuit_name, c.circuit_type, c.capacity_gbps")
            .line("ORDER BY avg_util_pct DESC")
            .line(format!("LIMIT {}", bindings.limit.unwrap_or(30)));
        sql.finish()
    }

    /// Per-circuit peaks; bucketing happens after the fetch so that circuits
    /// without capacity can be excluded instead of landing in `NORMAL`.
    fn capacity_distribution(&self, bindings: &StatementBindings) -> String {
        let mut sql = Sql::default();
        sql.line("SELECT")
            .line("  c.circuit_id,")
            .line("  c.circuit_name,")
            .line("  c.capacity_gbps,")
            .line("  MAX(tm.inbound_gbps + tm.outbound_gbps) AS peak_total_gbps")
            .line(format!("FROM {} c", self.table(tables::NETWORK_CIRCUITS)))
            .line(format!("JOIN {} tm", self.table(tables::TRAFFIC_METRICS)))
            .line("  ON c.circuit_id = tm.circuit_id")
            .line(format!(
                "  AND {}",
                window(bindings.window_days.unwrap_or(7), "tm.metric_timestamp")
            ))
            .line("WHERE c.status = 'ACTIVE'")
            .line("GROUP BY c.circuit_id, c.circuit_name, c.capacity_gbps")
            .line("ORDER BY c.circuit_id");
        sql.finish()
    }

    fn mrr_by_segment(&self) -> String {
        let mut sql = Sql::default();
        sql.line("SELECT segment,")
            .line("  COUNT(customer_id) AS customers,")
            .line("  ROUND(SUM(mrr), 2) AS total_mrr,")
            .line("  ROUND(AVG(mrr), 2) AS avg_mrr")
            .line(format!("FROM {}", self.table(tables::CUSTOMERS)))
            .line("WHERE status = 'ACTIVE'")
            .line("GROUP BY segment ORDER BY total_mrr DESC");
        sql.finish()
    }

    fn churn_risk(&self, bindings: &StatementBindings) -> String {
        let days_to_renewal = "DATEDIFF('day', CURRENT_DATE(), cu.contract_end)";
        let mut sql = Sql::default();
        sql.line("SELECT")
            .line("  cu.company_name,")
            .line("  cu.segment,")
            .line("  cu.mrr,")
            .line("  cu.nps_score,")
            .line(format!("  {} AS days_to_renewal,", days_to_renewal))
            .line("  COUNT(DISTINCT t.ticket_id) AS total_tickets,")
            .line("  COUNT(DISTINCT CASE WHEN t.priority IN ('CRITICAL','HIGH') THEN t.ticket_id END)")
            .line("    AS high_pri_tickets")
            .line(format!("FROM {} cu", self.table(tables::CUSTOMERS)))
            .line(format!(
                "LEFT JOIN {} t ON cu.customer_id = t.customer_id",
                self.table(tables::TICKETS)
            ))
            .line("WHERE cu.status = 'ACTIVE'")
            .line(format!(
                "  AND (cu.nps_score < {} OR {} < {})",
                CHURN_NPS_BELOW, days_to_renewal, CHURN_RENEWAL_WITHIN_DAYS
            ))
            .line("GROUP BY cu.company_name, cu.segment, cu.mrr, cu.nps_score, cu.contract_end")
            .line("ORDER BY cu.mrr DESC")
            .line(format!("LIMIT {}", bindings.limit.unwrap_or(15)));
        sql.finish()
    }

    fn customers_by_industry(&self) -> String {
        let mut sql = Sql::default();
        sql.line("SELECT industry,")
            .line("  COUNT(customer_id) AS customers,")
            .line("  ROUND(SUM(mrr), 2) AS total_mrr,")
            .line("  ROUND(AVG(nps_score), 1) AS avg_nps")
            .line(format!("FROM {}", self.table(tables::CUSTOMERS)))
            .line("WHERE status = 'ACTIVE'")
            .line("GROUP BY industry ORDER BY total_mrr DESC");
        sql.finish()
    }

    fn ai_ticket_sentiment(&self, bindings: &StatementBindings) -> String {
        let mut sql = Sql::default();
        sql.line("SELECT")
            .line("  t.ticket_id,")
            .line("  cu.company_name,")
            .line("  t.category,")
            .line("  t.priority,")
            .line("  t.subject,")
            .line("  t.status AS ticket_status,")
            .line("  t.created_date,")
            .line("  ROUND(SNOWFLAKE.CORTEX.SENTIMENT(t.description), 3) AS sentiment_score,")
            .line("  SNOWFLAKE.CORTEX.SENTIMENT(t.description) AS sentiment_raw,")
            .line("  SNOWFLAKE.CORTEX.SUMMARIZE(t.description) AS ai_summary")
            .line(format!("FROM {} t", self.table(tables::TICKETS)))
            .line(format!(
                "LEFT JOIN {} cu ON t.customer_id = cu.customer_id",
                self.table(tables::CUSTOMERS)
            ))
            .line("WHERE t.status IN ('OPEN', 'IN_PROGRESS')")
            .line("ORDER BY t.created_date DESC")
            .line(format!(
                "LIMIT {}",
                bindings
                    .limit
                    .unwrap_or(crate::models::AI_SAMPLE_SIZE_DEFAULT)
            ));
        sql.finish()
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod builder_tests;
