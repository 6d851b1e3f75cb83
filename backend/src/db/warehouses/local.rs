//! In-memory local warehouse implementation.
//!
//! This module provides a [`Warehouse`] backed by an in-memory [`Dataset`],
//! suitable for local development and tests. It does not parse SQL: each
//! statement is evaluated from its report kind and typed bindings, following
//! the same semantics the SQL text expresses (rolling windows, NULL-safe
//! division, rounding, ordering and limits).
//!
//! Column names are returned upper-case, the way the production warehouse
//! reports unquoted identifiers.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::dataset::{Customer, Dataset, NetworkCircuit, NetworkEvent};
use crate::db::warehouse::{ErrorContext, Warehouse, WarehouseError, WarehouseResult};
use crate::models::{
    CellValue, ColumnType, ReportKind, TabularError, TabularResult, AI_SAMPLE_SIZE_DEFAULT,
};
use crate::query::catalog::{CHURN_NPS_BELOW, CHURN_RENEWAL_WITHIN_DAYS};
use crate::query::{Statement, StatementBindings, StatementTarget};

#[derive(Debug, Clone, Copy)]
enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

struct LocalState {
    dataset: Arc<Dataset>,
    clock: Clock,
    is_healthy: bool,
}

/// In-memory warehouse.
///
/// # Example
/// ```
/// use fiberops::db::warehouses::LocalWarehouse;
///
/// let warehouse = LocalWarehouse::demo();
/// assert!(warehouse.now() <= chrono::Utc::now());
/// ```
#[derive(Clone)]
pub struct LocalWarehouse {
    state: Arc<RwLock<LocalState>>,
}

impl LocalWarehouse {
    /// Create a warehouse over `dataset` using the system clock.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            state: Arc::new(RwLock::new(LocalState {
                dataset: Arc::new(dataset),
                clock: Clock::System,
                is_healthy: true,
            })),
        }
    }

    /// Warehouse seeded with [`Dataset::demo`].
    pub fn demo() -> Self {
        Self::new(Dataset::demo(Utc::now()))
    }

    /// Evaluate rolling windows against `now` instead of the system clock.
    pub fn with_fixed_clock(self, now: DateTime<Utc>) -> Self {
        self.state.write().clock = Clock::Fixed(now);
        self
    }

    /// Simulate losing (or regaining) the warehouse session.
    pub fn set_healthy(&self, healthy: bool) {
        self.state.write().is_healthy = healthy;
    }

    /// Current time as seen by rolling windows.
    pub fn now(&self) -> DateTime<Utc> {
        match self.state.read().clock {
            Clock::System => Utc::now(),
            Clock::Fixed(now) => now,
        }
    }

    fn snapshot(&self) -> (Arc<Dataset>, DateTime<Utc>, bool) {
        let state = self.state.read();
        let now = match state.clock {
            Clock::System => Utc::now(),
            Clock::Fixed(now) => now,
        };
        (Arc::clone(&state.dataset), now, state.is_healthy)
    }
}

#[async_trait]
impl Warehouse for LocalWarehouse {
    async fn execute(&self, statement: &Statement) -> WarehouseResult<TabularResult> {
        let (dataset, now, is_healthy) = self.snapshot();
        if !is_healthy {
            return Err(WarehouseError::ConnectionError {
                message: "Local warehouse is marked unavailable".to_string(),
                context: ErrorContext::new("execute")
                    .with_report(statement.target().label())
                    .with_fingerprint(statement.fingerprint())
                    .retryable(),
            });
        }

        let eval = Evaluator {
            data: &dataset,
            now,
            bindings: statement.bindings(),
        };
        let result = match statement.target() {
            StatementTarget::StatesLookup => eval.states_lookup(),
            StatementTarget::Report(kind) => match kind {
                ReportKind::KpiSummary => eval.kpi_summary(),
                ReportKind::NodeHealth => eval.node_health(),
                ReportKind::EventsByType => eval.events_breakdown("EVENT_TYPE", |e| &e.event_type),
                ReportKind::EventsBySeverity => eval.events_breakdown("SEVERITY", |e| &e.severity),
                ReportKind::CircuitUtilization => eval.circuit_utilization(),
                ReportKind::CapacityDistribution => eval.capacity_distribution(),
                ReportKind::MrrBySegment => eval.mrr_by_segment(),
                ReportKind::ChurnRisk => eval.churn_risk(),
                ReportKind::CustomersByIndustry => eval.customers_by_industry(),
                ReportKind::AiTicketSentiment => eval.ai_ticket_sentiment(),
            },
        }
        .map_err(|e| {
            WarehouseError::from(e)
                .with_operation("execute")
                .with_report(statement.target().label())
        })?;

        debug!(
            "Local warehouse evaluated {} ({} rows)",
            statement.target().label(),
            result.row_count()
        );
        Ok(result)
    }

    async fn health_check(&self) -> WarehouseResult<bool> {
        Ok(self.state.read().is_healthy)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// `value / capacity * 100`, NULL when capacity is NULL or zero.
fn pct_of(value: f64, capacity: Option<f64>) -> Option<f64> {
    capacity
        .filter(|c| *c != 0.0)
        .map(|c| value / c * 100.0)
}

fn desc_nulls_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
    }
}

type EvalResult = Result<TabularResult, TabularError>;

struct Evaluator<'a> {
    data: &'a Dataset,
    now: DateTime<Utc>,
    bindings: &'a StatementBindings,
}

impl Evaluator<'_> {
    fn within_window(&self, ts: DateTime<Utc>, default_days: u32) -> bool {
        let days = self.bindings.window_days.unwrap_or(default_days);
        ts >= self.now - Duration::days(days as i64)
    }

    fn state_selected(&self, state: &str) -> bool {
        self.bindings
            .states
            .as_ref()
            .map_or(true, |states| states.iter().any(|s| s == state))
    }

    fn severity_matches(&self, severity: &str) -> bool {
        self.bindings
            .severity
            .map_or(true, |s| severity.eq_ignore_ascii_case(s.as_str()))
    }

    fn limit(&self, default: u32) -> usize {
        self.bindings.limit.unwrap_or(default) as usize
    }

    fn states_lookup(&self) -> EvalResult {
        let states: BTreeSet<&str> = self.data.nodes.iter().map(|n| n.state.as_str()).collect();
        let mut table = TabularResult::builder().column("STATE", ColumnType::String);
        for state in states {
            table.push_row(vec![state.into()]);
        }
        table.build()
    }

    fn kpi_summary(&self) -> EvalResult {
        let total_nodes: BTreeSet<&str> = self
            .data
            .nodes
            .iter()
            .filter(|n| self.state_selected(&n.state))
            .map(|n| n.node_id.as_str())
            .collect();
        let active_circuits: BTreeSet<&str> = self
            .data
            .circuits
            .iter()
            .filter(|c| c.status == "ACTIVE")
            .map(|c| c.circuit_id.as_str())
            .collect();
        let active_customers: Vec<_> = self
            .data
            .customers
            .iter()
            .filter(|c| c.status == "ACTIVE")
            .collect();
        let customer_ids: BTreeSet<&str> = active_customers
            .iter()
            .map(|c| c.customer_id.as_str())
            .collect();
        let critical_events: BTreeSet<&str> = self
            .data
            .events
            .iter()
            .filter(|e| self.within_window(e.event_timestamp, 7) && e.severity == "CRITICAL")
            .map(|e| e.event_id.as_str())
            .collect();
        let total_mrr = (!active_customers.is_empty())
            .then(|| round_to(active_customers.iter().map(|c| c.mrr).sum(), 0));
        let open_tickets: BTreeSet<&str> = self
            .data
            .tickets
            .iter()
            .filter(|t| t.status == "OPEN")
            .map(|t| t.ticket_id.as_str())
            .collect();

        TabularResult::builder()
            .column("TOTAL_NODES", ColumnType::Integer)
            .column("ACTIVE_CIRCUITS", ColumnType::Integer)
            .column("ACTIVE_CUSTOMERS", ColumnType::Integer)
            .column("CRITICAL_EVENTS_7D", ColumnType::Integer)
            .column("TOTAL_MRR", ColumnType::Decimal)
            .column("OPEN_TICKETS", ColumnType::Integer)
            .row(vec![
                (total_nodes.len() as i64).into(),
                (active_circuits.len() as i64).into(),
                (customer_ids.len() as i64).into(),
                (critical_events.len() as i64).into(),
                total_mrr.into(),
                (open_tickets.len() as i64).into(),
            ])
            .build()
    }

    fn node_health(&self) -> EvalResult {
        type NodeKey<'n> = (&'n str, &'n str, &'n str, &'n str, &'n str);
        let mut groups: BTreeMap<NodeKey<'_>, BTreeMap<&str, &NetworkEvent>> = BTreeMap::new();

        for node in self.data.nodes.iter().filter(|n| self.state_selected(&n.state)) {
            let key = (
                node.node_name.as_str(),
                node.node_type.as_str(),
                node.city.as_str(),
                node.state.as_str(),
                node.status.as_str(),
            );
            let events = groups.entry(key).or_default();
            for event in self.data.events.iter().filter(|e| {
                e.node_id == node.node_id
                    && self.within_window(e.event_timestamp, 30)
                    && self.severity_matches(&e.severity)
            }) {
                events.insert(event.event_id.as_str(), event);
            }
        }

        let mut rows: Vec<(i64, Vec<CellValue>)> = groups
            .into_iter()
            .map(|((name, node_type, city, state, status), events)| {
                let total = events.len() as i64;
                let critical = events.values().filter(|e| e.severity == "CRITICAL").count();
                let open = events
                    .values()
                    .filter(|e| e.resolved_at.is_none() && e.event_type != "MAINTENANCE")
                    .count();
                let avg_resolution = mean(events.values().filter_map(|e| e.duration_minutes))
                    .map(|v| round_to(v, 1));
                (
                    total,
                    vec![
                        name.into(),
                        node_type.into(),
                        city.into(),
                        state.into(),
                        status.into(),
                        total.into(),
                        (critical as i64).into(),
                        (open as i64).into(),
                        avg_resolution.into(),
                    ],
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.truncate(self.limit(25));

        let mut table = TabularResult::builder()
            .column("NODE_NAME", ColumnType::String)
            .column("NODE_TYPE", ColumnType::String)
            .column("CITY", ColumnType::String)
            .column("STATE", ColumnType::String)
            .column("NODE_STATUS", ColumnType::String)
            .column("EVENTS_30D", ColumnType::Integer)
            .column("CRITICAL_30D", ColumnType::Integer)
            .column("OPEN_INCIDENTS", ColumnType::Integer)
            .column("AVG_RESOLUTION_MIN", ColumnType::Decimal);
        for (_, row) in rows {
            table.push_row(row);
        }
        table.build()
    }

    fn events_breakdown<F>(&self, dimension: &str, key: F) -> EvalResult
    where
        F: Fn(&NetworkEvent) -> &String,
    {
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for event in self
            .data
            .events
            .iter()
            .filter(|e| self.within_window(e.event_timestamp, 30))
        {
            *counts.entry(key(event).as_str()).or_default() += 1;
        }
        let mut rows: Vec<(&str, i64)> = counts.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));

        let mut table = TabularResult::builder()
            .column(dimension, ColumnType::String)
            .column("EVENT_COUNT", ColumnType::Integer);
        for (value, count) in rows {
            table.push_row(vec![value.into(), count.into()]);
        }
        table.build()
    }

    /// Active circuits joined to their in-window traffic samples; circuits
    /// without samples drop out like an inner join.
    fn circuits_with_samples(&self) -> Vec<(&NetworkCircuit, Vec<f64>, Vec<(f64, f64)>)> {
        self.data
            .circuits
            .iter()
            .filter(|c| c.status == "ACTIVE")
            .filter_map(|c| {
                let samples: Vec<_> = self
                    .data
                    .traffic
                    .iter()
                    .filter(|m| {
                        m.circuit_id == c.circuit_id && self.within_window(m.metric_timestamp, 7)
                    })
                    .collect();
                if samples.is_empty() {
                    return None;
                }
                let totals = samples
                    .iter()
                    .map(|m| m.inbound_gbps + m.outbound_gbps)
                    .collect();
                let quality = samples
                    .iter()
                    .map(|m| (m.latency_ms, m.packet_loss_pct))
                    .collect();
                Some((c, totals, quality))
            })
            .collect()
    }

    fn circuit_utilization(&self) -> EvalResult {
        let mut rows: Vec<(Option<f64>, Vec<CellValue>)> = self
            .circuits_with_samples()
            .into_iter()
            .map(|(circuit, totals, quality)| {
                let avg_total = mean(totals.iter().copied()).unwrap_or(0.0);
                let peak_total = totals.iter().copied().fold(f64::MIN, f64::max);
                let avg_util = pct_of(avg_total, circuit.capacity_gbps).map(|v| round_to(v, 1));
                let peak_util = pct_of(peak_total, circuit.capacity_gbps).map(|v| round_to(v, 1));
                let latency = mean(quality.iter().map(|q| q.0)).map(|v| round_to(v, 2));
                let loss = mean(quality.iter().map(|q| q.1)).map(|v| round_to(v, 3));
                (
                    avg_util,
                    vec![
                        circuit.circuit_name.as_str().into(),
                        circuit.circuit_type.as_str().into(),
                        circuit.capacity_gbps.into(),
                        round_to(avg_total, 4).into(),
                        avg_util.into(),
                        peak_util.into(),
                        latency.into(),
                        loss.into(),
                    ],
                )
            })
            .collect();
        rows.sort_by(|a, b| desc_nulls_first(a.0, b.0));
        rows.truncate(self.limit(30));

        let mut table = TabularResult::builder()
            .column("CIRCUIT_NAME", ColumnType::String)
            .column("CIRCUIT_TYPE", ColumnType::String)
            .column("CAPACITY_GBPS", ColumnType::Decimal)
            .column("AVG_TOTAL_GBPS", ColumnType::Decimal)
            .column("AVG_UTIL_PCT", ColumnType::Decimal)
            .column("PEAK_UTIL_PCT", ColumnType::Decimal)
            .column("AVG_LATENCY_MS", ColumnType::Decimal)
            .column("AVG_LOSS_PCT", ColumnType::Decimal);
        for (_, row) in rows {
            table.push_row(row);
        }
        table.build()
    }

    fn capacity_distribution(&self) -> EvalResult {
        let mut circuits = self.circuits_with_samples();
        circuits.sort_by(|a, b| a.0.circuit_id.cmp(&b.0.circuit_id));

        let mut table = TabularResult::builder()
            .column("CIRCUIT_ID", ColumnType::String)
            .column("CIRCUIT_NAME", ColumnType::String)
            .column("CAPACITY_GBPS", ColumnType::Decimal)
            .column("PEAK_TOTAL_GBPS", ColumnType::Decimal);
        for (circuit, totals, _) in circuits {
            let peak = totals.iter().copied().fold(f64::MIN, f64::max);
            table.push_row(vec![
                circuit.circuit_id.as_str().into(),
                circuit.circuit_name.as_str().into(),
                circuit.capacity_gbps.into(),
                peak.into(),
            ]);
        }
        table.build()
    }

    fn mrr_by_segment(&self) -> EvalResult {
        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for customer in self.data.customers.iter().filter(|c| c.status == "ACTIVE") {
            groups
                .entry(customer.segment.as_str())
                .or_default()
                .push(customer.mrr);
        }
        let mut rows: Vec<(f64, Vec<CellValue>)> = groups
            .into_iter()
            .map(|(segment, mrr)| {
                let total = round_to(mrr.iter().sum(), 2);
                let avg = mean(mrr.iter().copied()).map(|v| round_to(v, 2));
                (
                    total,
                    vec![
                        segment.into(),
                        (mrr.len() as i64).into(),
                        total.into(),
                        avg.into(),
                    ],
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let mut table = TabularResult::builder()
            .column("SEGMENT", ColumnType::String)
            .column("CUSTOMERS", ColumnType::Integer)
            .column("TOTAL_MRR", ColumnType::Decimal)
            .column("AVG_MRR", ColumnType::Decimal);
        for (_, row) in rows {
            table.push_row(row);
        }
        table.build()
    }

    fn churn_risk(&self) -> EvalResult {
        let today = self.now.date_naive();
        let mut rows: Vec<(f64, Vec<CellValue>)> = self
            .data
            .customers
            .iter()
            .filter(|c| c.status == "ACTIVE")
            .filter_map(|c| {
                let days_to_renewal = c.contract_end.map(|d| (d - today).num_days());
                let low_nps = c.nps_score.is_some_and(|n| n < CHURN_NPS_BELOW);
                let renewing = days_to_renewal.is_some_and(|d| d < CHURN_RENEWAL_WITHIN_DAYS);
                if !(low_nps || renewing) {
                    return None;
                }
                let tickets: BTreeMap<&str, &str> = self
                    .data
                    .tickets
                    .iter()
                    .filter(|t| t.customer_id.as_deref() == Some(c.customer_id.as_str()))
                    .map(|t| (t.ticket_id.as_str(), t.priority.as_str()))
                    .collect();
                let high_priority = tickets
                    .values()
                    .filter(|p| matches!(**p, "CRITICAL" | "HIGH"))
                    .count();
                Some((
                    c.mrr,
                    vec![
                        c.company_name.as_str().into(),
                        c.segment.as_str().into(),
                        c.mrr.into(),
                        c.nps_score.into(),
                        days_to_renewal.into(),
                        (tickets.len() as i64).into(),
                        (high_priority as i64).into(),
                    ],
                ))
            })
            .collect();
        rows.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        rows.truncate(self.limit(15));

        let mut table = TabularResult::builder()
            .column("COMPANY_NAME", ColumnType::String)
            .column("SEGMENT", ColumnType::String)
            .column("MRR", ColumnType::Decimal)
            .column("NPS_SCORE", ColumnType::Integer)
            .column("DAYS_TO_RENEWAL", ColumnType::Integer)
            .column("TOTAL_TICKETS", ColumnType::Integer)
            .column("HIGH_PRI_TICKETS", ColumnType::Integer);
        for (_, row) in rows {
            table.push_row(row);
        }
        table.build()
    }

    fn customers_by_industry(&self) -> EvalResult {
        let mut groups: BTreeMap<&str, Vec<&Customer>> = BTreeMap::new();
        for customer in self.data.customers.iter().filter(|c| c.status == "ACTIVE") {
            groups
                .entry(customer.industry.as_str())
                .or_default()
                .push(customer);
        }
        let mut rows: Vec<(f64, Vec<CellValue>)> = groups
            .into_iter()
            .map(|(industry, customers)| {
                let total = round_to(customers.iter().map(|c| c.mrr).sum(), 2);
                let avg_nps = mean(customers.iter().filter_map(|c| c.nps_score.map(|n| n as f64)))
                    .map(|v| round_to(v, 1));
                (
                    total,
                    vec![
                        industry.into(),
                        (customers.len() as i64).into(),
                        total.into(),
                        avg_nps.into(),
                    ],
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let mut table = TabularResult::builder()
            .column("INDUSTRY", ColumnType::String)
            .column("CUSTOMERS", ColumnType::Integer)
            .column("TOTAL_MRR", ColumnType::Decimal)
            .column("AVG_NPS", ColumnType::Decimal);
        for (_, row) in rows {
            table.push_row(row);
        }
        table.build()
    }

    fn ai_ticket_sentiment(&self) -> EvalResult {
        let companies: HashMap<&str, &str> = self
            .data
            .customers
            .iter()
            .map(|c| (c.customer_id.as_str(), c.company_name.as_str()))
            .collect();
        let mut tickets: Vec<_> = self
            .data
            .tickets
            .iter()
            .filter(|t| matches!(t.status.as_str(), "OPEN" | "IN_PROGRESS"))
            .collect();
        tickets.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        tickets.truncate(self.limit(AI_SAMPLE_SIZE_DEFAULT));

        let mut table = TabularResult::builder()
            .column("TICKET_ID", ColumnType::String)
            .column("COMPANY_NAME", ColumnType::String)
            .column("CATEGORY", ColumnType::String)
            .column("PRIORITY", ColumnType::String)
            .column("SUBJECT", ColumnType::String)
            .column("TICKET_STATUS", ColumnType::String)
            .column("CREATED_DATE", ColumnType::Timestamp)
            .column("SENTIMENT_SCORE", ColumnType::Decimal)
            .column("SENTIMENT_RAW", ColumnType::Decimal)
            .column("AI_SUMMARY", ColumnType::String);
        for t in tickets {
            let company = t
                .customer_id
                .as_deref()
                .and_then(|id| companies.get(id).copied());
            table.push_row(vec![
                t.ticket_id.as_str().into(),
                company.into(),
                t.category.as_str().into(),
                t.priority.as_str().into(),
                t.subject.as_str().into(),
                t.status.as_str().into(),
                t.created_date.into(),
                t.sentiment_score.map(|s| round_to(s, 3)).into(),
                t.sentiment_score.into(),
                t.summary.clone().into(),
            ]);
        }
        table.build()
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod local_tests;
