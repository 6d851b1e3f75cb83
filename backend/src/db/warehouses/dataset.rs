//! Raw tables backing the local warehouse.
//!
//! The JSON seed format mirrors the warehouse tables one-to-one: a top-level
//! object with `nodes`, `circuits`, `events`, `traffic`, `customers` and
//! `tickets` arrays. Every array may be omitted.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::db::warehouse::{WarehouseError, WarehouseResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub node_id: String,
    pub node_name: String,
    pub node_type: String,
    pub city: String,
    pub state: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCircuit {
    pub circuit_id: String,
    pub circuit_name: String,
    pub circuit_type: String,
    pub capacity_gbps: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub event_id: String,
    pub node_id: String,
    pub event_type: String,
    pub severity: String,
    pub event_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficMetric {
    pub circuit_id: String,
    pub metric_timestamp: DateTime<Utc>,
    pub inbound_gbps: f64,
    pub outbound_gbps: f64,
    pub latency_ms: f64,
    pub packet_loss_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub company_name: String,
    pub segment: String,
    pub industry: String,
    pub status: String,
    pub mrr: f64,
    #[serde(default)]
    pub nps_score: Option<i64>,
    #[serde(default)]
    pub contract_end: Option<NaiveDate>,
}

/// Support ticket. `sentiment_score` and `summary` stand in for the hosted
/// text-analysis functions and are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub category: String,
    pub priority: String,
    pub subject: String,
    pub status: String,
    pub description: String,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// All warehouse tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Vec<NetworkNode>,
    #[serde(default)]
    pub circuits: Vec<NetworkCircuit>,
    #[serde(default)]
    pub events: Vec<NetworkEvent>,
    #[serde(default)]
    pub traffic: Vec<TrafficMetric>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

impl Dataset {
    /// Parse a JSON seed document.
    pub fn from_json_str(json: &str) -> WarehouseResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            WarehouseError::configuration(format!("Failed to parse warehouse seed: {}", e))
        })
    }

    /// Load a JSON seed file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> WarehouseResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            WarehouseError::configuration(format!(
                "Failed to read warehouse seed {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Small network spread over four states with recent activity relative
    /// to `now`.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let ago = |hours: i64| now - Duration::hours(hours);
        let today = now.date_naive();

        let node = |id: &str, name: &str, node_type: &str, city: &str, state: &str| NetworkNode {
            node_id: id.to_string(),
            node_name: name.to_string(),
            node_type: node_type.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            status: "ACTIVE".to_string(),
        };
        let nodes = vec![
            node("N001", "SFO-CORE-01", "CORE", "San Francisco", "CA"),
            node("N002", "LAX-AGG-01", "AGGREGATION", "Los Angeles", "CA"),
            node("N003", "DAL-CORE-01", "CORE", "Dallas", "TX"),
            node("N004", "AUS-EDGE-01", "EDGE", "Austin", "TX"),
            node("N005", "NYC-CORE-01", "CORE", "New York", "NY"),
            node("N006", "DEN-EDGE-01", "EDGE", "Denver", "CO"),
        ];

        let circuit = |id: &str, name: &str, circuit_type: &str, capacity: Option<f64>| {
            NetworkCircuit {
                circuit_id: id.to_string(),
                circuit_name: name.to_string(),
                circuit_type: circuit_type.to_string(),
                capacity_gbps: capacity,
                status: "ACTIVE".to_string(),
            }
        };
        let circuits = vec![
            circuit("C001", "SFO-LAX-100G", "BACKBONE", Some(100.0)),
            circuit("C002", "DAL-AUS-10G", "METRO", Some(10.0)),
            circuit("C003", "NYC-DAL-40G", "BACKBONE", Some(40.0)),
            circuit("C004", "DEN-LAB-TEST", "LAB", Some(0.0)),
        ];

        let event = |id: &str,
                     node_id: &str,
                     event_type: &str,
                     severity: &str,
                     hours_ago: i64,
                     duration: Option<f64>| NetworkEvent {
            event_id: id.to_string(),
            node_id: node_id.to_string(),
            event_type: event_type.to_string(),
            severity: severity.to_string(),
            event_timestamp: ago(hours_ago),
            resolved_at: duration.map(|d| ago(hours_ago) + Duration::minutes(d as i64)),
            duration_minutes: duration,
        };
        let events = vec![
            event("E001", "N001", "FIBER_CUT", "CRITICAL", 20, Some(240.0)),
            event("E002", "N001", "LINK_FLAP", "MAJOR", 50, Some(35.0)),
            event("E003", "N003", "POWER", "CRITICAL", 5, None),
            event("E004", "N003", "MAINTENANCE", "MINOR", 30, None),
            event("E005", "N004", "LINK_FLAP", "WARNING", 100, Some(12.0)),
            event("E006", "N005", "HARDWARE", "MAJOR", 300, Some(90.0)),
            event("E007", "N002", "FIBER_CUT", "CRITICAL", 24 * 20, Some(480.0)),
            event("E008", "N006", "POWER", "MINOR", 24 * 45, Some(15.0)),
        ];

        let sample = |circuit_id: &str, hours_ago: i64, inbound: f64, outbound: f64| {
            TrafficMetric {
                circuit_id: circuit_id.to_string(),
                metric_timestamp: ago(hours_ago),
                inbound_gbps: inbound,
                outbound_gbps: outbound,
                latency_ms: 4.0 + inbound / 10.0,
                packet_loss_pct: 0.01,
            }
        };
        let traffic = vec![
            sample("C001", 2, 30.0, 25.0),
            sample("C001", 26, 40.0, 38.0),
            sample("C002", 3, 4.5, 4.9),
            sample("C002", 27, 3.0, 2.5),
            sample("C003", 4, 12.0, 10.0),
            sample("C004", 5, 0.2, 0.1),
        ];

        let customer = |id: &str,
                        company: &str,
                        segment: &str,
                        industry: &str,
                        mrr: f64,
                        nps: Option<i64>,
                        renewal_days: i64| Customer {
            customer_id: id.to_string(),
            company_name: company.to_string(),
            segment: segment.to_string(),
            industry: industry.to_string(),
            status: "ACTIVE".to_string(),
            mrr,
            nps_score: nps,
            contract_end: Some(today + Duration::days(renewal_days)),
        };
        let customers = vec![
            customer("CU001", "Acme Health", "ENTERPRISE", "HEALTHCARE", 48000.0, Some(12), 400),
            customer("CU002", "Blue Finance", "ENTERPRISE", "FINANCE", 62000.0, Some(55), 45),
            customer("CU003", "Corner Cafe", "SMB", "RETAIL", 900.0, Some(70), 300),
            customer("CU004", "Delta Schools", "MID_MARKET", "EDUCATION", 7500.0, None, 600),
            customer("CU005", "Echo Media", "MID_MARKET", "MEDIA", 11000.0, Some(8), 20),
        ];

        let ticket = |id: &str,
                      customer_id: &str,
                      category: &str,
                      priority: &str,
                      status: &str,
                      hours_ago: i64,
                      subject: &str,
                      score: f64| Ticket {
            ticket_id: id.to_string(),
            customer_id: Some(customer_id.to_string()),
            category: category.to_string(),
            priority: priority.to_string(),
            subject: subject.to_string(),
            status: status.to_string(),
            description: format!("{}. Customer reported the issue via the support portal.", subject),
            created_date: ago(hours_ago),
            sentiment_score: Some(score),
            summary: Some(subject.to_string()),
        };
        let tickets = vec![
            ticket("T001", "CU001", "OUTAGE", "CRITICAL", "OPEN", 3, "Clinic offline after fiber cut", -0.82),
            ticket("T002", "CU002", "LATENCY", "HIGH", "IN_PROGRESS", 8, "Trading floor latency spikes", -0.41),
            ticket("T003", "CU003", "BILLING", "LOW", "OPEN", 30, "Question about invoice", 0.05),
            ticket("T004", "CU005", "INSTALL", "MEDIUM", "OPEN", 50, "Thanks for the fast install", 0.77),
            ticket("T005", "CU004", "OUTAGE", "HIGH", "CLOSED", 70, "Campus link restored", 0.4),
            ticket("T006", "CU001", "LATENCY", "MEDIUM", "IN_PROGRESS", 90, "Slow imaging uploads", -0.3),
        ];

        Self {
            nodes,
            circuits,
            events,
            traffic,
            customers,
            tickets,
        }
    }
}
