use super::*;
use crate::models::{FilterState, Severity};
use crate::query::QueryBuilder;

const STATES: [&str; 4] = ["CA", "CO", "NY", "TX"];

fn warehouse() -> LocalWarehouse {
    let now = Utc::now();
    LocalWarehouse::new(Dataset::demo(now)).with_fixed_clock(now)
}

async fn run(warehouse: &LocalWarehouse, kind: ReportKind, filters: &FilterState) -> TabularResult {
    let statement = QueryBuilder::default().build(kind, filters).unwrap();
    warehouse.execute(&statement).await.unwrap()
}

fn column_strings(table: &TabularResult, name: &str) -> Vec<String> {
    (0..table.row_count())
        .map(|i| table.value(i, name).unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_states_lookup_is_sorted_and_distinct() {
    let wh = warehouse();
    let result = wh
        .execute(&QueryBuilder::default().states_lookup())
        .await
        .unwrap();
    assert_eq!(column_strings(&result, "state"), STATES);
}

#[tokio::test]
async fn test_kpi_summary_counts() {
    let wh = warehouse();
    let result = run(&wh, ReportKind::KpiSummary, &FilterState::new(STATES)).await;
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.value(0, "TOTAL_NODES"), Some(&CellValue::Integer(6)));
    assert_eq!(result.value(0, "ACTIVE_CIRCUITS"), Some(&CellValue::Integer(4)));
    assert_eq!(result.value(0, "ACTIVE_CUSTOMERS"), Some(&CellValue::Integer(5)));
    assert_eq!(result.value(0, "CRITICAL_EVENTS_7D"), Some(&CellValue::Integer(2)));
    assert_eq!(result.value(0, "TOTAL_MRR"), Some(&CellValue::Decimal(129400.0)));
    assert_eq!(result.value(0, "OPEN_TICKETS"), Some(&CellValue::Integer(3)));
}

#[tokio::test]
async fn test_kpi_with_no_states_still_returns_a_row() {
    let wh = warehouse();
    let mut filters = FilterState::new(STATES);
    filters.select_states(Vec::<&str>::new());
    let result = run(&wh, ReportKind::KpiSummary, &filters).await;
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.value(0, "TOTAL_NODES"), Some(&CellValue::Integer(0)));
}

#[tokio::test]
async fn test_node_health_respects_states_and_severity() {
    let wh = warehouse();
    let mut filters = FilterState::new(STATES);
    filters.select_states(["CA", "TX"]);

    let all = run(&wh, ReportKind::NodeHealth, &filters).await;
    assert_eq!(all.row_count(), 4);
    let states = column_strings(&all, "STATE");
    assert!(states.iter().all(|s| s == "CA" || s == "TX"));

    let dallas = (0..all.row_count())
        .find(|&i| all.value(i, "NODE_NAME") == Some(&"DAL-CORE-01".into()))
        .unwrap();
    assert_eq!(all.value(dallas, "EVENTS_30D"), Some(&CellValue::Integer(2)));
    assert_eq!(all.value(dallas, "OPEN_INCIDENTS"), Some(&CellValue::Integer(1)));
    assert_eq!(all.value(dallas, "AVG_RESOLUTION_MIN"), Some(&CellValue::Null));

    filters.set_severity(Severity::Critical);
    let critical = run(&wh, ReportKind::NodeHealth, &filters).await;
    let counts: Vec<i64> = (0..critical.row_count())
        .map(|i| critical.value(i, "EVENTS_30D").and_then(CellValue::as_i64).unwrap())
        .collect();
    assert_eq!(counts, vec![1, 1, 1, 0]);
}

#[tokio::test]
async fn test_node_health_with_no_states_is_empty() {
    let wh = warehouse();
    let mut filters = FilterState::new(STATES);
    filters.select_states(Vec::<&str>::new());
    let result = run(&wh, ReportKind::NodeHealth, &filters).await;
    assert!(result.is_empty());
    assert_eq!(result.columns().len(), 9);
}

#[tokio::test]
async fn test_events_by_severity_uses_thirty_day_window() {
    let wh = warehouse();
    let result = run(&wh, ReportKind::EventsBySeverity, &FilterState::new(STATES)).await;
    assert_eq!(result.value(0, "SEVERITY"), Some(&"CRITICAL".into()));
    assert_eq!(result.value(0, "EVENT_COUNT"), Some(&CellValue::Integer(3)));
    let total: i64 = (0..result.row_count())
        .filter_map(|i| result.value(i, "EVENT_COUNT").and_then(CellValue::as_i64))
        .sum();
    assert_eq!(total, 7);
}

#[tokio::test]
async fn test_circuit_utilization_orders_nulls_first() {
    let wh = warehouse();
    let result = run(&wh, ReportKind::CircuitUtilization, &FilterState::new(STATES)).await;
    assert_eq!(
        column_strings(&result, "CIRCUIT_NAME"),
        ["DEN-LAB-TEST", "DAL-AUS-10G", "SFO-LAX-100G", "NYC-DAL-40G"]
    );
    assert_eq!(result.value(0, "AVG_UTIL_PCT"), Some(&CellValue::Null));
    assert_eq!(result.value(1, "AVG_UTIL_PCT"), Some(&CellValue::Decimal(74.5)));
    assert_eq!(result.value(1, "PEAK_UTIL_PCT"), Some(&CellValue::Decimal(94.0)));
}

#[tokio::test]
async fn test_capacity_rows_are_per_circuit() {
    let wh = warehouse();
    let result = run(&wh, ReportKind::CapacityDistribution, &FilterState::new(STATES)).await;
    assert_eq!(
        column_strings(&result, "CIRCUIT_ID"),
        ["C001", "C002", "C003", "C004"]
    );
    assert_eq!(result.value(0, "PEAK_TOTAL_GBPS"), Some(&CellValue::Decimal(78.0)));
}

#[tokio::test]
async fn test_churn_risk_flags_low_nps_and_near_renewal() {
    let wh = warehouse();
    let result = run(&wh, ReportKind::ChurnRisk, &FilterState::new(STATES)).await;
    assert_eq!(
        column_strings(&result, "COMPANY_NAME"),
        ["Blue Finance", "Acme Health", "Echo Media"]
    );
    assert_eq!(result.value(1, "TOTAL_TICKETS"), Some(&CellValue::Integer(2)));
    assert_eq!(result.value(1, "HIGH_PRI_TICKETS"), Some(&CellValue::Integer(1)));
    assert_eq!(result.value(0, "DAYS_TO_RENEWAL"), Some(&CellValue::Integer(45)));
}

#[tokio::test]
async fn test_ai_sample_is_limited_and_newest_first() {
    let wh = warehouse();
    let mut filters = FilterState::new(STATES);
    filters.set_ai_sample_size(5);
    let result = run(&wh, ReportKind::AiTicketSentiment, &filters).await;
    assert_eq!(
        column_strings(&result, "TICKET_ID"),
        ["T001", "T002", "T003", "T004", "T006"]
    );
    assert_eq!(result.value(0, "SENTIMENT_SCORE"), Some(&CellValue::Decimal(-0.82)));
    assert_eq!(result.value(0, "COMPANY_NAME"), Some(&"Acme Health".into()));
}

#[tokio::test]
async fn test_unhealthy_warehouse_fails_with_retryable_connection_error() {
    let wh = warehouse();
    wh.set_healthy(false);
    assert!(!wh.health_check().await.unwrap());

    let statement = QueryBuilder::default()
        .build(ReportKind::MrrBySegment, &FilterState::new(STATES))
        .unwrap();
    let err = wh.execute(&statement).await.unwrap_err();
    assert_eq!(err.kind(), "connection");
    assert!(err.is_retryable());
    assert_eq!(err.context().report.as_deref(), Some("mrr_by_segment"));

    wh.set_healthy(true);
    assert!(wh.execute(&statement).await.is_ok());
}

#[tokio::test]
async fn test_fixed_clock_moves_windows() {
    let now = Utc::now();
    let wh = LocalWarehouse::new(Dataset::demo(now)).with_fixed_clock(now + Duration::days(60));
    let result = run(&wh, ReportKind::EventsByType, &FilterState::new(STATES)).await;
    assert!(result.is_empty());
    assert_eq!(wh.backend_name(), "local");
}
