use super::*;
use crate::query::error::QueryBuildError;
use crate::query::literal::MATCH_NOTHING;

fn filters(states: &[&str]) -> FilterState {
    FilterState::new(states.iter().copied())
}

fn build(kind: ReportKind, f: &FilterState) -> Statement {
    QueryBuilder::default().build(kind, f).unwrap()
}

#[test]
fn test_node_health_scenario() {
    let mut f = filters(&["CA", "NY", "TX"]);
    f.select_states(["CA", "TX"]);
    f.set_severity(Severity::Critical);
    f.set_ai_sample_size(10);

    let stmt = build(ReportKind::NodeHealth, &f);
    let sql = stmt.sql();
    assert!(sql.contains("n.state IN ('CA','TX')"), "{sql}");
    assert!(sql.contains("AND e.severity = 'CRITICAL'"), "{sql}");
    assert_eq!(sql.matches("AND e.severity =").count(), 1);
    assert!(sql.contains("DATEADD('day', -30, CURRENT_TIMESTAMP())"));
    assert!(sql.contains("ROUND(AVG(e.duration_minutes), 1)"));
    assert!(sql.ends_with("LIMIT 25"));
    assert_eq!(stmt.bindings().severity, Some(Severity::Critical));
    assert_eq!(
        stmt.bindings().states,
        Some(vec!["CA".to_string(), "TX".to_string()])
    );
}

#[test]
fn test_all_severity_matches_unfiltered_query() {
    let mut f = filters(&["CA", "TX"]);
    let unfiltered = build(ReportKind::NodeHealth, &f);

    for severity in [
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Warning,
    ] {
        f.set_severity(severity);
        let filtered = build(ReportKind::NodeHealth, &f);
        let clause = format!("  AND e.severity = '{}'", severity);
        let without_clause: Vec<&str> = filtered
            .sql()
            .lines()
            .filter(|line| *line != clause)
            .collect();
        assert_eq!(filtered.sql().lines().count(), without_clause.len() + 1);
        assert_eq!(without_clause.join("\n"), unfiltered.sql());
    }

    f.set_severity(Severity::All);
    assert_eq!(build(ReportKind::NodeHealth, &f).sql(), unfiltered.sql());
    assert!(!unfiltered.sql().contains("AND e.severity"));
}

#[test]
fn test_empty_selection_matches_nothing() {
    let mut f = filters(&["CA", "TX"]);
    f.select_states(Vec::<&str>::new());

    let node_health = build(ReportKind::NodeHealth, &f);
    assert!(node_health
        .sql()
        .contains(&format!("WHERE {}", MATCH_NOTHING)));
    assert!(!node_health.sql().contains("IN ()"));
    assert_eq!(node_health.bindings().states, Some(vec![]));

    let kpi = build(ReportKind::KpiSummary, &f);
    assert!(kpi
        .sql()
        .contains(&format!("WHERE {}) AS total_nodes", MATCH_NOTHING)));
}

#[test]
fn test_injection_is_rejected() {
    let f = filters(&["CA'; DROP TABLE x; --"]);
    let builder = QueryBuilder::default();

    for kind in [ReportKind::NodeHealth, ReportKind::KpiSummary] {
        let err = builder.build(kind, &f).unwrap_err();
        assert!(matches!(err, QueryBuildError::InvalidFilterValue { .. }));
    }
}

#[test]
fn test_reports_without_state_filter_ignore_bad_states() {
    let f = filters(&["CA'"]);
    let stmt = build(ReportKind::MrrBySegment, &f);
    assert!(!stmt.sql().contains("CA'"));
    assert_eq!(stmt.bindings().states, None);
}

#[test]
fn test_build_is_deterministic() {
    let mut f = filters(&["TX", "CA", "NY"]);
    f.set_severity(Severity::Major);
    for kind in ReportKind::ALL {
        let a = build(kind, &f);
        let b = build(kind, &f);
        assert_eq!(a.sql(), b.sql());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}

#[test]
fn test_ai_report_uses_sample_size() {
    let mut f = filters(&["CA"]);
    f.set_ai_sample_size(5);
    let stmt = build(ReportKind::AiTicketSentiment, &f);
    assert!(stmt.sql().ends_with("LIMIT 5"));
    assert!(stmt.sql().contains("ORDER BY t.created_date DESC"));
    assert!(stmt
        .sql()
        .contains("ROUND(SNOWFLAKE.CORTEX.SENTIMENT(t.description), 3) AS sentiment_score"));
    assert!(stmt
        .sql()
        .contains("SNOWFLAKE.CORTEX.SENTIMENT(t.description) AS sentiment_raw"));
    assert_eq!(stmt.bindings().limit, Some(5));
}

#[test]
fn test_per_report_windows_and_precision() {
    let f = filters(&["CA"]);
    let kpi = build(ReportKind::KpiSummary, &f);
    assert!(kpi.sql().contains("DATEADD('day', -7, CURRENT_TIMESTAMP())"));
    assert!(kpi.sql().contains("ROUND(SUM(mrr), 0)"));

    let util = build(ReportKind::CircuitUtilization, &f);
    assert!(util.sql().contains("tm.metric_timestamp >= DATEADD('day', -7,"));
    assert!(util.sql().contains("ROUND(AVG(tm.latency_ms), 2)"));
    assert!(util.sql().contains("ROUND(AVG(tm.packet_loss_pct), 3)"));
    assert!(util
        .sql()
        .contains("ROUND(AVG(tm.inbound_gbps + tm.outbound_gbps), 4)"));

    let by_type = build(ReportKind::EventsByType, &f);
    assert!(by_type.sql().contains("DATEADD('day', -30,"));
}

#[test]
fn test_schema_qualifier_is_applied() {
    let builder = QueryBuilder::new(SchemaName::parse("ANALYTICS.NETOPS").unwrap());
    let lookup = builder.states_lookup();
    assert_eq!(
        lookup.sql(),
        "SELECT DISTINCT state FROM ANALYTICS.NETOPS.RAW_NETWORK_NODES ORDER BY state"
    );
    assert_eq!(lookup.target(), StatementTarget::StatesLookup);
    assert_eq!(lookup.report(), None);
}
