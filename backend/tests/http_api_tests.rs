//! HTTP surface tests driven through the router with `oneshot`.
#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use fiberops::db::{Dataset, LocalWarehouse, TestWarehouse, Warehouse};
use fiberops::http::{create_router, AppState};
use fiberops::models::FilterState;
use fiberops::query::QueryBuilder;
use fiberops::services::{Dashboard, ReportRunner};

fn app_with(warehouse: Arc<dyn Warehouse>) -> (Router, AppState) {
    let runner = ReportRunner::new(warehouse, QueryBuilder::default());
    let state = AppState::new(Dashboard::new(runner));
    (create_router(state.clone()), state)
}

fn local_app() -> Router {
    let now = Utc::now();
    let warehouse = LocalWarehouse::new(Dataset::demo(now)).with_fixed_clock(now);
    app_with(Arc::new(warehouse)).0
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn panel<'a>(body: &'a Value, report: &str) -> &'a Value {
    body["panels"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["report"] == report)
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_backend() {
    let (status, body) = get(local_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "local");
    assert_eq!(body["warehouse"], "connected");
}

#[tokio::test]
async fn test_filters_endpoint() {
    let (status, body) = get(local_app(), "/v1/filters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["states"], serde_json::json!(["CA", "CO", "NY", "TX"]));
    assert_eq!(
        body["severity_options"],
        serde_json::json!(["ALL", "CRITICAL", "MAJOR", "MINOR", "WARNING"])
    );
    assert_eq!(body["ai_sample_size"]["min"], 5);
    assert_eq!(body["ai_sample_size"]["max"], 50);
    assert_eq!(body["ai_sample_size"]["default"], 10);
}

#[tokio::test]
async fn test_report_catalog_lists_every_report() {
    let (status, body) = get(local_app(), "/v1/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 10);
    assert_eq!(body["reports"][0]["kind"], "kpi_summary");
    assert_eq!(body["reports"][1]["title"], "Network Health by Node");
}

#[tokio::test]
async fn test_dashboard_applies_query_filters() {
    let (status, body) = get(
        local_app(),
        "/v1/dashboard?states=CA,TX&severity=critical&ai_limit=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["panels"].as_array().unwrap().len(), 10);
    assert_eq!(body["filters"]["selected_states"], serde_json::json!(["CA", "TX"]));
    assert_eq!(body["filters"]["severity"], "CRITICAL");
    assert_eq!(body["filters"]["ai_sample_size"], 5);
    assert!(body["render_id"].is_string());

    let ai = panel(&body, "ai_ticket_sentiment");
    assert_eq!(ai["status"], "ready");
    assert!(ai["table"]["rows"].as_array().unwrap().len() <= 5);
    assert_eq!(ai["tab"], "ai_ticket_analysis");
}

#[tokio::test]
async fn test_empty_states_parameter_selects_nothing() {
    let (status, body) = get(local_app(), "/v1/dashboard?states=").await;
    assert_eq!(status, StatusCode::OK);
    let nodes = panel(&body, "node_health");
    assert_eq!(nodes["status"], "ready");
    assert!(nodes["table"]["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_single_report_accepts_kebab_case() {
    let (status, body) = get(local_app(), "/v1/reports/capacity-distribution").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"], "capacity_distribution");
    assert_eq!(body["metrics"][0]["key"], "capacity_status_distribution");
}

#[tokio::test]
async fn test_unknown_report_is_not_found() {
    let (status, body) = get(local_app(), "/v1/reports/weather").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_bad_severity_is_bad_request() {
    let (status, body) = get(local_app(), "/v1/reports/node_health?severity=SEVERE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_unsafe_state_is_invalid_filter_value() {
    let warehouse = TestWarehouse::new();
    let (_, state) = app_with(Arc::new(warehouse.clone()));
    let app = create_router(state.with_base_filters(FilterState::new(["CA'; DROP TABLE x; --"])));

    let (status, body) = get(app, "/v1/reports/node_health").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FILTER_VALUE");
    assert!(warehouse.executed().is_empty());
}

#[tokio::test]
async fn test_unsafe_state_parameter_is_rejected() {
    let (status, body) = get(
        local_app(),
        "/v1/dashboard?states=CA,CA%27%3B%20DROP%20TABLE%20x%3B%20--",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FILTER_VALUE");

    let (status, _) = get(local_app(), "/v1/reports/node_health?states=CA,ZZ").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_warehouse_failure_is_bad_gateway() {
    let warehouse = TestWarehouse::new().with_states(&["CA"]);
    let (app, _) = app_with(Arc::new(warehouse));

    let (status, body) = get(app.clone(), "/v1/reports/churn_risk").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "QUERY_EXECUTION_FAILED");

    let (status, body) = get(app, "/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(panel(&body, "churn_risk")["status"], "failed");
    assert_eq!(
        panel(&body, "churn_risk")["error"]["code"],
        "QUERY_EXECUTION_FAILED"
    );
}
