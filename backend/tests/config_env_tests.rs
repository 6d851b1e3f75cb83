//! Environment overrides for configuration and warehouse creation.

mod support;

use std::io::Write;

use fiberops::db::{DashboardConfig, WarehouseFactory, WarehouseType};
use fiberops::query::QueryBuilder;
use fiberops::services::ReportRunner;
use support::with_scoped_env;

const CLEAR: [(&str, Option<&str>); 5] = [
    ("WAREHOUSE_TYPE", None),
    ("WAREHOUSE_SEED_PATH", None),
    ("WAREHOUSE_SCHEMA", None),
    ("HOST", None),
    ("PORT", None),
];

fn env_with<'a>(overrides: &[(&'a str, Option<&'a str>)]) -> Vec<(&'a str, Option<&'a str>)> {
    let mut changes = CLEAR.to_vec();
    changes.extend_from_slice(overrides);
    changes
}

#[test]
fn test_defaults_without_environment() {
    let config = with_scoped_env(&CLEAR, DashboardConfig::from_env).unwrap();
    assert_eq!(config.warehouse_type().unwrap(), WarehouseType::Local);
    assert_eq!(config.schema().unwrap().as_str(), "SNOWFLAKE_EXAMPLE.FIBERIFIC");
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
}

#[test]
fn test_schema_and_port_overrides() {
    let changes = env_with(&[
        ("WAREHOUSE_SCHEMA", Some("ANALYTICS.NETOPS")),
        ("PORT", Some("9090")),
        ("HOST", Some("127.0.0.1")),
    ]);
    let config = with_scoped_env(&changes, DashboardConfig::from_env).unwrap();
    assert_eq!(config.schema().unwrap().as_str(), "ANALYTICS.NETOPS");
    assert_eq!(config.bind_address(), "127.0.0.1:9090");
}

#[test]
fn test_bad_port_is_a_configuration_error() {
    let changes = env_with(&[("PORT", Some("eighty"))]);
    let err = with_scoped_env(&changes, DashboardConfig::from_env).unwrap_err();
    assert_eq!(err.kind(), "configuration");
}

#[test]
fn test_unsafe_schema_is_rejected() {
    let changes = env_with(&[("WAREHOUSE_SCHEMA", Some("DB.X; DROP"))]);
    let config = with_scoped_env(&changes, DashboardConfig::from_env).unwrap();
    assert_eq!(config.schema().unwrap_err().kind(), "configuration");
}

#[test]
fn test_snowflake_cannot_be_created_from_environment() {
    let changes = env_with(&[("WAREHOUSE_TYPE", Some("snowflake"))]);
    let result = with_scoped_env(&changes, WarehouseFactory::from_env);
    match result {
        Err(e) => assert_eq!(e.kind(), "configuration"),
        Ok(_) => panic!("snowflake warehouse should not be constructible"),
    }
}

#[test]
fn test_warehouse_type_defaults_to_local() {
    let ty = with_scoped_env(&CLEAR, WarehouseType::from_env);
    assert_eq!(ty, WarehouseType::Local);

    let changes = env_with(&[("WAREHOUSE_TYPE", Some("not-a-warehouse"))]);
    let ty = with_scoped_env(&changes, WarehouseType::from_env);
    assert_eq!(ty, WarehouseType::Local);
}

#[tokio::test]
async fn test_seed_path_from_environment() {
    let mut seed = tempfile::NamedTempFile::new().unwrap();
    write!(
        seed,
        r#"{{"nodes": [
            {{"node_id": "N1", "node_name": "BOS-CORE-01", "node_type": "CORE",
              "city": "Boston", "state": "MA", "status": "ACTIVE"}},
            {{"node_id": "N2", "node_name": "PDX-EDGE-01", "node_type": "EDGE",
              "city": "Portland", "state": "OR", "status": "ACTIVE"}}
        ]}}"#
    )
    .unwrap();
    let path = seed.path().to_string_lossy().to_string();

    let changes = env_with(&[("WAREHOUSE_SEED_PATH", Some(path.as_str()))]);
    let warehouse = with_scoped_env(&changes, WarehouseFactory::from_env).unwrap();
    assert_eq!(warehouse.backend_name(), "local");

    let runner = ReportRunner::new(warehouse, QueryBuilder::default());
    let filters = runner.load_filter_state().await.unwrap();
    assert_eq!(filters.known_states().collect::<Vec<_>>(), vec!["MA", "OR"]);
}

#[test]
fn test_missing_seed_file_fails() {
    let changes = env_with(&[("WAREHOUSE_SEED_PATH", Some("/nonexistent/seed.json"))]);
    assert!(with_scoped_env(&changes, WarehouseFactory::from_env).is_err());
}
