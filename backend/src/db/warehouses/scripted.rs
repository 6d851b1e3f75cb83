//! Scripted warehouse for tests.
//!
//! [`TestWarehouse`] answers each statement from a per-target script and keeps
//! a log of everything it was asked to execute. It also counts executions that
//! are currently awaiting their response, so tests can observe that dropping a
//! render pass really releases in-flight work.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::db::warehouse::{ErrorContext, Warehouse, WarehouseError, WarehouseResult};
use crate::models::{ColumnType, ReportKind, TabularResult};
use crate::query::{Statement, StatementTarget};

/// Scripted reply for one statement target.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Return the table immediately.
    Rows(TabularResult),
    /// Return the table after a delay.
    Delayed(Duration, TabularResult),
    /// Fail with the given error.
    Fail(WarehouseError),
    /// Never complete.
    Pending,
}

#[derive(Default)]
struct Script {
    responses: HashMap<StatementTarget, ScriptedResponse>,
    executed: Vec<Statement>,
}

/// In-memory warehouse that replays scripted responses.
#[derive(Clone)]
pub struct TestWarehouse {
    script: Arc<Mutex<Script>>,
    in_flight: Arc<AtomicUsize>,
    healthy: Arc<Mutex<bool>>,
}

impl Default for TestWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWarehouse {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            healthy: Arc::new(Mutex::new(true)),
        }
    }

    /// Set the reply for `target`, replacing any previous one.
    pub fn script(&self, target: StatementTarget, response: ScriptedResponse) {
        self.script.lock().responses.insert(target, response);
    }

    /// Builder form of [`script`](Self::script) for a report.
    pub fn with_report(self, kind: ReportKind, response: ScriptedResponse) -> Self {
        self.script(StatementTarget::Report(kind), response);
        self
    }

    /// Builder form of [`script`](Self::script) for the states lookup.
    pub fn with_states(self, states: &[&str]) -> Self {
        let mut table = TabularResult::builder().column("STATE", ColumnType::String);
        for state in states {
            table.push_row(vec![(*state).into()]);
        }
        if let Ok(table) = table.build() {
            self.script(StatementTarget::StatesLookup, ScriptedResponse::Rows(table));
        }
        self
    }

    /// Reply with `table` for every report that has no script yet.
    pub fn with_default_rows(self, table: TabularResult) -> Self {
        {
            let mut script = self.script.lock();
            for kind in ReportKind::ALL {
                script
                    .responses
                    .entry(StatementTarget::Report(kind))
                    .or_insert_with(|| ScriptedResponse::Rows(table.clone()));
            }
        }
        self
    }

    /// Statements executed so far, in call order.
    pub fn executed(&self) -> Vec<Statement> {
        self.script.lock().executed.clone()
    }

    /// Executions currently awaiting their response.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock() = healthy;
    }
}

/// Decrements the in-flight counter when the execute future completes or is
/// dropped.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Warehouse for TestWarehouse {
    async fn execute(&self, statement: &Statement) -> WarehouseResult<TabularResult> {
        let response = {
            let mut script = self.script.lock();
            script.executed.push(statement.clone());
            script.responses.get(&statement.target()).cloned()
        };
        let _guard = InFlightGuard::enter(&self.in_flight);

        match response {
            Some(ScriptedResponse::Rows(table)) => Ok(table),
            Some(ScriptedResponse::Delayed(delay, table)) => {
                tokio::time::sleep(delay).await;
                Ok(table)
            }
            Some(ScriptedResponse::Fail(err)) => Err(err),
            Some(ScriptedResponse::Pending) => std::future::pending().await,
            None => Err(WarehouseError::QueryError {
                message: format!("No scripted response for {}", statement.target().label()),
                context: ErrorContext::new("execute")
                    .with_report(statement.target().label())
                    .with_fingerprint(statement.fingerprint()),
            }),
        }
    }

    async fn health_check(&self) -> WarehouseResult<bool> {
        Ok(*self.healthy.lock())
    }

    fn backend_name(&self) -> &'static str {
        "test"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterState;
    use crate::query::QueryBuilder;

    fn statement(kind: ReportKind) -> Statement {
        QueryBuilder::default()
            .build(kind, &FilterState::new(["CA"]))
            .unwrap()
    }

    #[tokio::test]
    async fn test_replays_script_and_records_calls() {
        let table = TabularResult::builder()
            .column("SEGMENT", ColumnType::String)
            .row(vec!["SMB".into()])
            .build()
            .unwrap();
        let wh = TestWarehouse::new()
            .with_report(ReportKind::MrrBySegment, ScriptedResponse::Rows(table.clone()));

        let result = wh.execute(&statement(ReportKind::MrrBySegment)).await.unwrap();
        assert_eq!(result, table);
        assert_eq!(wh.executed().len(), 1);
        assert_eq!(wh.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_unscripted_target_is_a_query_error() {
        let wh = TestWarehouse::new();
        let err = wh
            .execute(&statement(ReportKind::ChurnRisk))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "query");
        assert_eq!(err.context().report.as_deref(), Some("churn_risk"));
    }

    #[tokio::test]
    async fn test_dropping_pending_execution_releases_it() {
        let wh = TestWarehouse::new().with_report(ReportKind::KpiSummary, ScriptedResponse::Pending);
        let stmt = statement(ReportKind::KpiSummary);
        let outcome =
            tokio::time::timeout(Duration::from_millis(20), wh.execute(&stmt)).await;
        assert!(outcome.is_err());
        assert_eq!(wh.in_flight(), 0);
    }
}
