//! Query parameterization layer.
//!
//! Turns a [`FilterState`](crate::models::FilterState) and a report kind into
//! SQL text. Only allow-listed literals ever reach the SQL string; see
//! [`literal`].

pub mod builder;
pub mod catalog;
pub mod error;
pub mod fingerprint;
pub mod literal;

pub use builder::{QueryBuilder, Statement, StatementBindings, StatementTarget};
pub use catalog::{report_spec, ReportSpec, REPORT_CATALOG};
pub use error::{QueryBuildError, QueryBuildResult};
pub use fingerprint::fingerprint_sql;
pub use literal::{in_list, quote_literal, validate_literal, SchemaName, DEFAULT_SCHEMA};
