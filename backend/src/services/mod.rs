//! Service layer for report execution and orchestration.
//!
//! Services sit between the query/warehouse layers and the HTTP surface:
//! [`ReportRunner`] produces one report, [`Dashboard`] renders all of them.

pub mod dashboard;
pub mod error;
pub mod format;
pub mod normalize;
pub mod runner;

pub use dashboard::{Dashboard, DashboardSnapshot, ReportResult};
pub use error::ReportError;
pub use format::{format_count, format_currency};
pub use normalize::{canonical_key, canonicalize, normalize, Normalized};
pub use runner::{ReportOutput, ReportRunner};
