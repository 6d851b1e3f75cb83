//! Domain types shared by the query, warehouse and service layers.

pub mod filter;
pub mod metrics;
pub mod report;
pub mod tabular;

pub use filter::*;
pub use metrics::*;
pub use report::*;
pub use tabular::*;
