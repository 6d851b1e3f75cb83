//! Derived metrics computed from a single result set.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::tabular::{CellValue, TabularResult};

/// Scores strictly below this are negative.
pub const NEGATIVE_SENTIMENT_BELOW: f64 = -0.3;
/// Scores strictly above this are positive.
pub const POSITIVE_SENTIMENT_ABOVE: f64 = 0.3;

/// Peak utilization strictly above this percentage is critical.
pub const CRITICAL_UTILIZATION_ABOVE: f64 = 90.0;
/// Peak utilization strictly above this percentage (and not critical) is a warning.
pub const WARNING_UTILIZATION_ABOVE: f64 = 75.0;

/// Ticket sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentBucket {
    Negative,
    Neutral,
    Positive,
}

impl SentimentBucket {
    /// Classify an opaque sentiment score. Both thresholds belong to `Neutral`.
    pub fn classify(score: f64) -> Self {
        if score < NEGATIVE_SENTIMENT_BELOW {
            SentimentBucket::Negative
        } else if score > POSITIVE_SENTIMENT_ABOVE {
            SentimentBucket::Positive
        } else {
            SentimentBucket::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentBucket::Negative => "NEGATIVE",
            SentimentBucket::Neutral => "NEUTRAL",
            SentimentBucket::Positive => "POSITIVE",
        }
    }
}

impl fmt::Display for SentimentBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circuit capacity status bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CapacityStatus {
    #[serde(rename = "CRITICAL (>90%)")]
    Critical,
    #[serde(rename = "WARNING (75-90%)")]
    Warning,
    #[serde(rename = "NORMAL (<75%)")]
    Normal,
}

impl CapacityStatus {
    /// Classify a peak utilization percentage.
    pub fn from_peak_pct(peak_pct: f64) -> Self {
        if peak_pct > CRITICAL_UTILIZATION_ABOVE {
            CapacityStatus::Critical
        } else if peak_pct > WARNING_UTILIZATION_ABOVE {
            CapacityStatus::Warning
        } else {
            CapacityStatus::Normal
        }
    }

    /// Peak utilization percentage for a circuit, `None` when capacity is
    /// missing or zero or there is no traffic sample.
    pub fn peak_pct(peak_total_gbps: Option<f64>, capacity_gbps: Option<f64>) -> Option<f64> {
        let capacity = capacity_gbps.filter(|c| *c != 0.0 && c.is_finite())?;
        let peak = peak_total_gbps.filter(|p| p.is_finite())?;
        Some(peak / capacity * 100.0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityStatus::Critical => "CRITICAL (>90%)",
            CapacityStatus::Warning => "WARNING (75-90%)",
            CapacityStatus::Normal => "NORMAL (<75%)",
        }
    }
}

impl fmt::Display for CapacityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A scalar or small table computed from one report's rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DerivedMetric {
    Scalar {
        key: String,
        label: String,
        value: CellValue,
        display: String,
    },
    Table {
        key: String,
        table: TabularResult,
    },
}

impl DerivedMetric {
    pub fn key(&self) -> &str {
        match self {
            DerivedMetric::Scalar { key, .. } | DerivedMetric::Table { key, .. } => key,
        }
    }
}
