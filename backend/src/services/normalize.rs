//! Result normalization.
//!
//! Warehouses differ in how they spell column names and in how they ship
//! numbers. Everything a report returns passes through [`normalize`], which
//! produces a table with canonical lower-case keys and numeric cells, then
//! applies the report's post-processing: sentiment buckets for the ticket
//! sample, capacity buckets for circuits, and formatted KPI scalars.

use std::collections::{BTreeMap, HashSet};

use super::format::{format_count, format_currency};
use crate::models::{
    CapacityStatus, CellValue, Column, ColumnType, DerivedMetric, ReportKind, SentimentBucket,
    TabularError, TabularResult,
};

/// Table plus metrics for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: TabularResult,
    pub metrics: Vec<DerivedMetric>,
}

/// Canonical key for a warehouse column name.
pub fn canonical_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn coerce_cell(
    cell: CellValue,
    column: &Column,
    row: usize,
) -> Result<CellValue, TabularError> {
    let mismatch = |value: &str| TabularError::TypeMismatch {
        column: column.name.clone(),
        row,
        value: value.to_string(),
        expected: column.column_type,
    };

    match (column.column_type, cell) {
        (ColumnType::Integer, CellValue::String(text)) => {
            let trimmed = text.trim();
            if let Ok(v) = trimmed.parse::<i64>() {
                return Ok(CellValue::Integer(v));
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&v) => {
                    Ok(CellValue::Integer(v as i64))
                }
                _ => Err(mismatch(&text)),
            }
        }
        (ColumnType::Decimal, CellValue::String(text)) => text
            .trim()
            .parse::<f64>()
            .map(CellValue::Decimal)
            .map_err(|_| mismatch(&text)),
        (ColumnType::Decimal, CellValue::Integer(v)) => Ok(CellValue::Decimal(v as f64)),
        (_, cell) => Ok(cell),
    }
}

/// Rename columns to canonical keys and coerce numeric text.
///
/// Fails when two columns collapse to the same key or a numeric column holds
/// text that does not parse.
pub fn canonicalize(raw: TabularResult) -> Result<TabularResult, TabularError> {
    let (columns, rows) = raw.into_parts();

    let mut seen = HashSet::with_capacity(columns.len());
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|c| {
            let key = canonical_key(&c.name);
            if seen.insert(key.clone()) {
                Ok(Column::new(key, c.column_type))
            } else {
                Err(TabularError::DuplicateColumn(key))
            }
        })
        .collect::<Result<_, _>>()?;

    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_iter()
                .zip(&columns)
                .map(|(cell, column)| coerce_cell(cell, column, i))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    TabularResult::new(columns, rows)
}

/// Canonicalize `raw` and apply the post-processing for `kind`.
pub fn normalize(kind: ReportKind, raw: TabularResult) -> Result<Normalized, TabularError> {
    let table = canonicalize(raw)?;
    match kind {
        ReportKind::KpiSummary => kpi_metrics(table),
        ReportKind::AiTicketSentiment => classify_sentiment(table),
        ReportKind::CapacityDistribution => classify_capacity(table),
        _ => Ok(Normalized {
            table,
            metrics: Vec::new(),
        }),
    }
}

enum KpiFormat {
    Count,
    Currency,
}

const KPI_FIELDS: [(&str, &str, KpiFormat); 6] = [
    ("total_nodes", "Network Nodes", KpiFormat::Count),
    ("active_circuits", "Active Circuits", KpiFormat::Count),
    ("active_customers", "Active Customers", KpiFormat::Count),
    ("critical_events_7d", "Critical Events (7d)", KpiFormat::Count),
    ("total_mrr", "Total MRR", KpiFormat::Currency),
    ("open_tickets", "Open Tickets", KpiFormat::Count),
];

/// Shown for a KPI whose value is NULL.
pub const MISSING_DISPLAY: &str = "n/a";

fn kpi_metrics(table: TabularResult) -> Result<Normalized, TabularError> {
    let mut metrics = Vec::with_capacity(KPI_FIELDS.len());
    for (key, label, format) in &KPI_FIELDS {
        let idx = table.require_column(key)?;
        let value = table
            .rows()
            .first()
            .and_then(|row| row.get(idx))
            .cloned()
            .unwrap_or(CellValue::Null);
        let display = match (format, value.as_f64()) {
            (_, None) => MISSING_DISPLAY.to_string(),
            (KpiFormat::Count, Some(v)) => format_count(v.round() as i64),
            (KpiFormat::Currency, Some(v)) => format_currency(v),
        };
        metrics.push(DerivedMetric::Scalar {
            key: key.to_string(),
            label: label.to_string(),
            value,
            display,
        });
    }
    Ok(Normalized { table, metrics })
}

/// Distribution table sorted by count descending, ties in bucket order.
fn distribution<K: Ord + Copy>(
    counts: BTreeMap<K, i64>,
    label: impl Fn(K) -> &'static str,
    key_column: &str,
    count_column: &str,
) -> Result<TabularResult, TabularError> {
    let mut entries: Vec<(K, i64)> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut table = TabularResult::builder()
        .column(key_column, ColumnType::String)
        .column(count_column, ColumnType::Integer);
    for (bucket, count) in entries {
        table.push_row(vec![label(bucket).into(), count.into()]);
    }
    table.build()
}

/// Buckets the unrounded score when the result carries one; the rounded
/// `sentiment_score` is for display.
fn classify_sentiment(table: TabularResult) -> Result<Normalized, TabularError> {
    let score_idx = match table.column_index("sentiment_raw") {
        Some(idx) => idx,
        None => table.require_column("sentiment_score")?,
    };
    let (mut columns, rows) = table.into_parts();
    columns.push(Column::new("sentiment", ColumnType::String));

    let mut counts: BTreeMap<SentimentBucket, i64> = BTreeMap::new();
    let rows = rows
        .into_iter()
        .map(|mut row| {
            let bucket = row
                .get(score_idx)
                .and_then(CellValue::as_f64)
                .map(SentimentBucket::classify);
            if let Some(bucket) = bucket {
                *counts.entry(bucket).or_default() += 1;
            }
            row.push(bucket.map(|b| b.as_str()).into());
            row
        })
        .collect();

    let table = TabularResult::new(columns, rows)?;
    let summary = distribution(counts, |b| b.as_str(), "sentiment", "count")?;
    Ok(Normalized {
        table,
        metrics: vec![DerivedMetric::Table {
            key: "sentiment_distribution".to_string(),
            table: summary,
        }],
    })
}

fn classify_capacity(table: TabularResult) -> Result<Normalized, TabularError> {
    let capacity_idx = table.require_column("capacity_gbps")?;
    let peak_idx = table.require_column("peak_total_gbps")?;
    let (mut columns, rows) = table.into_parts();
    columns.push(Column::new("peak_util_pct", ColumnType::Decimal));
    columns.push(Column::new("capacity_status", ColumnType::String));

    let mut counts: BTreeMap<CapacityStatus, i64> = BTreeMap::new();
    let rows = rows
        .into_iter()
        .filter_map(|mut row| {
            let capacity = row.get(capacity_idx).and_then(CellValue::as_f64);
            let peak = row.get(peak_idx).and_then(CellValue::as_f64);
            let pct = CapacityStatus::peak_pct(peak, capacity)?;
            let status = CapacityStatus::from_peak_pct(pct);
            *counts.entry(status).or_default() += 1;
            row.push(((pct * 10.0).round() / 10.0).into());
            row.push(status.label().into());
            Some(row)
        })
        .collect();

    let table = TabularResult::new(columns, rows)?;
    let summary = distribution(counts, |s| s.label(), "capacity_status", "circuit_count")?;
    Ok(Normalized {
        table,
        metrics: vec![DerivedMetric::Table {
            key: "capacity_status_distribution".to_string(),
            table: summary,
        }],
    })
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod normalize_tests;
