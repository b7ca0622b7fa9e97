//! Comparison tables across reports and across runs.
//!
//! A `ReportTable` compares the stored reduced values of several reports,
//! one column per report. A `RunTable` compares the individual runs inside
//! one report document, one column per run. Both produce the same `Table`
//! shape, so renderers do not care which one they got.

pub mod format;

pub use format::format_values;

use crate::report::ReportDocument;
use crate::store::Report;
use serde::Serialize;
use std::sync::Arc;

/// Header of one table column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnHeader {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Identity of the metric on a row.
#[derive(Debug, Clone, Serialize)]
pub struct RowMetric {
    pub name: String,
    pub description: String,
}

/// One formatted table row: a metric, its display unit, and one display
/// string per column (empty where the metric is absent).
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub metric: RowMetric,
    pub units: String,
    pub values: Vec<String>,
}

/// A rendered comparison table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<Row>,
}

/// Builder for a table comparing reduced metrics across several reports.
#[derive(Default)]
pub struct ReportTable {
    reports: Vec<Arc<Report>>,
    columns: Vec<ColumnHeader>,
}

impl ReportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_report(&mut self, report: Arc<Report>, name: impl Into<String>, link: Option<String>) {
        self.reports.push(report);
        self.columns.push(ColumnHeader {
            name: name.into(),
            link,
        });
    }

    /// Build the formatted table. The row set is the metric set of the
    /// latest report by date, in metric name order; columns keep the order
    /// the reports were added in.
    pub fn build(self) -> Table {
        let Some(latest) = self.reports.iter().max_by_key(|r| r.date).cloned() else {
            return Table {
                columns: self.columns,
                rows: Vec::new(),
            };
        };

        let rows = latest
            .metrics
            .values()
            .map(|metric| {
                let values: Vec<Option<f64>> = self
                    .reports
                    .iter()
                    .map(|report| report.metrics.get(&metric.name).map(|m| m.value))
                    .collect();
                let (formatted, units) = format_values(&values, &metric.units);
                Row {
                    metric: RowMetric {
                        name: metric.name.clone(),
                        description: metric.description.clone(),
                    },
                    units,
                    values: formatted,
                }
            })
            .collect();

        Table {
            columns: self.columns,
            rows,
        }
    }
}

/// Table comparing the individual runs within a single report document.
pub struct RunTable<'a> {
    doc: &'a ReportDocument,
}

impl<'a> RunTable<'a> {
    pub fn new(doc: &'a ReportDocument) -> Self {
        Self { doc }
    }

    /// Build the formatted table. Columns are `Run 1..N` where N is the run
    /// count of the first metric in name order; one row per metric.
    pub fn build(self) -> Table {
        let columns = match self.doc.metrics.values().next() {
            Some(first) => (0..first.values.len())
                .map(|i| ColumnHeader {
                    name: format!("Run {}", i + 1),
                    link: None,
                })
                .collect(),
            None => Vec::new(),
        };

        let rows = self
            .doc
            .metrics
            .iter()
            .map(|(name, metric)| {
                let values: Vec<Option<f64>> = metric.values.iter().copied().map(Some).collect();
                let (formatted, units) = format_values(&values, &metric.units);
                Row {
                    metric: RowMetric {
                        name: name.clone(),
                        description: metric.description.clone(),
                    },
                    units,
                    values: formatted,
                }
            })
            .collect();

        Table { columns, rows }
    }
}
