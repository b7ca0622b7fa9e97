//! Report ingestion: parse, validate, and reduce an uploaded document.

use crate::metrics;
use crate::reduce::reduce;
use crate::report::{ReportDocument, StoredMetric};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// A report that passed validation and is ready to store.
#[derive(Debug)]
pub struct IngestedReport {
    pub date: NaiveDateTime,
    pub metrics: BTreeMap<String, StoredMetric>,
    /// The raw document text, kept for run-table rendering.
    pub raw: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("malformed report document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("bad report date '{date}': {source}")]
    BadDate {
        date: String,
        source: chrono::ParseError,
    },
    #[error("metric '{0}' has no samples")]
    EmptyMetric(String),
}

/// Parse an uploaded document and reduce every metric's samples to the
/// scalar that will be stored.
pub fn ingest(raw: &str) -> Result<IngestedReport, UploadError> {
    let doc = ReportDocument::parse(raw)?;
    let date = doc.date().map_err(|source| UploadError::BadDate {
        date: doc.date.clone(),
        source,
    })?;

    let mut reduced = BTreeMap::new();
    for (name, metric) in &doc.metrics {
        let Some(value) = reduce(&metric.units, &metric.values) else {
            return Err(UploadError::EmptyMetric(name.clone()));
        };
        metrics::METRICS_REDUCED.increment();
        reduced.insert(
            name.clone(),
            StoredMetric {
                name: name.clone(),
                description: metric.description.clone(),
                units: metric.units.clone(),
                value,
            },
        );
    }

    Ok(IngestedReport {
        date,
        metrics: reduced,
        raw: raw.to_string(),
    })
}
