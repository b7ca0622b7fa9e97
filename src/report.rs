//! Uploaded report documents and their stored form.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The subset of ISO 8601 that `isoformat()`-style clients produce, with an
/// optional fractional-second part.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A parsed report upload: a date plus one entry per metric.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportDocument {
    pub date: String,
    pub metrics: BTreeMap<String, MetricSamples>,
}

/// One metric as uploaded: a unit, one sample per run, and a description.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricSamples {
    pub units: String,
    #[serde(deserialize_with = "one_or_many")]
    pub values: Vec<f64>,
    #[serde(default)]
    pub description: String,
}

impl ReportDocument {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse the document's date field.
    pub fn date(&self) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT)
    }
}

/// One reduced metric as persisted per (report, metric name).
#[derive(Debug, Clone, Serialize)]
pub struct StoredMetric {
    pub name: String,
    pub description: String,
    pub units: String,
    pub value: f64,
}

// Single-run uploads may carry a bare number instead of a one-element array.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(f64),
        Many(Vec<f64>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(v) => vec![v],
        OneOrMany::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let doc = ReportDocument::parse(
            r#"{
                "date": "2026-08-05T12:34:56.789",
                "metrics": {
                    "redraw_time": {
                        "units": "ms",
                        "values": [12.5, 11.9, 12.1],
                        "description": "Time to redraw the frame"
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(doc.metrics.len(), 1);
        let metric = &doc.metrics["redraw_time"];
        assert_eq!(metric.units, "ms");
        assert_eq!(metric.values, vec![12.5, 11.9, 12.1]);
        assert_eq!(metric.description, "Time to redraw the frame");

        let date = doc.date().unwrap();
        assert_eq!(date.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-08-05 12:34:56");
    }

    #[test]
    fn test_scalar_value_becomes_single_sample() {
        let doc = ReportDocument::parse(
            r#"{
                "date": "2026-08-05T00:00:00",
                "metrics": {
                    "heap_used": { "units": "B", "values": 4096 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(doc.metrics["heap_used"].values, vec![4096.0]);
        assert_eq!(doc.metrics["heap_used"].description, "");
    }

    #[test]
    fn test_date_without_fraction() {
        let doc = ReportDocument::parse(
            r#"{ "date": "2026-08-05T01:02:03", "metrics": {} }"#,
        )
        .unwrap();
        assert!(doc.date().is_ok());
    }

    #[test]
    fn test_bad_date_rejected() {
        let doc = ReportDocument::parse(
            r#"{ "date": "yesterday", "metrics": {} }"#,
        )
        .unwrap();
        assert!(doc.date().is_err());
    }

    #[test]
    fn test_malformed_document_rejected() {
        assert!(ReportDocument::parse("not json").is_err());
        assert!(ReportDocument::parse(r#"{ "metrics": {} }"#).is_err());
    }

    #[test]
    fn test_metric_names_iterate_sorted() {
        let doc = ReportDocument::parse(
            r#"{
                "date": "2026-08-05T00:00:00",
                "metrics": {
                    "z_metric": { "units": "", "values": [1] },
                    "a_metric": { "units": "", "values": [2] }
                }
            }"#,
        )
        .unwrap();
        let names: Vec<_> = doc.metrics.keys().cloned().collect();
        assert_eq!(names, vec!["a_metric", "z_metric"]);
    }
}
