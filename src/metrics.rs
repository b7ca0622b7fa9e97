//! Service metrics exposed on the Prometheus endpoint.

use metriken::{AtomicHistogram, Counter, Gauge, metric};

#[metric(name = "reports_received", description = "Report uploads accepted")]
pub static REPORTS_RECEIVED: Counter = Counter::new();

#[metric(name = "reports_rejected", description = "Report uploads rejected")]
pub static REPORTS_REJECTED: Counter = Counter::new();

#[metric(
    name = "metrics_reduced",
    description = "Metric sample sets reduced to a stored value"
)]
pub static METRICS_REDUCED: Counter = Counter::new();

#[metric(name = "tables_rendered", description = "Comparison tables rendered")]
pub static TABLES_RENDERED: Counter = Counter::new();

#[metric(name = "systems_registered", description = "Registered systems")]
pub static SYSTEMS_REGISTERED: Gauge = Gauge::new();

#[metric(
    name = "report_size_bytes",
    description = "Uploaded report document sizes (bytes)"
)]
pub static REPORT_SIZE_BYTES: AtomicHistogram = AtomicHistogram::new(7, 32);

/// Render every registered metric in Prometheus text exposition format.
pub fn prometheus_exposition() -> String {
    let mut output = String::new();

    for metric in metriken::metrics().iter() {
        let name = metric.name();
        let value = match metric.value() {
            Some(v) => v,
            None => continue,
        };

        match value {
            metriken::Value::Counter(v) => {
                output.push_str(&format!("# TYPE {} counter\n", name));
                output.push_str(&format!("{} {}\n", name, v));
            }
            metriken::Value::Gauge(v) => {
                output.push_str(&format!("# TYPE {} gauge\n", name));
                output.push_str(&format!("{} {}\n", name, v));
            }
            metriken::Value::Other(any) => {
                if let Some(histogram) = any.downcast_ref::<metriken::AtomicHistogram>()
                    && let Some(snapshot) = histogram.load()
                {
                    output.push_str(&format!("# TYPE {} histogram\n", name));

                    // Percentiles as summary-style metrics
                    let percentiles = [50.0, 90.0, 99.0, 99.9];
                    if let Ok(Some(results)) = snapshot.percentiles(&percentiles) {
                        for (pct, bucket) in results {
                            let quantile = pct / 100.0;
                            output.push_str(&format!(
                                "{}{{quantile=\"{}\"}} {}\n",
                                name,
                                quantile,
                                bucket.end()
                            ));
                        }
                    }

                    // Count and sum, approximating each bucket by its midpoint
                    let mut count = 0u64;
                    let mut sum = 0u64;
                    for bucket in snapshot.into_iter() {
                        let bucket_count = bucket.count();
                        count += bucket_count;
                        let midpoint = (bucket.start() + bucket.end()) / 2;
                        sum += bucket_count * midpoint;
                    }
                    output.push_str(&format!("{}_count {}\n", name, count));
                    output.push_str(&format!("{}_sum {}\n", name, sum));
                }
            }
            _ => {}
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposition_includes_registered_metrics() {
        REPORTS_RECEIVED.increment();
        let output = prometheus_exposition();
        assert!(output.contains("# TYPE reports_received counter"));
        assert!(output.contains("# TYPE systems_registered gauge"));
    }
}
