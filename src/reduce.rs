//! Reduction of repeated-run samples to a single representative value.
//!
//! An uploaded metric may carry one sample per run. Only one scalar is
//! stored per metric, chosen to be the run least affected by measurement
//! noise: for time-valued metrics that is the fastest run, for rate-like
//! (inverse time) metrics the largest, and for everything else the median.

use crate::units::time_exponent;

/// Pick the representative value for a metric's run samples.
///
/// Returns `None` when the sample list is empty; there is no value to
/// fabricate from no data.
pub fn reduce(units: &str, samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let exponent = time_exponent(units);
    let value = if exponent > 0 {
        samples.iter().copied().fold(f64::INFINITY, f64::min)
    } else if exponent < 0 {
        samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    } else {
        median(samples)
    };

    Some(value)
}

fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
