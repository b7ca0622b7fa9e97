//! Display formatting for one row of comparable metric values.
//!
//! A row holds the same metric across several reports (or runs), so all
//! values share one input unit. Formatting picks a common display unit and
//! enough significant digits that nearby values stay distinguishable
//! without showing false precision.

use crate::units::{byte_multiplier, time_multiplier};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Format a row of values sharing `units` into display strings plus the
/// display unit for the row.
///
/// The decision uses three inputs: the absolute magnitude of the values,
/// the difference between them, and the unit. Absent values render as empty
/// strings in place. Unknown units pass through unscaled and unsuffixed.
pub fn format_values(values: &[Option<f64>], units: &str) -> (Vec<String>, String) {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return (vec![String::new(); values.len()], units.to_string());
    }

    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let mut high = max.max(-min);
    let mut diff = max - min;
    let mut suffix = "";
    let mut mult = 1.0;
    let mut units = units.to_string();

    if let Some(bytes) = byte_multiplier(&units) {
        mult = bytes;

        // When the values differ by only a few bytes, displaying fractional
        // K/M with a lot of precision helps nobody; keep the input scale.
        if diff == 0.0 || diff > 100.0 {
            if high * mult >= MIB {
                mult /= MIB;
                suffix = "M";
                units = "MiB".to_string();
            } else if high * mult >= KIB {
                mult /= KIB;
                suffix = "K";
                units = "KiB".to_string();
            } else {
                units = "B".to_string();
            }
        }
    } else if let Some(seconds) = time_multiplier(&units) {
        mult = seconds;

        if high * mult >= 0.1 {
            suffix = "s";
            units = "s".to_string();
        } else if high * mult >= 0.0001 {
            suffix = "ms";
            units = "ms".to_string();
            mult *= 1000.0;
        } else {
            suffix = "us";
            units = "us".to_string();
            mult *= 1_000_000.0;
        }
    }

    high *= mult;
    diff *= mult;

    let digits = if high == 0.0 {
        1
    } else {
        let mut digits = (1 + high.log10().floor() as i64).clamp(3, 6);
        // With several values on the row, widen until neighbors are
        // distinguishable, even past the usual six-digit ceiling.
        if values.len() > 1 && diff > 0.0 {
            let diff_digits = 1 + high.log10().floor() as i64 - diff.log10().floor() as i64;
            digits = digits.max(diff_digits);
        }
        digits
    };

    let formatted = values
        .iter()
        .map(|v| match v {
            Some(v) => format!("{}{}", format_sig(mult * v, digits.max(1) as usize), suffix),
            None => String::new(),
        })
        .collect();

    (formatted, units)
}

/// Render `value` with exactly `digits` significant figures, switching to
/// scientific notation when the magnitude falls outside the fixed-point
/// range, matching C's `%g` conversion. Trailing zeros are trimmed and the
/// scientific exponent is signed with at least two digits.
fn format_sig(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        // NaN and infinities carry no exponent
        return sci;
    };
    let Ok(exponent) = exponent.parse::<i64>() else {
        return sci;
    };

    let sign = if mantissa.starts_with('-') { "-" } else { "" };
    let digs: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    if exponent < -4 || exponent >= digits as i64 {
        let head = &digs[..1];
        let tail = digs[1..].trim_end_matches('0');
        if tail.is_empty() {
            format!("{sign}{head}e{exponent:+03}")
        } else {
            format!("{sign}{head}.{tail}e{exponent:+03}")
        }
    } else if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        let tail = digs.trim_end_matches('0');
        format!("{sign}0.{zeros}{tail}")
    } else {
        let split = exponent as usize + 1;
        let head = &digs[..split];
        let tail = digs[split..].trim_end_matches('0');
        if tail.is_empty() {
            format!("{sign}{head}")
        } else {
            format!("{sign}{head}.{tail}")
        }
    }
}
