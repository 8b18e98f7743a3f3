//! Safe arithmetic shared by every derived metric

use std::cmp::Ordering;

/// `numerator / denominator`, or 0 when the denominator is not positive
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let value = numerator / denominator;
        if value.is_finite() { value } else { 0.0 }
    } else {
        0.0
    }
}

/// Percentage form of [`safe_div`]
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    safe_div(numerator, denominator) * 100.0
}

/// Total order for metric values; NaN sorts after every number
pub fn compare_f64(a: f64, b: f64) -> Ordering {
    if a.is_nan() && b.is_nan() {
        Ordering::Equal
    } else if a.is_nan() {
        Ordering::Greater
    } else if b.is_nan() {
        Ordering::Less
    } else {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }
}
