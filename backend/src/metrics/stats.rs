//! Order statistics over turnaround samples
//!
//! Every helper sorts a copy and leaves the input untouched. Empty input
//! yields 0.0 ("no data yet"), never an error.

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Median with the even-length midpoint average
///
/// ```
/// use triage_simulator_core_rs::metrics::median;
///
/// assert_eq!(median(&[40.0, 10.0, 30.0, 20.0]), 25.0);
/// assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
/// assert_eq!(median(&[]), 0.0);
/// ```
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(values);
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Nearest-rank percentile: element at `floor(q * n)`, clamped to `n - 1`
///
/// ```
/// use triage_simulator_core_rs::metrics::percentile;
///
/// // floor(0.9 * 4) = 3
/// assert_eq!(percentile(&[10.0, 20.0, 30.0, 40.0], 0.9), 40.0);
/// assert_eq!(percentile(&[], 0.9), 0.0);
/// ```
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(values);
    let raw = (q.clamp(0.0, 1.0) * sorted.len() as f64).floor() as usize;
    sorted[raw.min(sorted.len() - 1)]
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Largest value, 0.0 for empty input
pub fn max_or_zero(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, f64::max)
}
