//! The few aggregate measures the analyses need, over ascending-sorted data.

/// Median of an ascending-sorted slice.
///
/// Even lengths average the two central elements (zero-based `n/2 - 1` and
/// `n/2`). Downstream comparisons depend on exactly this tie-break.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Percentile `p` (0..=100) of an ascending-sorted slice, with linear
/// interpolation between the two nearest ranks.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Sort a series ascending; NaNs are not expected in survey data but must not
/// poison the order if they appear.
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}
