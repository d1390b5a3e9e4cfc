//! Percentile and average helpers shared by the reporters.

/// Compute the `p`-th percentile of a **sorted** slice using linear
/// interpolation between the two nearest ranks.
///
/// Returns `0.0` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

/// Distribution summary of a set of integer samples.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileSummary {
    pub p25: f64,
    pub p50: f64,
    pub p99: f64,
    pub max: i64,
    pub count: usize,
}

impl QuantileSummary {
    /// Summarise `values`. Returns `None` when there is nothing to summarise.
    pub fn from_values(values: &[i64]) -> Option<Self> {
        let max = *values.iter().max()?;
        let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            p25: percentile(&sorted, 25.0),
            p50: percentile(&sorted, 50.0),
            p99: percentile(&sorted, 99.0),
            max,
            count: values.len(),
        })
    }
}

/// `total / count`, or `0.0` when `count` is zero.
pub fn mean(total: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
