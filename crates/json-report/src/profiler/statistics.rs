//! Statistical functions used by the page renderers.
//!
//! Everything here works on plain slices so it can be tested without a
//! dataset or a drawing surface.

use polars::prelude::cov::pearson_corr;
use polars::prelude::{Float64Chunked, NewChunkedArray};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Upper bound on histogram bins; very small IQRs would otherwise explode
/// the bin count.
pub const MAX_HISTOGRAM_BINS: usize = 200;

/// Number of categories shown per categorical column.
pub const TOP_CATEGORY_LIMIT: usize = 10;

/// Linear-interpolated quantile of an already sorted slice.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    lerp(values[lower], values[upper], weight)
}

/// Point `t` of the way from `low` to `high`.
///
/// Written as a weighted sum so values near `f64::MAX` of opposite sign do
/// not overflow the way `low + (high - low) * t` does.
pub fn lerp(low: f64, high: f64, t: f64) -> f64 {
    low * (1.0 - t) + high * t
}

/// Half the distance from `low` to `high`; finite for any finite inputs.
pub fn half_span(low: f64, high: f64) -> f64 {
    high / 2.0 - low / 2.0
}

/// Sample standard deviation (n - 1 denominator); 0.0 below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

// ============================================================================
// Histogram
// ============================================================================

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges; always one longer than `counts`.
    pub edges: Vec<f64>,
    /// Number of values in each bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Width of every bin.
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(first), Some(second)) => second - first,
            _ => 0.0,
        }
    }

    /// Lowest and highest edge.
    pub fn span(&self) -> (f64, f64) {
        let low = self.edges.first().copied().unwrap_or(0.0);
        let high = self.edges.last().copied().unwrap_or(low);
        (low, high)
    }

    /// Tallest bin.
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(start, end, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(edge, count)| (edge[0], edge[1], *count))
    }
}

/// Bin `values` using the "auto" rule: the smaller of the Sturges and
/// Freedman-Diaconis bin widths, falling back to Sturges when the IQR is 0.
///
/// A constant series gets a single bin of width 1 centred on the value,
/// widened only when the value is too large for `±0.5` to register.
/// Edges stay finite for any finite input.
pub fn histogram(values: &[f64]) -> Histogram {
    if values.is_empty() {
        return Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
        };
    }

    let sorted = sorted_copy(values);
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];
    let half_range = half_span(min, max);

    if half_range <= 0.5 * f64::EPSILON * min.abs().max(1.0) {
        let pad = if min - 0.5 < min && min + 0.5 > min {
            0.5
        } else {
            min.abs() * 1e-9
        };
        return Histogram {
            edges: vec![(min - pad).max(f64::MIN), (min + pad).min(f64::MAX)],
            counts: vec![n],
        };
    }

    // the bin count of the narrower of the Sturges and Freedman-Diaconis widths
    let sturges_bins = (n as f64).log2() + 1.0;
    let half_iqr = half_span(quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75));
    let fd_bins = if half_iqr > 0.0 {
        half_range / (2.0 * half_iqr * (n as f64).powf(-1.0 / 3.0))
    } else {
        0.0
    };

    let bin_count = (sturges_bins.max(fd_bins).ceil() as usize).clamp(1, MAX_HISTOGRAM_BINS);
    let edges: Vec<f64> = (0..=bin_count)
        .map(|i| lerp(min, max, i as f64 / bin_count as f64))
        .collect();

    let mut counts = vec![0usize; bin_count];
    for value in &sorted {
        let fraction = half_span(min, *value) / half_range;
        let index = ((fraction * bin_count as f64) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    Histogram { edges, counts }
}

// ============================================================================
// Kernel density
// ============================================================================

/// Gaussian kernel density estimate evaluated on `grid_size` evenly spaced
/// points between `lower` and `upper`.
///
/// The bandwidth follows Scott's rule, `std * n^(-1/5)`. Returns `None` when
/// fewer than two values are given or the values have no spread.
pub fn gaussian_kde(
    values: &[f64],
    lower: f64,
    upper: f64,
    grid_size: usize,
) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    if n < 2 || grid_size < 2 {
        return None;
    }
    let std = sample_std(values);
    if std <= 0.0 || !std.is_finite() {
        return None;
    }

    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * PI).sqrt());
    let curve = (0..grid_size)
        .map(|i| {
            let x = lerp(lower, upper, i as f64 / (grid_size - 1) as f64);
            let density: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, density * norm)
        })
        .collect();

    Some(curve)
}

// ============================================================================
// Boxplot
// ============================================================================

/// Tukey boxplot summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub whisker_low: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub whisker_high: f64,
    /// Values beyond the whiskers.
    pub fliers: Vec<f64>,
}

/// Compute boxplot statistics; `None` for an empty slice.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let whisker_low = sorted
        .iter()
        .copied()
        .find(|v| *v >= lower_fence)
        .unwrap_or(q1);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= upper_fence)
        .unwrap_or(q3);
    let fliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < whisker_low || *v > whisker_high)
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_low,
        whisker_high,
        fliers,
    })
}

// ============================================================================
// Category frequencies
// ============================================================================

/// A distinct value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// The `limit` most frequent values, most frequent first.
///
/// Ties keep the order in which values first appear in the data.
pub fn top_categories(values: &[String], limit: usize) -> Vec<CategoryCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<CategoryCount> = Vec::new();

    for value in values {
        match index.get(value.as_str()) {
            Some(&position) => entries[position].count += 1,
            None => {
                index.insert(value.as_str(), entries.len());
                entries.push(CategoryCount {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable: equal counts stay in first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}

// ============================================================================
// Correlation
// ============================================================================

/// Pearson correlation over pairwise-complete observations.
///
/// Returns `None` with fewer than two complete pairs or when either side
/// has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .unzip();

    if xs.len() < 2 || is_constant(&xs) || is_constant(&ys) {
        return None;
    }

    let xs = Float64Chunked::from_vec("x".into(), xs);
    let ys = Float64Chunked::from_vec("y".into(), ys);
    pearson_corr(&xs, &ys)
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Symmetric correlation matrix over named numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficients; `NaN` where the coefficient is undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

/// Pairwise Pearson correlations between every pair of columns.
pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let size = columns.len();
    let mut values = vec![vec![f64::NAN; size]; size];

    for i in 0..size {
        for j in i..size {
            let coefficient = pearson(&columns[i].1, &columns[j].1).unwrap_or(f64::NAN);
            values[i][j] = coefficient;
            values[j][i] = coefficient;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}
