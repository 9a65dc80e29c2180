//! Theil-Sen robust linear regression
//!
//! The slope is the median of all pairwise slopes between points with distinct
//! independent values, and the intercept is the median of the per-point offsets
//! under that slope. Outliers move neither median much, which keeps a single bad
//! light reading from skewing the temperature model.

use alloc::vec::Vec;

use log::warn;

/// Median of `values`, or `None` if empty.
///
/// Sorts a copy; the input order is left untouched. An even count averages the two
/// central elements.
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }

    let mut sorted: Vec<f32> = values.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);

    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(median)
}

/// Theil-Sen fit of a dependent window against an independent one
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResult<const N: usize> {
    pub slope: f32,
    pub intercept: f32,
    /// `slope * independent[i] + intercept` for each window position
    pub fitted: [f32; N],
    /// Number of pairwise slopes the median was taken over. Zero means every
    /// independent value was identical and the flat fallback line was used.
    pub candidates: usize,
}

impl<const N: usize> RegressionResult<N> {
    /// Fit `dependent = slope * independent + intercept`.
    ///
    /// If no pair of independent values differ there is no slope to take a median
    /// of; the slope then falls back to `0`, which makes the intercept the median of
    /// `dependent`.
    pub fn fit(independent: &[f32; N], dependent: &[f32; N]) -> Self {
        let mut slopes: Vec<f32> = Vec::with_capacity(N * N.saturating_sub(1) / 2);
        for i in 0..N {
            for j in (i + 1)..N {
                if independent[i] != independent[j] {
                    slopes.push((dependent[j] - dependent[i]) / (independent[j] - independent[i]));
                }
            }
        }

        let slope = median(&slopes).unwrap_or_else(|| {
            warn!("Theil-Sen: no distinct independent values, falling back to a flat fit");
            0.0
        });

        let mut offsets = [0.0f32; N];
        for (offset, (x, y)) in offsets.iter_mut().zip(independent.iter().zip(dependent)) {
            *offset = y - slope * x;
        }
        let intercept = median(&offsets).unwrap_or(0.0);

        let mut fitted = [0.0f32; N];
        for (estimate, x) in fitted.iter_mut().zip(independent) {
            *estimate = slope * x + intercept;
        }

        Self {
            slope,
            intercept,
            fitted,
            candidates: slopes.len(),
        }
    }

    pub const fn is_degenerate(&self) -> bool {
        self.candidates == 0
    }

    /// Evaluate the fitted line at `x`.
    pub fn estimate(&self, x: f32) -> f32 {
        self.slope * x + self.intercept
    }
}
