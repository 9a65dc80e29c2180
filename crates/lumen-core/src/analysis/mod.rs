//! Numeric processing over sample windows
//!
//! - [`dispersion`]: activity score and tier classification
//! - [`aggregation`]: tier-driven collapse of a window into representative values
//! - [`regression`]: Theil-Sen fit of temperature against light

pub mod aggregation;
pub mod dispersion;
pub mod regression;

pub use aggregation::AggregationResult;
pub use dispersion::{Dispersion, DispersionClassifier};
pub use regression::{RegressionResult, median};

/// Number of contiguous groups a window collapses into at the `Triple` tier
pub const TRIPLE_GROUPS: usize = 3;

/// Activity tier derived from the dispersion of the light window
///
/// Each tier decides how many aggregate values a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Tier {
    /// Low activity: the whole window collapses into its mean
    Single,
    /// Moderate activity: three group means
    Triple,
    /// High activity: every sample is reported unchanged
    Full,
}

impl Tier {
    /// Number of aggregate values a report at this tier carries
    pub const fn aggregate_count<const N: usize>(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Triple => TRIPLE_GROUPS,
            Self::Full => N,
        }
    }

    /// Number of raw samples folded into each aggregate value
    pub const fn group_size<const N: usize>(self) -> usize {
        N / self.aggregate_count::<N>()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Triple => "Triple",
            Self::Full => "Full",
        }
    }
}

/// Arithmetic mean; `0.0` for an empty slice.
pub(crate) fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_shapes_for_reference_window() {
        assert_eq!(Tier::Single.aggregate_count::<12>(), 1);
        assert_eq!(Tier::Triple.aggregate_count::<12>(), 3);
        assert_eq!(Tier::Full.aggregate_count::<12>(), 12);

        assert_eq!(Tier::Single.group_size::<12>(), 12);
        assert_eq!(Tier::Triple.group_size::<12>(), 4);
        assert_eq!(Tier::Full.group_size::<12>(), 1);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
    }
}
