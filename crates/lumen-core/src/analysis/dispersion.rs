//! Activity classification by dispersion of the light window

use log::warn;

use super::{Tier, mean};
use crate::config::{DispersionMetric, TierThresholds};

/// Starting estimate for the Newton iteration
const SQRT_INITIAL_GUESS: f32 = 10.0;

/// Upper bound on Newton refinement steps
const SQRT_MAX_ITERATIONS: usize = 50;

/// Refinement stops once `|x² - S|` falls below this
const SQRT_TOLERANCE: f32 = 0.001;

/// Square root by Newton's method.
///
/// Never fails: if the tolerance is not met within the iteration cap the last
/// estimate is returned. `0` maps to exactly `0`; negative or NaN input gives NaN.
pub fn newton_sqrt(s: f32) -> f32 {
    if s.is_nan() || s < 0.0 {
        return f32::NAN;
    }
    if s == 0.0 {
        return 0.0;
    }

    let mut x = SQRT_INITIAL_GUESS;
    for _ in 0..SQRT_MAX_ITERATIONS {
        x = 0.5 * (x + s / x);
        let mut difference = x * x - s;
        if difference < 0.0 {
            difference = -difference;
        }
        if difference < SQRT_TOLERANCE {
            return x;
        }
    }

    warn!("sqrt({}) did not converge, using estimate {}", s, x);
    x
}

/// Dispersion score of a window together with the tier it maps to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispersion {
    pub score: f32,
    pub tier: Tier,
}

/// Maps the spread of a window to an activity [`Tier`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DispersionClassifier {
    thresholds: TierThresholds,
    metric: DispersionMetric,
}

impl DispersionClassifier {
    pub const fn new(thresholds: TierThresholds, metric: DispersionMetric) -> Self {
        Self { thresholds, metric }
    }

    /// Dispersion score of `window` under the configured metric.
    ///
    /// With [`DispersionMetric::Unscaled`] this is the root of the summed squared
    /// deviations, *not* divided by the sample count.
    pub fn score(&self, window: &[f32]) -> f32 {
        if window.is_empty() {
            return 0.0;
        }

        let mean = mean(window);
        let sum_of_squares: f32 = window.iter().map(|v| (v - mean) * (v - mean)).sum();

        match self.metric {
            DispersionMetric::Unscaled => newton_sqrt(sum_of_squares),
            DispersionMetric::Population => newton_sqrt(sum_of_squares / window.len() as f32),
        }
    }

    /// Tier for an already computed score. Lower bounds are inclusive.
    pub fn tier_for(&self, score: f32) -> Tier {
        if score < self.thresholds.triple {
            Tier::Single
        } else if score < self.thresholds.full {
            Tier::Triple
        } else {
            Tier::Full
        }
    }

    pub fn classify(&self, window: &[f32]) -> Dispersion {
        let score = self.score(window);
        Dispersion {
            score,
            tier: self.tier_for(score),
        }
    }
}
