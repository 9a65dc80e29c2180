//! Startup configuration for the processing loop
//!
//! The window size is a compile-time constant ([`crate::WINDOW_SIZE`]); everything
//! else a node can tune lives in [`ProcessingConfig`], which is validated once when
//! the scheduler is built and never changes afterwards.

use alloc::vec::Vec;

use log::error;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Reports fire when the read counter hits this value and twice this value
pub const DEFAULT_REPORT_FREQUENCY: u8 = 6;

/// 2 readings per second
pub const DEFAULT_SAMPLE_PERIOD_MS: u32 = 500;

/// Dispersion score at which activity moves from `Single` to `Triple`
pub const DEFAULT_TRIPLE_THRESHOLD: f32 = 100.0;

/// Dispersion score at which activity moves from `Triple` to `Full`
pub const DEFAULT_FULL_THRESHOLD: f32 = 1000.0;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("report frequency {frequency} must be between 1 and the window size {window}")]
    InvalidReportFrequency { frequency: u8, window: usize },
    #[error("tier thresholds must be finite and ordered (triple {triple}, full {full})")]
    InvalidThresholds { triple: f32, full: f32 },
    #[error("stored configuration could not be decoded")]
    Decode,
    #[error("configuration could not be encoded")]
    Encode,
}

/// How the dispersion score is derived from the sum of squared deviations
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispersionMetric {
    /// `sqrt(sum of squared deviations)`, without dividing by the sample count.
    /// The default thresholds are tuned against this score.
    #[default]
    Unscaled,
    /// `sqrt(sum of squared deviations / N)`, the population standard deviation
    Population,
}

/// Score boundaries between activity tiers. Lower bounds are inclusive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub triple: f32,
    pub full: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            triple: DEFAULT_TRIPLE_THRESHOLD,
            full: DEFAULT_FULL_THRESHOLD,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ProcessingConfig {
    /// Reporting frequency `k`: reports run on reads `k` and `2k` of every cycle
    pub report_frequency: u8,
    /// Timer period between two sensor reads, in milliseconds
    pub sample_period_ms: u32,
    pub thresholds: TierThresholds,
    pub metric: DispersionMetric,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            report_frequency: DEFAULT_REPORT_FREQUENCY,
            sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS,
            thresholds: TierThresholds::default(),
            metric: DispersionMetric::default(),
        }
    }
}

impl ProcessingConfig {
    /// Check this configuration against a window of `window` samples.
    pub fn validate(&self, window: usize) -> Result<(), ConfigError> {
        let k = self.report_frequency as usize;
        if k == 0 || k > window {
            return Err(ConfigError::InvalidReportFrequency {
                frequency: self.report_frequency,
                window,
            });
        }

        let TierThresholds { triple, full } = self.thresholds;
        if !triple.is_finite() || !full.is_finite() || triple < 0.0 || triple > full {
            return Err(ConfigError::InvalidThresholds { triple, full });
        }

        Ok(())
    }

    pub fn sample_period(&self) -> embassy_time::Duration {
        embassy_time::Duration::from_millis(self.sample_period_ms as u64)
    }

    /// Serialize for persistence (e.g. a flash page).
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|e| {
            error!("Failed to encode processing config: {:?}", e);
            ConfigError::Encode
        })
    }

    /// Decode a configuration written by [`ProcessingConfig::to_bytes`].
    ///
    /// Decoding does not validate; the scheduler does that when it is built.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|e| {
            error!("Failed to decode processing config: {:?}", e);
            ConfigError::Decode
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WINDOW_SIZE;

    #[test]
    fn test_default_matches_reference_node() {
        let config = ProcessingConfig::default();
        assert_eq!(config.report_frequency, 6);
        assert_eq!(config.sample_period_ms, 500);
        assert_eq!(config.thresholds.triple, 100.0);
        assert_eq!(config.thresholds.full, 1000.0);
        assert_eq!(config.metric, DispersionMetric::Unscaled);
        assert_eq!(config.sample_period(), embassy_time::Duration::from_millis(500));
        assert!(config.validate(WINDOW_SIZE).is_ok());
    }

    #[test]
    fn test_report_frequency_bounds() {
        let mut config = ProcessingConfig::default();

        config.report_frequency = 0;
        assert_eq!(
            config.validate(WINDOW_SIZE),
            Err(ConfigError::InvalidReportFrequency {
                frequency: 0,
                window: WINDOW_SIZE
            })
        );

        config.report_frequency = 13;
        assert!(config.validate(WINDOW_SIZE).is_err());

        // k == N is allowed: only the first report slot is reachable
        config.report_frequency = 12;
        assert!(config.validate(WINDOW_SIZE).is_ok());
    }

    #[test]
    fn test_thresholds_must_be_ordered_and_finite() {
        let mut config = ProcessingConfig::default();

        config.thresholds = TierThresholds {
            triple: 1000.0,
            full: 100.0,
        };
        assert!(matches!(
            config.validate(WINDOW_SIZE),
            Err(ConfigError::InvalidThresholds { .. })
        ));

        config.thresholds = TierThresholds {
            triple: f32::NAN,
            full: 100.0,
        };
        assert!(config.validate(WINDOW_SIZE).is_err());

        config.thresholds = TierThresholds {
            triple: 50.0,
            full: 50.0,
        };
        assert!(config.validate(WINDOW_SIZE).is_ok());
    }

    #[test]
    fn test_config_persistence() {
        let config = ProcessingConfig {
            report_frequency: 4,
            sample_period_ms: 250,
            thresholds: TierThresholds {
                triple: 5.0,
                full: 50.0,
            },
            metric: DispersionMetric::Population,
        };

        let bytes = config.to_bytes().unwrap();
        let decoded = ProcessingConfig::from_bytes(&bytes).unwrap();

        assert_eq!(config, decoded);
    }

    #[test]
    fn test_truncated_bytes_fail_to_decode() {
        let bytes = ProcessingConfig::default().to_bytes().unwrap();
        let result = ProcessingConfig::from_bytes(&bytes[..2]);

        assert_eq!(result, Err(ConfigError::Decode));
    }
}
