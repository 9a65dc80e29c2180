//! Read-cycle scheduler
//!
//! Owns the two sliding windows and the cycle counter, and decides on every tick
//! which analyses run:
//!
//! | Counter value      | Work                                             |
//! |--------------------|--------------------------------------------------|
//! | every read         | push light + temperature into their windows      |
//! | `k` and `2k`       | classify + aggregate the light window (report)   |
//! | `N` (end of cycle) | Theil-Sen fit of temperature on light            |
//!
//! The report and regression conditions are independent; with the reference
//! `k = 6`, `N = 12` the last read of a cycle fires both.

use log::debug;

use crate::analysis::{AggregationResult, DispersionClassifier, RegressionResult};
use crate::config::{ConfigError, ProcessingConfig};
use crate::events::{NodeEvent, RegressionEvent, ReportEvent, SampleEvent};
use crate::sensors::SamplePair;
use crate::window::SlidingWindow;

/// Position within the read cycle, `1..=N` once the first tick has happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleCounter<const N: usize> {
    value: usize,
}

impl<const N: usize> CycleCounter<N> {
    /// A counter that has not seen a tick yet
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// Move to the next read, wrapping from `N` back to `1`.
    pub fn advance(&mut self) -> usize {
        self.value = if self.value < N { self.value + 1 } else { 1 };
        self.value
    }

    pub const fn value(&self) -> usize {
        self.value
    }
}

/// Everything one tick produced
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome<const N: usize> {
    pub sample: SampleEvent,
    pub report: Option<ReportEvent<N>>,
    pub regression: Option<RegressionEvent<N>>,
}

impl<const N: usize> TickOutcome<N> {
    pub const fn cycle(&self) -> usize {
        self.sample.cycle
    }

    /// Events in emission order: sample, then report, then regression.
    pub fn into_events(self) -> impl Iterator<Item = NodeEvent<N>> {
        core::iter::once(NodeEvent::Sample(self.sample))
            .chain(self.report.map(NodeEvent::Report))
            .chain(self.regression.map(NodeEvent::Regression))
    }
}

/// Drives window updates, reports and regressions from the read counter
pub struct CycleScheduler<const N: usize> {
    light: SlidingWindow<N>,
    temperature: SlidingWindow<N>,
    counter: CycleCounter<N>,
    classifier: DispersionClassifier,
    report_frequency: u8,
}

impl<const N: usize> CycleScheduler<N> {
    pub fn new(config: ProcessingConfig) -> Result<Self, ConfigError> {
        config.validate(N)?;

        Ok(Self {
            light: SlidingWindow::new(),
            temperature: SlidingWindow::new(),
            counter: CycleCounter::new(),
            classifier: DispersionClassifier::new(config.thresholds, config.metric),
            report_frequency: config.report_frequency,
        })
    }

    /// Whether read `cycle` runs the activity report
    pub const fn is_report_read(&self, cycle: usize) -> bool {
        let k = self.report_frequency as usize;
        cycle == k || cycle == 2 * k
    }

    /// Whether read `cycle` runs the regression
    pub const fn is_regression_read(&self, cycle: usize) -> bool {
        cycle == N
    }

    /// Process one (light, temperature) pair.
    pub fn tick(&mut self, sample: SamplePair) -> TickOutcome<N> {
        let cycle = self.counter.advance();
        self.light.push(sample.light);
        self.temperature.push(sample.temperature);

        debug!(
            "Tick {}/{}: light {} lx, temperature {} C",
            cycle, N, sample.light, sample.temperature
        );

        let report = self.is_report_read(cycle).then(|| self.report(cycle));
        let regression = self.is_regression_read(cycle).then(|| self.regression());

        TickOutcome {
            sample: SampleEvent { cycle, sample },
            report,
            regression,
        }
    }

    fn report(&self, cycle: usize) -> ReportEvent<N> {
        let window = *self.light.contents();
        let dispersion = self.classifier.classify(&window);
        let aggregation = AggregationResult::from_window(&window, dispersion.tier);

        debug!(
            "Report at read {}: score {} -> {:?}",
            cycle, dispersion.score, dispersion.tier
        );

        ReportEvent {
            cycle,
            report_frequency: self.report_frequency,
            window,
            dispersion,
            aggregation,
        }
    }

    fn regression(&self) -> RegressionEvent<N> {
        let light_window = *self.light.contents();
        let temperature_window = *self.temperature.contents();
        let regression = RegressionResult::fit(&light_window, &temperature_window);

        debug!(
            "Regression: slope {} intercept {} over {} candidates",
            regression.slope, regression.intercept, regression.candidates
        );

        RegressionEvent {
            light_window,
            temperature_window,
            regression,
        }
    }

    pub const fn light_window(&self) -> &[f32; N] {
        self.light.contents()
    }

    pub const fn temperature_window(&self) -> &[f32; N] {
        self.temperature.contents()
    }

    /// Counter value of the last tick, `0` before the first one
    pub const fn cycle(&self) -> usize {
        self.counter.value()
    }

    pub const fn report_frequency(&self) -> u8 {
        self.report_frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WINDOW_SIZE;
    use crate::analysis::Tier;
    use alloc::vec::Vec;

    fn close(a: f32, b: f32) -> bool {
        let d = a - b;
        d < 1.0e-3 && d > -1.0e-3
    }

    fn reference() -> CycleScheduler<WINDOW_SIZE> {
        CycleScheduler::new(ProcessingConfig::default()).unwrap()
    }

    #[test]
    fn test_counter_wraps_after_cycle_length() {
        let mut counter = CycleCounter::<12>::new();
        assert_eq!(counter.value(), 0);

        let values: Vec<usize> = (0..26).map(|_| counter.advance()).collect();
        assert_eq!(&values[..12], &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(values[12], 1);
        assert_eq!(values[24], 1);
        assert!(values.iter().all(|c| (1..=12).contains(c)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ProcessingConfig {
            report_frequency: 0,
            ..ProcessingConfig::default()
        };
        assert!(CycleScheduler::<WINDOW_SIZE>::new(config).is_err());
    }

    #[test]
    fn test_end_to_end_reference_cycle() {
        let mut scheduler = reference();

        // Secondary light run used only to shape the temperatures: t = 0.5 * l + 15
        let secondary_light = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0];

        let mut reports = Vec::new();
        let mut regressions = Vec::new();
        for (i, secondary) in secondary_light.iter().enumerate() {
            let outcome = scheduler.tick(SamplePair::new(10.0, 0.5 * secondary + 15.0));
            assert_eq!(outcome.cycle(), i + 1);

            if let Some(report) = outcome.report {
                reports.push(report);
            }
            if let Some(regression) = outcome.regression {
                regressions.push((outcome.sample.cycle, regression));
            }
        }

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].cycle, 6);
        assert_eq!(reports[1].cycle, 12);

        let last = &reports[1];
        assert_eq!(last.window, [10.0; 12]);
        assert_eq!(last.dispersion.score, 0.0);
        assert_eq!(last.dispersion.tier, Tier::Single);
        assert_eq!(last.aggregation.as_slice(), &[10.0]);

        assert_eq!(regressions.len(), 1);
        let (cycle, regression) = &regressions[0];
        assert_eq!(*cycle, 12);
        // Constant light: no slope candidates, flat fit through the median temperature
        assert!(regression.regression.is_degenerate());
        assert_eq!(regression.regression.slope, 0.0);
        assert!(close(regression.regression.intercept, 21.5));
    }

    #[test]
    fn test_first_report_sees_zero_prefill() {
        let mut scheduler = reference();
        let mut outcome = None;
        for _ in 0..6 {
            outcome = Some(scheduler.tick(SamplePair::new(600.0, 20.0)));
        }

        let report = outcome.unwrap().report.unwrap();
        assert_eq!(&report.window[..6], &[0.0; 6]);
        assert_eq!(&report.window[6..], &[600.0; 6]);
        // mean 300, twelve deviations of 300: sqrt(12 * 90000) ≈ 1039
        assert_eq!(report.dispersion.tier, Tier::Full);
        assert_eq!(report.aggregation.as_slice(), &report.window);
    }

    #[test]
    fn test_regression_recovers_linear_relation() {
        let mut scheduler = reference();
        let mut last = None;
        for i in 0..12 {
            let light = 100.0 + 25.0 * i as f32;
            last = Some(scheduler.tick(SamplePair::new(light, 2.0 * light + 5.0)));
        }

        let outcome = last.unwrap();
        let regression = outcome.regression.unwrap().regression;
        assert!(close(regression.slope, 2.0));
        assert!(close(regression.intercept, 5.0));
        for (fitted, actual) in regression.fitted.iter().zip(scheduler.temperature_window()) {
            assert!(close(*fitted, *actual));
        }

        // Light rises 275 lx over the window: 100 <= score < 1000
        let report = outcome.report.unwrap();
        assert_eq!(report.dispersion.tier, Tier::Triple);
        assert_eq!(report.aggregation.values.len(), 3);
    }

    #[test]
    fn test_reports_follow_frequency() {
        let config = ProcessingConfig {
            report_frequency: 4,
            ..ProcessingConfig::default()
        };
        let mut scheduler = CycleScheduler::<WINDOW_SIZE>::new(config).unwrap();

        let mut report_cycles = Vec::new();
        let mut regression_cycles = Vec::new();
        for _ in 0..24 {
            let outcome = scheduler.tick(SamplePair::new(1.0, 1.0));
            if outcome.report.is_some() {
                report_cycles.push(outcome.cycle());
            }
            if outcome.regression.is_some() {
                regression_cycles.push(outcome.cycle());
            }
        }

        // k = 4: reads 4 and 8 of each cycle; regression stays on read 12
        assert_eq!(report_cycles, [4, 8, 4, 8]);
        assert_eq!(regression_cycles, [12, 12]);
    }

    #[test]
    fn test_events_are_ordered() {
        let mut scheduler = reference();
        let mut events = Vec::new();
        for _ in 0..12 {
            events.extend(scheduler.tick(SamplePair::new(5.0, 5.0)).into_events());
        }

        // 12 samples + 2 reports + 1 regression, the final three in emission order
        assert_eq!(events.len(), 15);
        assert!(matches!(events[12], NodeEvent::Sample(SampleEvent { cycle: 12, .. })));
        assert!(matches!(events[13], NodeEvent::Report(_)));
        assert!(matches!(events[14], NodeEvent::Regression(_)));
    }
}
