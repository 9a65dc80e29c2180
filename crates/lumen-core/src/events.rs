//! Structured output of the processing loop
//!
//! Every tick produces a [`SampleEvent`]; report and regression ticks add a
//! [`ReportEvent`] and/or a [`RegressionEvent`]. Events go to an [`EventSink`]:
//! the global pub-sub channel, the log renderer, or a plain `Vec` in tests.

use alloc::vec::Vec;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::{PubSubChannel, Publisher};
use log::info;

use crate::WINDOW_SIZE;
use crate::analysis::{AggregationResult, Dispersion, RegressionResult};
use crate::fixed_point::{Milli, MilliSlice};
use crate::sensors::SamplePair;

/// Channel capacity for pub-sub events
/// Sized for one full cycle's worth of report and regression bursts
pub const EVENT_CHANNEL_CAPACITY: usize = 8;

/// Number of subscribers that can listen to node events
/// - Subscriber 0: reporting sink (log / radio uplink)
/// - Subscriber 1: spare for a local consumer (display, storage)
pub const EVENT_SUBSCRIBERS: usize = 2;

/// Number of publishers (just the sampling task)
pub const EVENT_PUBLISHERS: usize = 1;

/// Global pub-sub channel for node events
pub static EVENT_CHANNEL: PubSubChannel<
    CriticalSectionRawMutex,
    NodeEvent<WINDOW_SIZE>,
    EVENT_CHANNEL_CAPACITY,
    EVENT_SUBSCRIBERS,
    EVENT_PUBLISHERS,
> = PubSubChannel::new();

/// A fresh (light, temperature) pair entered the windows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleEvent {
    /// Position of this read within the cycle, `1..=N`
    pub cycle: usize,
    pub sample: SamplePair,
}

/// Activity measurement over the light window
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEvent<const N: usize> {
    pub cycle: usize,
    /// Reporting frequency `k` the report was scheduled with
    pub report_frequency: u8,
    pub window: [f32; N],
    pub dispersion: Dispersion,
    pub aggregation: AggregationResult<N>,
}

/// Theil-Sen fit of temperature against light over a full cycle
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionEvent<const N: usize> {
    pub light_window: [f32; N],
    pub temperature_window: [f32; N],
    pub regression: RegressionResult<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent<const N: usize> {
    Sample(SampleEvent),
    Report(ReportEvent<N>),
    Regression(RegressionEvent<N>),
}

/// Receiver of node events
pub trait EventSink<const N: usize> {
    fn emit(&mut self, event: NodeEvent<N>);
}

impl<const N: usize> EventSink<N> for Vec<NodeEvent<N>> {
    fn emit(&mut self, event: NodeEvent<N>) {
        self.push(event);
    }
}

/// Publishing never blocks the sampling task: when every slot is taken the
/// oldest event is dropped for lagging subscribers.
impl<const N: usize, const CAP: usize, const SUBS: usize, const PUBS: usize> EventSink<N>
    for Publisher<'_, CriticalSectionRawMutex, NodeEvent<N>, CAP, SUBS, PUBS>
{
    fn emit(&mut self, event: NodeEvent<N>) {
        self.publish_immediate(event);
    }
}

/// Renders events as fixed-point text through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    fn log_sample(event: &SampleEvent) {
        info!(
            "Light: {} lx, Temp: {} C",
            Milli(event.sample.light),
            Milli(event.sample.temperature)
        );
    }

    fn log_report<const N: usize>(event: &ReportEvent<N>) {
        info!(
            "Measurement and Reporting (Frequency = After every {} Sensor Data Reads)",
            event.report_frequency
        );
        info!("B = {}", MilliSlice(&event.window));
        info!("StdDev = {}", Milli(event.dispersion.score));

        let tier = event.aggregation.tier;
        let group_size = tier.group_size::<N>();
        if group_size == 1 {
            info!("Aggregation = 1-into-1 (No Aggregation)");
        } else {
            info!("Aggregation = {}-into-1 ({})", group_size, tier.label());
        }
        info!("X = {}", MilliSlice(event.aggregation.as_slice()));
    }

    fn log_regression<const N: usize>(event: &RegressionEvent<N>) {
        let fit = &event.regression;
        info!("Linear Regression Analysis by Theil-Sen Estimator Method");
        info!("Light Vector (Independent Vector) B = {}", MilliSlice(&event.light_window));
        info!(
            "Temperature Vector (Dependent Vector) T = {}",
            MilliSlice(&event.temperature_window)
        );
        info!("Median Slope: {}", Milli(fit.slope));
        info!("Median Offset: {}", Milli(fit.intercept));
        info!(
            "Linear Equation: Temperature = {} + {} * Light",
            Milli(fit.intercept),
            Milli(fit.slope)
        );
        if fit.is_degenerate() {
            info!("(constant light window, flat fallback fit)");
        }
        info!("Estimated Temperature Vector EstT = {}", MilliSlice(&fit.fitted));
    }
}

impl<const N: usize> EventSink<N> for LogSink {
    fn emit(&mut self, event: NodeEvent<N>) {
        match &event {
            NodeEvent::Sample(sample) => Self::log_sample(sample),
            NodeEvent::Report(report) => Self::log_report(report),
            NodeEvent::Regression(regression) => Self::log_regression(regression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Tier;

    fn sample_event(cycle: usize) -> NodeEvent<WINDOW_SIZE> {
        NodeEvent::Sample(SampleEvent {
            cycle,
            sample: SamplePair::new(cycle as f32, 20.0),
        })
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<NodeEvent<WINDOW_SIZE>> = Vec::new();
        sink.emit(sample_event(1));
        sink.emit(sample_event(2));

        assert_eq!(sink, [sample_event(1), sample_event(2)]);
    }

    #[test]
    fn test_publisher_sink_reaches_subscribers() {
        let channel: PubSubChannel<CriticalSectionRawMutex, NodeEvent<WINDOW_SIZE>, 4, 1, 1> =
            PubSubChannel::new();
        let mut subscriber = channel.subscriber().unwrap();
        let mut publisher = channel.publisher().unwrap();

        let window = [10.0; WINDOW_SIZE];
        let report = NodeEvent::Report(ReportEvent {
            cycle: 6,
            report_frequency: 6,
            window,
            dispersion: Dispersion {
                score: 0.0,
                tier: Tier::Single,
            },
            aggregation: AggregationResult::from_window(&window, Tier::Single),
        });

        publisher.emit(sample_event(6));
        publisher.emit(report.clone());

        assert_eq!(subscriber.try_next_message_pure(), Some(sample_event(6)));
        assert_eq!(subscriber.try_next_message_pure(), Some(report));
        assert_eq!(subscriber.try_next_message_pure(), None);
    }

    #[test]
    fn test_log_sink_accepts_every_event_kind() {
        let light = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let temperature = light.map(|l| 0.1 * l + 18.0);

        let mut sink = LogSink;
        sink.emit(sample_event(12));
        sink.emit(NodeEvent::Regression(RegressionEvent {
            light_window: light,
            temperature_window: temperature,
            regression: RegressionResult::fit(&light, &temperature),
        }));
    }
}
