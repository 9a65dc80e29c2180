//! Sampling task state: sensors in, events out

use log::{error, info};

use crate::config::{ConfigError, ProcessingConfig};
use crate::events::EventSink;
use crate::scheduler::{CycleScheduler, TickOutcome};
use crate::sensors::{LightReading, Sensor, SensorError, SensorPair, TemperatureReading};

/// One light/temperature node
///
/// Call [`SensorNode::step`] once per timer firing. A step reads both sensors,
/// advances the scheduler and forwards the resulting events to the sink.
pub struct SensorNode<L, T, E, const N: usize>
where
    L: Sensor<Reading = LightReading>,
    T: Sensor<Reading = TemperatureReading>,
    E: EventSink<N>,
{
    sensors: SensorPair<L, T>,
    scheduler: CycleScheduler<N>,
    sink: E,
    config: ProcessingConfig,
}

impl<L, T, E, const N: usize> SensorNode<L, T, E, N>
where
    L: Sensor<Reading = LightReading>,
    T: Sensor<Reading = TemperatureReading>,
    E: EventSink<N>,
{
    pub fn new(
        sensors: SensorPair<L, T>,
        sink: E,
        config: ProcessingConfig,
    ) -> Result<Self, ConfigError> {
        let scheduler = CycleScheduler::new(config).map_err(|e| {
            error!("Rejected processing config: {}", e);
            e
        })?;

        info!(
            "Sensor node ready: window {}, report every {} reads, period {} ms",
            N, config.report_frequency, config.sample_period_ms
        );

        Ok(Self {
            sensors,
            scheduler,
            sink,
            config,
        })
    }

    /// Run one tick.
    ///
    /// On a sensor failure nothing is pushed and the read counter does not move;
    /// the error is returned for the caller to decide whether to keep going.
    pub async fn step(&mut self) -> Result<usize, SensorError> {
        let sample = self.sensors.read().await?;
        let outcome: TickOutcome<N> = self.scheduler.tick(sample);
        let cycle = outcome.cycle();

        for event in outcome.into_events() {
            self.sink.emit(event);
        }

        Ok(cycle)
    }

    pub const fn scheduler(&self) -> &CycleScheduler<N> {
        &self.scheduler
    }

    pub const fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn sink(&mut self) -> &mut E {
        &mut self.sink
    }
}
