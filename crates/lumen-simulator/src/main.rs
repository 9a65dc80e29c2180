//! Desktop simulator for the lumen light/temperature node.
//!
//! Drives `lumen-core` with synthetic ADC channels on the node's 2 Hz cadence and
//! logs every sample, report and regression the way the node's uplink would.
//!
//! # Usage
//!
//! | Invocation                     | Behaviour                          |
//! |--------------------------------|------------------------------------|
//! | `lumen-simulator`              | run until interrupted              |
//! | `lumen-simulator <ticks>`      | stop after `<ticks>` readings      |
//!
//! Set `RUST_LOG=info` (or `debug` for per-tick scheduler output).

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use lumen_core::WINDOW_SIZE;
use lumen_core::config::ProcessingConfig;
use lumen_core::events::{EVENT_CHANNEL, EventSink, LogSink};
use lumen_core::node::SensorNode;
use lumen_core::sensors::{
    ADC_FULL_SCALE, AdcChannel, PhotosyntheticLight, SensorError, SensorPair, Sht11Resolution,
    Sht11Temperature, photosynthetic_lux,
};

// ---------------------------------------------------------------------------
// Scene constants
// ---------------------------------------------------------------------------

/// Ambient light level the scene oscillates around (lux)
const BASE_LUX: f64 = 400.0;

/// Amplitude of the slow daylight swing (lux)
const SWING_LUX: f64 = 300.0;

/// A flicker episode starts every this many seconds...
const FLICKER_PERIOD_SECS: f64 = 45.0;

/// ...and lasts this long
const FLICKER_DURATION_SECS: f64 = 8.0;

/// Peak deviation while flickering (lux)
const FLICKER_LUX: f64 = 600.0;

/// Room temperature with the lights off (°C)
const BASE_CELSIUS: f64 = 21.0;

/// Radiant heating per lux (°C / lx)
const CELSIUS_PER_LUX: f64 = 0.0015;

// ---------------------------------------------------------------------------
// Mock ADC channels
// ---------------------------------------------------------------------------

/// Synthetic illuminance at `t` seconds: a slow swing plus periodic flicker.
fn scene_lux(t: f64) -> f64 {
    let mut lux = BASE_LUX + SWING_LUX * (t / 30.0).sin();
    if t % FLICKER_PERIOD_SECS < FLICKER_DURATION_SECS {
        // Alternate every half second so each reading lands on the other phase
        let phase = if (t * 2.0) as u64 % 2 == 0 { 1.0 } else { -1.0 };
        lux += phase * FLICKER_LUX;
    }
    lux.max(0.0)
}

fn clamp_raw(raw: f64, max: u16) -> u16 {
    raw.round().clamp(0.0, max as f64) as u16
}

/// Light channel: converts the scene back into photodiode counts.
struct MockLightAdc {
    elapsed_secs: f64,
    step_secs: f64,
}

impl AdcChannel for MockLightAdc {
    async fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.elapsed_secs += self.step_secs;
        let lux_per_count = photosynthetic_lux(1) as f64;
        let raw = scene_lux(self.elapsed_secs) / lux_per_count;
        Ok(clamp_raw(raw, ADC_FULL_SCALE - 1))
    }
}

/// Temperature channel: tracks the same scene, warming with the light level.
struct MockTemperatureAdc {
    elapsed_secs: f64,
    step_secs: f64,
    resolution: Sht11Resolution,
}

impl AdcChannel for MockTemperatureAdc {
    async fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.elapsed_secs += self.step_secs;
        let t = self.elapsed_secs;
        let celsius = BASE_CELSIUS + CELSIUS_PER_LUX * scene_lux(t) + 0.2 * (t / 7.0).sin();
        let raw = (celsius + 39.6) / self.resolution.celsius_per_count() as f64;
        Ok(clamp_raw(raw, self.resolution.max_raw()))
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse the optional tick limit from the command line.
fn tick_limit() -> Result<Option<u64>, String> {
    match std::env::args().nth(1) {
        None => Ok(None),
        Some(arg) => arg
            .parse::<u64>()
            .map(Some)
            .map_err(|e| format!("invalid tick count {:?}: {}", arg, e)),
    }
}

fn main() {
    env_logger::init();
    info!("Starting lumen simulator");

    let limit = match tick_limit() {
        Ok(limit) => limit,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let config = ProcessingConfig::default();
    let period = Duration::from_millis(config.sample_period().as_millis());
    let step_secs = period.as_secs_f64();
    let resolution = Sht11Resolution::Bits12;

    let sensors = SensorPair::new(
        PhotosyntheticLight::new(MockLightAdc {
            elapsed_secs: 0.0,
            step_secs,
        }),
        Sht11Temperature::new(
            MockTemperatureAdc {
                elapsed_secs: 0.0,
                step_secs,
                resolution,
            },
            resolution,
        ),
    );

    let mut subscriber = match EVENT_CHANNEL.subscriber() {
        Ok(subscriber) => subscriber,
        Err(e) => {
            error!("Failed to subscribe to node events: {:?}", e);
            return;
        }
    };
    let publisher = match EVENT_CHANNEL.publisher() {
        Ok(publisher) => publisher,
        Err(e) => {
            error!("Failed to create node event publisher: {:?}", e);
            return;
        }
    };

    let mut node = match SensorNode::<_, _, _, WINDOW_SIZE>::new(sensors, publisher, config) {
        Ok(node) => node,
        Err(e) => {
            error!("Failed to start sensor node: {}", e);
            return;
        }
    };

    let mut log_sink = LogSink;
    let mut ticks: u64 = 0;
    let mut next_tick = Instant::now();

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    loop {
        if limit.is_some_and(|limit| ticks >= limit) {
            break;
        }

        // --- Sample + process ---------------------------------------------
        match embassy_futures::block_on(node.step()) {
            Ok(cycle) => {
                ticks += 1;
                debug!("Read {}/{} complete", cycle, WINDOW_SIZE);
            }
            Err(e) => warn!("Skipping tick: {}", e),
        }

        // --- Report -------------------------------------------------------
        while let Some(event) = subscriber.try_next_message_pure() {
            log_sink.emit(event);
        }

        // --- Tick pacing --------------------------------------------------
        next_tick += period;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        }
    }

    info!("Simulator exiting after {} ticks", ticks);
}
