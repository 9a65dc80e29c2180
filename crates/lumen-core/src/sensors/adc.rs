//! Sensors backed by raw 12-bit ADC channels
//!
//! The node's light and temperature front ends both deliver raw converter counts;
//! these wrappers turn the counts into physical units.

use super::{LightReading, Sensor, SensorError, TemperatureReading};
use log::{debug, error};

/// Number of distinct codes of the 12-bit converter
pub const ADC_FULL_SCALE: u16 = 4096;

/// Converter reference voltage
const ADC_REFERENCE_VOLTS: f32 = 1.5;

/// Load resistor across the photodiode output
const LIGHT_SENSE_RESISTOR_OHMS: f32 = 100_000.0;

/// Photodiode response: lux per ampere of photocurrent (0.625e6 * 1000)
const LUX_PER_AMPERE: f32 = 0.625e6 * 1000.0;

/// SHT11 temperature offset at 3 V supply
const SHT11_OFFSET_CELSIUS: f32 = -39.6;

/// A source of raw converter counts
pub trait AdcChannel {
    fn read_raw(&mut self) -> impl Future<Output = Result<u16, SensorError>>;
}

/// Temperature resolution of the SHT11
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sht11Resolution {
    /// 12-bit readings, 0.04 °C per count (as simulated for the Sky mote)
    #[default]
    Bits12,
    /// 14-bit readings, 0.01 °C per count (XM1000)
    Bits14,
}

impl Sht11Resolution {
    pub const fn celsius_per_count(self) -> f32 {
        match self {
            Self::Bits12 => 0.04,
            Self::Bits14 => 0.01,
        }
    }

    /// Largest raw value the sensor can report at this resolution
    pub const fn max_raw(self) -> u16 {
        match self {
            Self::Bits12 => ADC_FULL_SCALE - 1,
            Self::Bits14 => (1 << 14) - 1,
        }
    }
}

/// Convert a raw SHT11 temperature count to °C.
pub fn sht11_celsius(raw: u16, resolution: Sht11Resolution) -> f32 {
    resolution.celsius_per_count() * raw as f32 + SHT11_OFFSET_CELSIUS
}

/// Convert a raw photosynthetic light sensor count to lux.
pub fn photosynthetic_lux(raw: u16) -> f32 {
    let volts = ADC_REFERENCE_VOLTS * raw as f32 / ADC_FULL_SCALE as f32;
    let amperes = volts / LIGHT_SENSE_RESISTOR_OHMS;
    amperes * LUX_PER_AMPERE
}

/// SHT11 temperature channel
pub struct Sht11Temperature<A> {
    channel: A,
    resolution: Sht11Resolution,
}

impl<A: AdcChannel> Sht11Temperature<A> {
    pub const fn new(channel: A, resolution: Sht11Resolution) -> Self {
        Self {
            channel,
            resolution,
        }
    }
}

impl<A: AdcChannel> Sensor for Sht11Temperature<A> {
    type Reading = TemperatureReading;

    async fn read(&mut self) -> Result<TemperatureReading, SensorError> {
        let raw = self.channel.read_raw().await?;
        if raw > self.resolution.max_raw() {
            error!("SHT11: raw temperature {} exceeds {:?}", raw, self.resolution);
            return Err(SensorError::OutOfRange {
                sensor: "SHT11",
                raw,
            });
        }

        let celsius = sht11_celsius(raw, self.resolution);
        debug!("SHT11: raw {} -> {} C", raw, celsius);
        Ok(TemperatureReading { celsius })
    }
}

/// Photodiode light channel behind the 12-bit converter
pub struct PhotosyntheticLight<A> {
    channel: A,
}

impl<A: AdcChannel> PhotosyntheticLight<A> {
    pub const fn new(channel: A) -> Self {
        Self { channel }
    }
}

impl<A: AdcChannel> Sensor for PhotosyntheticLight<A> {
    type Reading = LightReading;

    async fn read(&mut self) -> Result<LightReading, SensorError> {
        let raw = self.channel.read_raw().await?;
        if raw >= ADC_FULL_SCALE {
            error!("Light sensor: raw value {} exceeds 12-bit range", raw);
            return Err(SensorError::OutOfRange {
                sensor: "photosynthetic light",
                raw,
            });
        }

        let lux = photosynthetic_lux(raw);
        debug!("Light sensor: raw {} -> {} lx", raw, lux);
        Ok(LightReading { lux })
    }
}
