mod adc;

pub use adc::*;

use log::error;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor}: {operation} failed ({details})")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor}: raw value {raw} is outside the converter range")]
    OutOfRange { sensor: &'static str, raw: u16 },
}

/// Trait for sensor reading data structures.
pub trait SensorReading {
    /// The reading as a plain sample value.
    fn value(&self) -> f32;
}

/// Trait for sensors that produce typed readings.
pub trait Sensor {
    /// The type of readings this sensor produces.
    type Reading: SensorReading;

    /// Read the sensor and return a typed reading.
    fn read(&mut self) -> impl Future<Output = Result<Self::Reading, SensorError>>;
}

/// Illuminance in lux
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightReading {
    pub lux: f32,
}

impl SensorReading for LightReading {
    fn value(&self) -> f32 {
        self.lux
    }
}

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub celsius: f32,
}

impl SensorReading for TemperatureReading {
    fn value(&self) -> f32 {
        self.celsius
    }
}

/// Light and temperature captured in the same tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplePair {
    pub light: f32,
    pub temperature: f32,
}

impl SamplePair {
    pub const fn new(light: f32, temperature: f32) -> Self {
        Self { light, temperature }
    }
}

/// The two sensors the node samples every tick
pub struct SensorPair<L, T>
where
    L: Sensor<Reading = LightReading>,
    T: Sensor<Reading = TemperatureReading>,
{
    light: L,
    temperature: T,
}

impl<L, T> SensorPair<L, T>
where
    L: Sensor<Reading = LightReading>,
    T: Sensor<Reading = TemperatureReading>,
{
    pub const fn new(light: L, temperature: T) -> Self {
        Self { light, temperature }
    }

    pub async fn read_light(&mut self) -> Result<f32, SensorError> {
        let reading = self.light.read().await.map_err(|e| {
            error!("Light sensor read failed: {}", e);
            e
        })?;
        Ok(reading.value())
    }

    pub async fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let reading = self.temperature.read().await.map_err(|e| {
            error!("Temperature sensor read failed: {}", e);
            e
        })?;
        Ok(reading.value())
    }

    /// Read both sensors, temperature first.
    pub async fn read(&mut self) -> Result<SamplePair, SensorError> {
        let temperature = self.read_temperature().await?;
        let light = self.read_light().await?;
        Ok(SamplePair { light, temperature })
    }
}
