//! Build-time configuration of the acquisition system.

use crate::error::ConfigError;
use fugit::MillisDurationU32;

/// How a sensor's analog input is sampled and scaled.
///
/// - `reference_voltage`: The voltage corresponding to a full-scale ADC reading (V)
/// - `resolution`: The full-scale ADC count (eg. `1023` for a 10-bit ADC)
/// - `sample_count`: How many raw readings are averaged into one voltage
/// - `sample_delay_us`: Pause between two raw readings (µs)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorConfig {
    pub reference_voltage: f32,
    pub resolution: u32,
    pub sample_count: u16,
    pub sample_delay_us: u16,
}

impl SensorConfig {
    pub const DEFAULT: Self = Self {
        reference_voltage: 5.0,
        resolution: 1023,
        sample_count: 10,
        sample_delay_us: 100,
    };

    /// Converts a mean raw ADC value into volts, `raw / resolution * reference_voltage`.
    pub fn to_voltage(&self, raw: f32) -> f32 {
        // Multiplying first keeps whole-count readings exact.
        raw * self.reference_voltage / self.resolution as f32
    }

    /// Returns `true` if a sensor powered from the reference could
    /// output `voltage`.
    pub fn in_supply_range(&self, voltage: f32) -> bool {
        (0.0..=self.reference_voltage).contains(&voltage)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration of the whole logger.
///
/// The sensor flags say which sensors are fitted. The analog channel a
/// sensor is wired to is carried by its pin type, through
/// [`Channel::channel`](embedded_hal::adc::Channel::channel), so it is
/// fixed when the sensor is built and cannot disagree with the pin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DaqConfig {
    pub coolant_temp: bool,
    pub oil_temp: bool,
    pub oil_pressure: bool,
    pub throttle_position: bool,
    /// Sample ticks per second
    pub sample_rate_hz: u32,
    /// Serial line speed, used by the board glue
    pub serial_baud: u32,
    pub sensor: SensorConfig,
}

impl DaqConfig {
    /// Coolant temperature only, 10 Hz, 115200 baud.
    pub const DEFAULT: Self = Self {
        coolant_temp: true,
        oil_temp: false,
        oil_pressure: false,
        throttle_position: false,
        sample_rate_hz: 10,
        serial_baud: 115_200,
        sensor: SensorConfig::DEFAULT,
    };

    /// Time between two sample ticks.
    ///
    /// A zero `sample_rate_hz` gives a zero period; [`validate`](Self::validate)
    /// rejects that configuration.
    pub const fn sample_period(&self) -> MillisDurationU32 {
        let ms = match 1000u32.checked_div(self.sample_rate_hz) {
            Some(ms) => ms,
            None => 0,
        };
        MillisDurationU32::from_ticks(ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.sensor.sample_count == 0 {
            return Err(ConfigError::ZeroSampleCount);
        }
        if self.sensor.resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        let reference = self.sensor.reference_voltage;
        if reference.is_nan() || reference <= 0.0 {
            return Err(ConfigError::NonPositiveReference);
        }

        Ok(())
    }
}

impl Default for DaqConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
