//! Calibrated analog sensor acquisition for an engine data logger.
//!
//! Sensors are read through an [`embedded_hal`] ADC: each reading
//! averages several conversions, checks the voltage against the supply
//! range and converts it to a physical value through a
//! [`CalibrationTable`]. A [`Daq`] samples the fitted sensors once per
//! tick and produces a [`Frame`] that is written to the serial link as
//! one CSV line.
//!
//! # Examples
//!
//! ```
//! use mx5_daq::{
//!     calibration::{ThrottleCalibration, COOLANT_TEMP_CURVE, OIL_PRESSURE_CURVE},
//!     config::DaqConfig,
//!     Daq, Disabled, PressureSensor, TemperatureSensor, ThrottlePositionSensor,
//! };
//! # use embedded_hal_mock::{
//! #     adc::{Mock, MockChan0, MockChan1, MockChan2, Transaction},
//! #     delay::MockNoop,
//! # };
//! # use heapless::String;
//! #
//! # let expectations: Vec<Transaction<u16>> = (0..10).map(|_| Transaction::read(0, 614)).collect();
//! # let mut adc = Mock::new(&expectations);
//! # let mut delay = MockNoop::new();
//! # let (coolant_pin, pressure_pin, throttle_pin) = (MockChan0 {}, MockChan1 {}, MockChan2 {});
//!
//! let config = DaqConfig::DEFAULT;
//!
//! let mut daq = Daq::new(
//!     &config,
//!     TemperatureSensor::new(coolant_pin, config.sensor, COOLANT_TEMP_CURVE),
//!     Disabled,
//!     PressureSensor::new(pressure_pin, config.sensor, OIL_PRESSURE_CURVE),
//!     ThrottlePositionSensor::new(throttle_pin, config.sensor, ThrottleCalibration::DEFAULT),
//! )
//! .unwrap();
//!
//! let mut out: String<128> = String::new();
//! daq.write_preamble(&mut out).unwrap();
//!
//! // Only coolant temperature is enabled by default. A raw 614 of 1023
//! // is just over 3.0 V, the normal operating temperature.
//! let frame = daq.poll(100, &mut adc, &mut delay).unwrap();
//! frame.write_line(&mut out).unwrap();
//!
//! assert_eq!(
//!     out,
//!     "MX5 DAQ System Starting...\n\
//!      timestamp_ms,coolant_temp_c\n\
//!      100,85.03\n"
//! );
//! ```

#![cfg_attr(not(test), no_std)]

pub mod alert;
pub mod calibration;
pub mod clock;
pub mod config;
mod daq;
mod error;
mod interpolate;
pub mod output;
mod sampler;
mod sensor;

pub use calibration::{CalibrationPoint, CalibrationTable, ThrottleCalibration};
pub use clock::SampleClock;
pub use daq::Daq;
pub use error::{ConfigError, Error};
pub use interpolate::interpolate;
pub use output::{Cell, Frame, Record};
pub use sampler::{sample_voltage, ReadError};
pub use sensor::{
    convert, psi_to_bar, Disabled, PressureSensor, Reading, Sensor, TemperatureSensor,
    ThrottlePositionSensor, PSI_TO_BAR,
};
