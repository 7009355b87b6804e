//! Adapters turning an analog input into a physical value.
//!
//! Temperature and pressure senders are read through a calibration
//! table and report [`Reading::Invalid`] when the measured voltage lies
//! outside the supply range. The throttle position sensor is linear and
//! saturates instead: it never reports an invalid reading.

use crate::{
    calibration::{CalibrationTable, ThrottleCalibration},
    config::SensorConfig,
    error::Error,
    sampler::{sample_voltage, ReadError},
};
use core::convert::Infallible;
use embedded_hal::{
    adc::{Channel, OneShot},
    blocking::delay::DelayUs,
};

/// Pounds per square inch to bar.
pub const PSI_TO_BAR: f32 = 0.0689476;

/// The outcome of one sensor read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading {
    Valid(f32),
    /// The sensor's voltage was outside `0..=reference_voltage`
    Invalid,
}

impl Reading {
    pub fn value(self) -> Option<f32> {
        match self {
            Reading::Valid(value) => Some(value),
            Reading::Invalid => None,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Reading::Valid(_))
    }

    /// Applies `f` to a valid value, leaving invalid readings alone.
    pub fn map(self, f: impl FnOnce(f32) -> f32) -> Self {
        match self {
            Reading::Valid(value) => Reading::Valid(f(value)),
            Reading::Invalid => Reading::Invalid,
        }
    }
}

impl From<Reading> for Option<f32> {
    fn from(reading: Reading) -> Self {
        reading.value()
    }
}

pub fn psi_to_bar(psi: f32) -> f32 {
    psi * PSI_TO_BAR
}

/// Validates `voltage` against the supply range, then looks it up in
/// `table`.
///
/// An unplugged sensor reads out of range on every tick, so this only
/// logs at debug level.
pub fn convert<const LENGTH: usize>(
    voltage: f32,
    config: &SensorConfig,
    table: &CalibrationTable<LENGTH>,
) -> Reading {
    if config.in_supply_range(voltage) {
        Reading::Valid(table.lookup(voltage))
    } else {
        log::debug!("sensor voltage {} V outside supply range", voltage);
        Reading::Invalid
    }
}

/// A sensor that can be sampled by [`Daq`](crate::Daq).
///
/// The unit of the returned value is the adapter's primary unit: °C
/// for temperatures, PSI for pressures and % for the throttle.
pub trait Sensor<Adc, ADC, Word, Delay> {
    type Error;

    fn sample(&mut self, adc: &mut Adc, delay: &mut Delay) -> Result<Reading, Error<Self::Error>>;
}

/// Placeholder for a sensor slot with nothing fitted.
///
/// Sampling it always yields [`Reading::Invalid`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Disabled;

impl<Adc, ADC, Word, Delay> Sensor<Adc, ADC, Word, Delay> for Disabled {
    type Error = Infallible;

    fn sample(&mut self, _adc: &mut Adc, _delay: &mut Delay) -> Result<Reading, Error<Infallible>> {
        Ok(Reading::Invalid)
    }
}

/// A temperature sender read through a calibration table (°C).
///
/// # Examples
///
/// ```
/// use mx5_daq::{calibration::COOLANT_TEMP_CURVE, config::SensorConfig, Reading, TemperatureSensor};
/// # use embedded_hal_mock::{
/// #     adc::{Mock, MockChan0, Transaction},
/// #     delay::MockNoop,
/// # };
/// #
/// # let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 150)];
/// # let mut adc = Mock::new(&expectations);
/// # let mut delay = MockNoop::new();
/// # let pin = MockChan0 {};
///
/// let config = SensorConfig {
///     resolution: 1000,
///     sample_count: 1,
///     ..SensorConfig::DEFAULT
/// };
///
/// let mut coolant = TemperatureSensor::new(pin, config, COOLANT_TEMP_CURVE);
///
/// // 0.75 V sits halfway between -10 °C and 10 °C
/// assert_eq!(coolant.read_celsius(&mut adc, &mut delay), Ok(Reading::Valid(0.0)));
/// ```
#[derive(Debug)]
pub struct TemperatureSensor<Pin, const LENGTH: usize> {
    pin: Pin,
    config: SensorConfig,
    table: CalibrationTable<LENGTH>,
}

impl<Pin, const LENGTH: usize> TemperatureSensor<Pin, LENGTH> {
    /// Returns a sensor reading `pin` and converting through `table`.
    ///
    /// The table must be in ascending order by voltage or this
    /// function will panic when running in debug mode.
    pub fn new(pin: Pin, config: SensorConfig, table: CalibrationTable<LENGTH>) -> Self {
        debug_assert!(
            table.is_ascending(),
            "The points in table must be in ascending order by voltage"
        );

        Self { pin, config, table }
    }

    /// Destroys the sensor and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    /// Converts an already sampled voltage.
    pub fn voltage_to_celsius(&self, voltage: f32) -> Reading {
        convert(voltage, &self.config, &self.table)
    }

    pub fn read_celsius<Adc, ADC, Word, Delay>(
        &mut self,
        adc: &mut Adc,
        delay: &mut Delay,
    ) -> Result<Reading, ReadError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        Delay: DelayUs<u16>,
    {
        let voltage = self.read_voltage::<Adc, ADC, Word, Delay>(adc, delay)?;
        Ok(self.voltage_to_celsius(voltage))
    }

    /// Returns the averaged sensor voltage without converting it, for
    /// bench calibration.
    pub fn read_voltage<Adc, ADC, Word, Delay>(
        &mut self,
        adc: &mut Adc,
        delay: &mut Delay,
    ) -> Result<f32, ReadError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        Delay: DelayUs<u16>,
    {
        sample_voltage::<Adc, ADC, Word, Pin, Delay>(adc, &mut self.pin, delay, &self.config)
    }
}

impl<Pin, Adc, ADC, Word, Delay, const LENGTH: usize> Sensor<Adc, ADC, Word, Delay>
    for TemperatureSensor<Pin, LENGTH>
where
    Word: Into<u32>,
    Pin: Channel<ADC>,
    Adc: OneShot<ADC, Word, Pin>,
    Delay: DelayUs<u16>,
{
    type Error = <Adc as OneShot<ADC, Word, Pin>>::Error;

    fn sample(&mut self, adc: &mut Adc, delay: &mut Delay) -> Result<Reading, Error<Self::Error>> {
        self.read_celsius::<Adc, ADC, Word, Delay>(adc, delay)
    }
}

/// A pressure sender read through a calibration table (PSI).
#[derive(Debug)]
pub struct PressureSensor<Pin, const LENGTH: usize> {
    pin: Pin,
    config: SensorConfig,
    table: CalibrationTable<LENGTH>,
}

impl<Pin, const LENGTH: usize> PressureSensor<Pin, LENGTH> {
    /// Returns a sensor reading `pin` and converting through `table`.
    ///
    /// The table must be in ascending order by voltage or this
    /// function will panic when running in debug mode.
    pub fn new(pin: Pin, config: SensorConfig, table: CalibrationTable<LENGTH>) -> Self {
        debug_assert!(
            table.is_ascending(),
            "The points in table must be in ascending order by voltage"
        );

        Self { pin, config, table }
    }

    /// Destroys the sensor and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    pub fn voltage_to_psi(&self, voltage: f32) -> Reading {
        convert(voltage, &self.config, &self.table)
    }

    pub fn read_psi<Adc, ADC, Word, Delay>(
        &mut self,
        adc: &mut Adc,
        delay: &mut Delay,
    ) -> Result<Reading, ReadError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        Delay: DelayUs<u16>,
    {
        let voltage =
            sample_voltage::<Adc, ADC, Word, Pin, Delay>(adc, &mut self.pin, delay, &self.config)?;
        Ok(self.voltage_to_psi(voltage))
    }

    pub fn read_bar<Adc, ADC, Word, Delay>(
        &mut self,
        adc: &mut Adc,
        delay: &mut Delay,
    ) -> Result<Reading, ReadError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        Delay: DelayUs<u16>,
    {
        Ok(self
            .read_psi::<Adc, ADC, Word, Delay>(adc, delay)?
            .map(psi_to_bar))
    }
}

impl<Pin, Adc, ADC, Word, Delay, const LENGTH: usize> Sensor<Adc, ADC, Word, Delay>
    for PressureSensor<Pin, LENGTH>
where
    Word: Into<u32>,
    Pin: Channel<ADC>,
    Adc: OneShot<ADC, Word, Pin>,
    Delay: DelayUs<u16>,
{
    type Error = <Adc as OneShot<ADC, Word, Pin>>::Error;

    fn sample(&mut self, adc: &mut Adc, delay: &mut Delay) -> Result<Reading, Error<Self::Error>> {
        self.read_psi::<Adc, ADC, Word, Delay>(adc, delay)
    }
}

/// A linear throttle position sensor (%).
#[derive(Debug)]
pub struct ThrottlePositionSensor<Pin> {
    pin: Pin,
    config: SensorConfig,
    calibration: ThrottleCalibration,
}

impl<Pin> ThrottlePositionSensor<Pin> {
    pub fn new(pin: Pin, config: SensorConfig, calibration: ThrottleCalibration) -> Self {
        Self {
            pin,
            config,
            calibration,
        }
    }

    /// Destroys the sensor and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    /// Returns the throttle opening, saturated to `0.0..=100.0`.
    pub fn read_percent<Adc, ADC, Word, Delay>(
        &mut self,
        adc: &mut Adc,
        delay: &mut Delay,
    ) -> Result<f32, ReadError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        Delay: DelayUs<u16>,
    {
        let voltage =
            sample_voltage::<Adc, ADC, Word, Pin, Delay>(adc, &mut self.pin, delay, &self.config)?;
        Ok(self.calibration.percent(voltage))
    }
}

impl<Pin, Adc, ADC, Word, Delay> Sensor<Adc, ADC, Word, Delay> for ThrottlePositionSensor<Pin>
where
    Word: Into<u32>,
    Pin: Channel<ADC>,
    Adc: OneShot<ADC, Word, Pin>,
    Delay: DelayUs<u16>,
{
    type Error = <Adc as OneShot<ADC, Word, Pin>>::Error;

    fn sample(&mut self, adc: &mut Adc, delay: &mut Delay) -> Result<Reading, Error<Self::Error>> {
        self.read_percent::<Adc, ADC, Word, Delay>(adc, delay)
            .map(Reading::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationPoint, COOLANT_TEMP_CURVE, OIL_PRESSURE_CURVE};
    use embedded_hal_mock::{
        adc::{Mock, MockChan0, Transaction},
        common::Generic,
        delay::MockNoop,
        MockError,
    };
    use std::io::ErrorKind;

    // One raw count is 5 mV.
    fn config() -> SensorConfig {
        SensorConfig {
            reference_voltage: 5.0,
            resolution: 1000,
            sample_count: 1,
            sample_delay_us: 100,
        }
    }

    fn adc(expectations: &[Transaction<u16>]) -> Generic<Transaction<u16>> {
        Mock::new(expectations)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "{} is not close to {}",
            actual,
            expected
        );
    }

    fn read_celsius(raw: u16) -> Reading {
        let mut sensor = TemperatureSensor::new(MockChan0 {}, config(), COOLANT_TEMP_CURVE);
        let expectations = [Transaction::read(0, raw)];
        let mut adc = adc(&expectations);

        let reading = sensor.read_celsius(&mut adc, &mut MockNoop::new()).unwrap();
        adc.done();
        reading
    }

    fn read_psi(raw: u16) -> Reading {
        let mut sensor = PressureSensor::new(MockChan0 {}, config(), OIL_PRESSURE_CURVE);
        let expectations = [Transaction::read(0, raw)];
        let mut adc = adc(&expectations);

        let reading = sensor.read_psi(&mut adc, &mut MockNoop::new()).unwrap();
        adc.done();
        reading
    }

    fn read_percent(raw: u16) -> f32 {
        let mut sensor =
            ThrottlePositionSensor::new(MockChan0 {}, config(), ThrottleCalibration::DEFAULT);
        let expectations = [Transaction::read(0, raw)];
        let mut adc = adc(&expectations);

        let percent = sensor.read_percent(&mut adc, &mut MockNoop::new()).unwrap();
        adc.done();
        percent
    }

    #[test]
    #[should_panic]
    fn panics_if_unsorted_table() {
        let table = CalibrationTable::new([
            CalibrationPoint::new(3.0, 40.0),
            CalibrationPoint::new(2.0, 30.0),
            CalibrationPoint::new(1.0, 10.0),
        ]);
        TemperatureSensor::new(MockChan0 {}, config(), table);
    }

    #[test]
    fn temperature() {
        assert_close(read_celsius(100).value().unwrap(), -10.0);
        assert_close(read_celsius(150).value().unwrap(), 0.0);
        assert_close(read_celsius(600).value().unwrap(), 85.0);
        assert_close(read_celsius(900).value().unwrap(), 130.0);
    }

    #[test]
    fn temperature_clamps_inside_supply_range() {
        assert_eq!(read_celsius(0), Reading::Valid(-10.0));
        assert_eq!(read_celsius(1000), Reading::Valid(130.0));
    }

    #[test]
    fn temperature_outside_supply_range() {
        assert_eq!(read_celsius(1001), Reading::Invalid);
        assert_eq!(read_celsius(u16::MAX), Reading::Invalid);
    }

    #[test]
    fn voltage_to_celsius() {
        let sensor = TemperatureSensor::new(MockChan0 {}, config(), COOLANT_TEMP_CURVE);
        assert_eq!(sensor.voltage_to_celsius(0.75), Reading::Valid(0.0));
        assert_eq!(sensor.voltage_to_celsius(-0.1), Reading::Invalid);
        assert_eq!(sensor.voltage_to_celsius(5.01), Reading::Invalid);
        assert_eq!(sensor.voltage_to_celsius(5.0), Reading::Valid(130.0));
    }

    #[test]
    fn read_voltage() {
        let mut sensor = TemperatureSensor::new(MockChan0 {}, config(), COOLANT_TEMP_CURVE);
        let expectations = [Transaction::read(0, 500)];
        let mut adc = adc(&expectations);

        assert_eq!(sensor.read_voltage(&mut adc, &mut MockNoop::new()), Ok(2.5));
        adc.done();
    }

    #[test]
    fn pressure() {
        assert_close(read_psi(100).value().unwrap(), 0.0);
        assert_close(read_psi(300).value().unwrap(), 37.5);
        assert_close(read_psi(500).value().unwrap(), 75.0);
        assert_close(read_psi(950).value().unwrap(), 150.0);
        assert_eq!(read_psi(1200), Reading::Invalid);
    }

    #[test]
    fn pressure_in_bar() {
        let mut sensor = PressureSensor::new(MockChan0 {}, config(), OIL_PRESSURE_CURVE);
        let expectations = [Transaction::read(0, 500), Transaction::read(0, 1100)];
        let mut adc = adc(&expectations);
        let mut delay = MockNoop::new();

        let bar = sensor.read_bar(&mut adc, &mut delay).unwrap();
        assert_close(bar.value().unwrap(), 75.0 * PSI_TO_BAR);

        assert_eq!(sensor.read_bar(&mut adc, &mut delay), Ok(Reading::Invalid));
        adc.done();
    }

    #[test]
    fn psi_to_bar() {
        assert_eq!(super::psi_to_bar(0.0), 0.0);
        assert_close(super::psi_to_bar(14.5038), 1.0);
    }

    #[test]
    fn throttle() {
        assert_close(read_percent(500), 50.0);
        assert_close(read_percent(300), 25.0);
    }

    #[test]
    fn throttle_saturates_instead_of_invalid() {
        assert_eq!(read_percent(0), 0.0);
        assert_eq!(read_percent(1000), 100.0);
        assert_eq!(read_percent(2000), 100.0);
    }

    #[test]
    fn throttle_sample_is_always_valid() {
        let mut sensor =
            ThrottlePositionSensor::new(MockChan0 {}, config(), ThrottleCalibration::DEFAULT);
        let expectations = [Transaction::read(0, 4000)];
        let mut adc = adc(&expectations);

        let reading = sensor.sample(&mut adc, &mut MockNoop::new());
        assert_eq!(reading, Ok(Reading::Valid(100.0)));
        adc.done();
    }

    #[test]
    fn error() {
        let mut sensor = TemperatureSensor::new(MockChan0 {}, config(), COOLANT_TEMP_CURVE);
        let expectations =
            [Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::InvalidData))];
        let mut adc = adc(&expectations);

        assert!(sensor.read_celsius(&mut adc, &mut MockNoop::new()).is_err());
        adc.done();
    }

    #[test]
    fn disabled_is_invalid() {
        let mut adc = adc(&[]);
        let reading =
            Sensor::<_, (), u16, MockNoop>::sample(&mut Disabled, &mut adc, &mut MockNoop::new());
        assert_eq!(reading, Ok(Reading::Invalid));
        adc.done();
    }

    #[test]
    fn reading_helpers() {
        assert_eq!(Reading::Valid(2.0).value(), Some(2.0));
        assert_eq!(Reading::Invalid.value(), None);
        assert!(Reading::Valid(f32::MIN).is_valid());
        assert!(!Reading::Invalid.is_valid());
        assert_eq!(Reading::Valid(2.0).map(|v| v * 3.0), Reading::Valid(6.0));
        assert_eq!(Reading::Invalid.map(|v| v * 3.0), Reading::Invalid);
        assert_eq!(Option::<f32>::from(Reading::Valid(1.5)), Some(1.5));
    }

    #[test]
    fn free_returns_pin() {
        let sensor = PressureSensor::new(MockChan0 {}, config(), OIL_PRESSURE_CURVE);
        let _pin: MockChan0 = sensor.free();
    }

    static RECORDS: std::sync::Mutex<Vec<(log::Level, String)>> =
        std::sync::Mutex::new(Vec::new());

    struct Capture;

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            RECORDS
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    #[test]
    fn out_of_range_logs_at_debug() {
        let _ = log::set_logger(&Capture);
        log::set_max_level(log::LevelFilter::Trace);

        let sensor = TemperatureSensor::new(MockChan0 {}, config(), COOLANT_TEMP_CURVE);
        assert_eq!(sensor.voltage_to_celsius(7.25), Reading::Invalid);

        let records = RECORDS.lock().unwrap();
        let out_of_range: Vec<_> = records
            .iter()
            .filter(|(_, message)| message.contains("7.25 V outside supply range"))
            .collect();
        assert_eq!(out_of_range.len(), 1);
        assert_eq!(out_of_range[0].0, log::Level::Debug);
    }
}
