//! Compiled-in calibration curves.
//!
//! Every curve maps a sensor output voltage (V) to a physical value.
//! The tables below come from bench measurements of the sensors fitted
//! to the car; replacing a sensor means replacing its table here.

use crate::interpolate::interpolate;

/// One `(input, output)` breakpoint of a calibration curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationPoint {
    pub input: f32,
    pub output: f32,
}

impl CalibrationPoint {
    pub const fn new(input: f32, output: f32) -> Self {
        Self { input, output }
    }
}

/// A piecewise-linear transfer function made of `LENGTH` breakpoints.
///
/// The breakpoints must be in strictly ascending order by input and
/// there must be at least one of them. This is not checked here so
/// that tables can be built in `const` context; the sensor adapters
/// check it with `debug_assert!` when they are constructed.
///
/// # Examples
///
/// ```
/// use mx5_daq::calibration::{CalibrationPoint, CalibrationTable};
///
/// let table = CalibrationTable::new([
///     CalibrationPoint::new(1.0, 40.0),
///     CalibrationPoint::new(2.0, 30.0),
///     CalibrationPoint::new(3.0, 10.0),
/// ]);
///
/// assert_eq!(table.lookup(1.5), 35.0);
/// assert_eq!(table.lookup(0.2), 40.0);
/// assert_eq!(table.lookup(9.0), 10.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationTable<const LENGTH: usize> {
    points: [CalibrationPoint; LENGTH],
}

impl<const LENGTH: usize> CalibrationTable<LENGTH> {
    pub const fn new(points: [CalibrationPoint; LENGTH]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Returns the output for `input`, clamped to the first and last
    /// outputs of the table. See [`interpolate`](crate::interpolate).
    pub fn lookup(&self, input: f32) -> f32 {
        interpolate(input, &self.points)
    }

    /// Returns `true` if the table is non-empty and its inputs strictly
    /// increase.
    pub fn is_ascending(&self) -> bool {
        LENGTH > 0 && self.points.windows(2).all(|w| w[0].input < w[1].input)
    }

    /// The `(first, last)` inputs covered by the table.
    pub fn domain(&self) -> (f32, f32) {
        (self.first().input, self.last().input)
    }

    /// Returns the smallest value that can be returned by
    /// [`lookup`](CalibrationTable::lookup).
    pub fn min_output(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.output)
            .fold(f32::INFINITY, f32::min)
    }

    /// Returns the largest value that can be returned by
    /// [`lookup`](CalibrationTable::lookup).
    pub fn max_output(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.output)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    fn first(&self) -> &CalibrationPoint {
        &self.points[0]
    }

    fn last(&self) -> &CalibrationPoint {
        &self.points[LENGTH - 1]
    }
}

/// Coolant temperature sender (NTC), volts to °C.
pub const COOLANT_TEMP_CURVE: CalibrationTable<9> = CalibrationTable::new([
    CalibrationPoint::new(0.5, -10.0),
    CalibrationPoint::new(1.0, 10.0),
    CalibrationPoint::new(1.5, 30.0),
    CalibrationPoint::new(2.0, 50.0),
    CalibrationPoint::new(2.5, 70.0),
    CalibrationPoint::new(3.0, 85.0),
    CalibrationPoint::new(3.5, 100.0),
    CalibrationPoint::new(4.0, 115.0),
    CalibrationPoint::new(4.5, 130.0),
]);

/// Oil pressure sender, volts to PSI. 0.5 V is 0 PSI, 4.5 V is 150 PSI.
pub const OIL_PRESSURE_CURVE: CalibrationTable<5> = CalibrationTable::new([
    CalibrationPoint::new(0.5, 0.0),
    CalibrationPoint::new(1.5, 37.5),
    CalibrationPoint::new(2.5, 75.0),
    CalibrationPoint::new(3.5, 112.5),
    CalibrationPoint::new(4.5, 150.0),
]);

/// End points of a throttle position sensor.
///
/// The throttle sensor is linear, so it is described by its closed and
/// wide open voltages instead of a table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrottleCalibration {
    /// Voltage at closed throttle (V)
    pub min_voltage: f32,
    /// Voltage at wide open throttle (V)
    pub max_voltage: f32,
}

impl ThrottleCalibration {
    pub const DEFAULT: Self = Self {
        min_voltage: 0.5,
        max_voltage: 4.5,
    };

    /// Maps `voltage` onto `0..=100` %, saturating at both ends.
    ///
    /// Voltages outside the sensor's range are never reported as
    /// invalid; they read as fully closed or fully open. A calibration
    /// with `max_voltage <= min_voltage` always reads 0 %.
    ///
    /// # Examples
    ///
    /// ```
    /// use mx5_daq::calibration::ThrottleCalibration;
    ///
    /// let tps = ThrottleCalibration::DEFAULT;
    ///
    /// assert_eq!(tps.percent(2.5), 50.0);
    /// assert_eq!(tps.percent(0.0), 0.0);
    /// assert_eq!(tps.percent(5.0), 100.0);
    /// ```
    pub fn percent(&self, voltage: f32) -> f32 {
        let span = self.max_voltage - self.min_voltage;
        let percent = (voltage - self.min_voltage) / span * 100.0;
        if span <= 0.0 || percent.is_nan() {
            return 0.0;
        }

        percent.clamp(0.0, 100.0)
    }
}

impl Default for ThrottleCalibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}
