//! The plain text stream sent over the serial link.
//!
//! The stream starts with [`BANNER`], then one header line, then one
//! comma separated line per sample tick:
//!
//! ```text
//! MX5 DAQ System Starting...
//! timestamp_ms,coolant_temp_c
//! 100,84.21
//! 200,nan
//! ```
//!
//! Columns always appear in the order of [`COLUMNS`]; sensors that are
//! not enabled are left out. New sensors get new columns at the end.

use crate::sensor::Reading;
use core::fmt::{self, Write};
use heapless::String;

pub const BANNER: &str = "MX5 DAQ System Starting...";

/// Column names, in output order.
pub const COLUMNS: [&str; 5] = [
    "timestamp_ms",
    "coolant_temp_c",
    "oil_temp_c",
    "oil_pressure_psi",
    "throttle_pct",
];

/// Written in place of a value the sensor reported as invalid.
pub const INVALID: &str = "nan";

/// Written in place of a value that could not be read from the ADC.
pub const FAULT: &str = "err";

/// Longest line [`Frame::to_line`] can produce.
pub const LINE_CAPACITY: usize = 96;

/// One column of one output line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell {
    Value(f32),
    Invalid,
    Fault,
}

impl From<Reading> for Cell {
    fn from(reading: Reading) -> Self {
        match reading {
            Reading::Valid(value) => Cell::Value(value),
            Reading::Invalid => Cell::Invalid,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Value(value) if value.is_finite() => write!(f, "{:.2}", value),
            Cell::Value(_) | Cell::Invalid => f.write_str(INVALID),
            Cell::Fault => f.write_str(FAULT),
        }
    }
}

/// The values produced by one sample tick. `None` marks a disabled
/// sensor, whose column is not written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub timestamp_ms: u32,
    pub coolant_temp: Option<Cell>,
    pub oil_temp: Option<Cell>,
    pub oil_pressure: Option<Cell>,
    pub throttle_position: Option<Cell>,
}

impl Frame {
    fn cells(&self) -> [Option<Cell>; 4] {
        [
            self.coolant_temp,
            self.oil_temp,
            self.oil_pressure,
            self.throttle_position,
        ]
    }

    /// Writes the header line matching this frame's enabled columns.
    pub fn write_header<W: Write>(&self, w: &mut W) -> fmt::Result {
        w.write_str(COLUMNS[0])?;
        for (name, cell) in COLUMNS[1..].iter().zip(self.cells()) {
            if cell.is_some() {
                write!(w, ",{}", name)?;
            }
        }
        w.write_str("\n")
    }

    /// Writes the frame as one newline terminated line.
    ///
    /// # Examples
    ///
    /// ```
    /// use mx5_daq::output::{Cell, Frame};
    /// # use heapless::String;
    ///
    /// let frame = Frame {
    ///     timestamp_ms: 1200,
    ///     coolant_temp: Some(Cell::Value(84.2)),
    ///     oil_temp: None,
    ///     oil_pressure: Some(Cell::Invalid),
    ///     throttle_position: None,
    /// };
    ///
    /// let mut line: String<64> = String::new();
    /// frame.write_line(&mut line).unwrap();
    /// assert_eq!(line, "1200,84.20,nan\n");
    /// ```
    pub fn write_line<W: Write>(&self, w: &mut W) -> fmt::Result {
        write!(w, "{}", self.timestamp_ms)?;
        for cell in self.cells().into_iter().flatten() {
            write!(w, ",{}", cell)?;
        }
        w.write_str("\n")
    }

    pub fn to_line(&self) -> Result<String<LINE_CAPACITY>, fmt::Error> {
        let mut line = String::new();
        self.write_line(&mut line)?;
        Ok(line)
    }
}

/// A line of the stream as seen by the receiving end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    pub timestamp_ms: u32,
    pub coolant_temp: Option<f32>,
    pub oil_temp: Option<f32>,
    pub oil_pressure: Option<f32>,
    pub throttle_position: Option<f32>,
}

impl Record {
    /// Parses one data line.
    ///
    /// Returns `None` for the banner, the header and anything else that
    /// does not start with a millisecond timestamp followed by at least
    /// one value. Values are assigned to columns by position. A value
    /// that is missing, `nan` or `err` parses as `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mx5_daq::output::Record;
    ///
    /// let record = Record::parse("1200,84.22,nan,41.5").unwrap();
    ///
    /// assert_eq!(record.timestamp_ms, 1200);
    /// assert_eq!(record.coolant_temp, Some(84.22));
    /// assert_eq!(record.oil_temp, None);
    /// assert_eq!(record.oil_pressure, Some(41.5));
    /// assert_eq!(record.throttle_position, None);
    ///
    /// assert_eq!(Record::parse("timestamp_ms,coolant_temp_c"), None);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.starts_with("MX5") {
            return None;
        }

        let mut fields = line.split(',');
        let timestamp_ms = fields.next()?.trim().parse::<u32>().ok()?;

        let mut values = [None; 4];
        let mut count = 0;
        for (slot, field) in values.iter_mut().zip(&mut fields) {
            *slot = field
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite());
            count += 1;
        }
        if count == 0 {
            return None;
        }

        let [coolant_temp, oil_temp, oil_pressure, throttle_position] = values;
        Some(Self {
            timestamp_ms,
            coolant_temp,
            oil_temp,
            oil_pressure,
            throttle_position,
        })
    }
}
