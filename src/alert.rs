//! Threshold warnings for the driver.
//!
//! Temperatures have two tiers: a warning when the engine runs hot and
//! a danger alert when it overheats. Each threshold is inclusive.

use crate::output::{Cell, Frame};
use heapless::Vec;

/// Coolant temperature at which the engine runs hot (°C).
pub const COOLANT_TEMP_WARNING: f32 = 90.0;

/// Coolant temperature at which the engine is overheating (°C).
pub const COOLANT_TEMP_DANGER: f32 = 100.0;

/// Oil temperature at which the oil runs hot (°C).
pub const OIL_TEMP_WARNING: f32 = 110.0;

/// Oil temperature at which the oil is overheating (°C).
pub const OIL_TEMP_DANGER: f32 = 120.0;

/// Oil pressure at or below which the engine is starved of oil (PSI).
pub const OIL_PRESSURE_MIN: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Danger,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alert {
    CoolantTemp(Severity, f32),
    OilTemp(Severity, f32),
    /// Always [`Severity::Danger`]
    LowOilPressure(f32),
}

impl Alert {
    pub fn severity(&self) -> Severity {
        match self {
            Alert::CoolantTemp(severity, _) | Alert::OilTemp(severity, _) => *severity,
            Alert::LowOilPressure(_) => Severity::Danger,
        }
    }
}

impl Frame {
    /// Returns every threshold this frame reaches, at most one per
    /// column.
    ///
    /// Only valid values are checked: an invalid or faulted column
    /// never raises an alert.
    pub fn alerts(&self) -> Vec<Alert, 3> {
        let checks = [
            value(self.coolant_temp)
                .and_then(|t| tier(t, COOLANT_TEMP_WARNING, COOLANT_TEMP_DANGER))
                .map(|(severity, t)| Alert::CoolantTemp(severity, t)),
            value(self.oil_temp)
                .and_then(|t| tier(t, OIL_TEMP_WARNING, OIL_TEMP_DANGER))
                .map(|(severity, t)| Alert::OilTemp(severity, t)),
            value(self.oil_pressure)
                .filter(|&p| p <= OIL_PRESSURE_MIN)
                .map(Alert::LowOilPressure),
        ];

        checks.into_iter().flatten().collect()
    }
}

fn tier(value: f32, warning: f32, danger: f32) -> Option<(Severity, f32)> {
    if value >= danger {
        Some((Severity::Danger, value))
    } else if value >= warning {
        Some((Severity::Warning, value))
    } else {
        None
    }
}

fn value(cell: Option<Cell>) -> Option<f32> {
    match cell? {
        Cell::Value(value) => Some(value),
        Cell::Invalid | Cell::Fault => None,
    }
}
