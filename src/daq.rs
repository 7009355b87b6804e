use crate::{
    clock::SampleClock,
    config::DaqConfig,
    error::{ConfigError, Error},
    output::{Cell, Frame, BANNER, COLUMNS},
    sensor::Sensor,
};
use core::fmt::{self, Debug, Write};

/// The sampling loop's state: up to four sensors and the tick clock.
///
/// Columns are, in order, coolant temperature (°C), oil temperature
/// (°C), oil pressure (PSI) and throttle position (%). Use
/// [`Disabled`](crate::Disabled) for a slot with no sensor fitted.
///
/// A failed ADC read never stops sampling: the column is written as
/// [`Cell::Fault`] and the remaining sensors are still read.
#[derive(Debug)]
pub struct Daq<C, O, P, T> {
    coolant_temp: Option<C>,
    oil_temp: Option<O>,
    oil_pressure: Option<P>,
    throttle_position: Option<T>,
    clock: SampleClock,
}

impl<C, O, P, T> Daq<C, O, P, T> {
    /// Validates `config` and keeps the sensors whose slot is enabled.
    pub fn new(
        config: &DaqConfig,
        coolant_temp: C,
        oil_temp: O,
        oil_pressure: P,
        throttle_position: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        log::info!(
            "sampling at {} Hz, {} samples per reading",
            config.sample_rate_hz,
            config.sensor.sample_count
        );

        Ok(Self {
            coolant_temp: fitted(config.coolant_temp, coolant_temp),
            oil_temp: fitted(config.oil_temp, oil_temp),
            oil_pressure: fitted(config.oil_pressure, oil_pressure),
            throttle_position: fitted(config.throttle_position, throttle_position),
            clock: SampleClock::new(config.sample_period()),
        })
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    /// Writes the banner and the header line. Call once at startup.
    pub fn write_preamble<W: Write>(&self, w: &mut W) -> fmt::Result {
        writeln!(w, "{}", BANNER)?;

        let template = Frame {
            timestamp_ms: 0,
            coolant_temp: self.coolant_temp.as_ref().map(|_| Cell::Invalid),
            oil_temp: self.oil_temp.as_ref().map(|_| Cell::Invalid),
            oil_pressure: self.oil_pressure.as_ref().map(|_| Cell::Invalid),
            throttle_position: self.throttle_position.as_ref().map(|_| Cell::Invalid),
        };
        template.write_header(w)
    }

    /// Samples every enabled sensor if a tick is due at `now_ms`.
    pub fn poll<Adc, ADC, Word, Delay>(
        &mut self,
        now_ms: u32,
        adc: &mut Adc,
        delay: &mut Delay,
    ) -> Option<Frame>
    where
        C: Sensor<Adc, ADC, Word, Delay>,
        O: Sensor<Adc, ADC, Word, Delay>,
        P: Sensor<Adc, ADC, Word, Delay>,
        T: Sensor<Adc, ADC, Word, Delay>,
        C::Error: Debug,
        O::Error: Debug,
        P::Error: Debug,
        T::Error: Debug,
    {
        if !self.clock.poll(now_ms) {
            return None;
        }

        Some(self.sample::<Adc, ADC, Word, Delay>(now_ms, adc, delay))
    }

    /// Samples every enabled sensor now, in column order.
    pub fn sample<Adc, ADC, Word, Delay>(
        &mut self,
        now_ms: u32,
        adc: &mut Adc,
        delay: &mut Delay,
    ) -> Frame
    where
        C: Sensor<Adc, ADC, Word, Delay>,
        O: Sensor<Adc, ADC, Word, Delay>,
        P: Sensor<Adc, ADC, Word, Delay>,
        T: Sensor<Adc, ADC, Word, Delay>,
        C::Error: Debug,
        O::Error: Debug,
        P::Error: Debug,
        T::Error: Debug,
    {
        log::debug!("sampling at {} ms", now_ms);

        Frame {
            timestamp_ms: now_ms,
            coolant_temp: read::<C, Adc, ADC, Word, Delay>(
                COLUMNS[1],
                &mut self.coolant_temp,
                adc,
                delay,
            ),
            oil_temp: read::<O, Adc, ADC, Word, Delay>(COLUMNS[2], &mut self.oil_temp, adc, delay),
            oil_pressure: read::<P, Adc, ADC, Word, Delay>(
                COLUMNS[3],
                &mut self.oil_pressure,
                adc,
                delay,
            ),
            throttle_position: read::<T, Adc, ADC, Word, Delay>(
                COLUMNS[4],
                &mut self.throttle_position,
                adc,
                delay,
            ),
        }
    }

    /// Destroys the logger and returns the enabled sensors.
    pub fn free(self) -> (Option<C>, Option<O>, Option<P>, Option<T>) {
        (
            self.coolant_temp,
            self.oil_temp,
            self.oil_pressure,
            self.throttle_position,
        )
    }
}

fn fitted<S>(enabled: bool, sensor: S) -> Option<S> {
    enabled.then_some(sensor)
}

fn read<S, Adc, ADC, Word, Delay>(
    column: &str,
    sensor: &mut Option<S>,
    adc: &mut Adc,
    delay: &mut Delay,
) -> Option<Cell>
where
    S: Sensor<Adc, ADC, Word, Delay>,
    S::Error: Debug,
{
    let sensor = sensor.as_mut()?;

    match sensor.sample(adc, delay) {
        Ok(reading) => Some(reading.into()),
        Err(Error::Adc(e)) => {
            log::warn!("{}: analog read failed: {:?}", column, e);
            Some(Cell::Fault)
        }
    }
}
