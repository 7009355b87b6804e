use crate::{config::SensorConfig, error::Error};
use embedded_hal::{
    adc::{Channel, OneShot},
    blocking::delay::DelayUs,
};

/// The error returned when reading `Pin` through `Adc` fails.
pub type ReadError<Adc, ADC, Word, Pin> = Error<<Adc as OneShot<ADC, Word, Pin>>::Error>;

/// Reads `pin` `config.sample_count` times and returns the mean as a
/// voltage.
///
/// Reads block until the ADC has a conversion ready, and the reader
/// pauses `config.sample_delay_us` between two reads so consecutive
/// conversions do not pick up the same noise. A `sample_count` of zero
/// is treated as one.
///
/// # Examples
///
/// ```
/// use mx5_daq::{config::SensorConfig, sample_voltage};
/// # use embedded_hal_mock::{
/// #     adc::{Mock, MockChan0, Transaction},
/// #     delay::MockNoop,
/// # };
/// #
/// # let expectations: [Transaction<u16>; 2] =
/// #     [Transaction::read(0, 400), Transaction::read(0, 600)];
/// # let mut adc = Mock::new(&expectations);
/// # let mut pin = MockChan0 {};
/// # let mut delay = MockNoop::new();
///
/// let config = SensorConfig {
///     reference_voltage: 5.0,
///     resolution: 1000,
///     sample_count: 2,
///     sample_delay_us: 100,
/// };
///
/// // Raw readings of 400 and 600 average to half scale
/// assert_eq!(sample_voltage(&mut adc, &mut pin, &mut delay, &config), Ok(2.5));
/// ```
pub fn sample_voltage<Adc, ADC, Word, Pin, Delay>(
    adc: &mut Adc,
    pin: &mut Pin,
    delay: &mut Delay,
    config: &SensorConfig,
) -> Result<f32, ReadError<Adc, ADC, Word, Pin>>
where
    Word: Into<u32>,
    Pin: Channel<ADC>,
    Adc: OneShot<ADC, Word, Pin>,
    Delay: DelayUs<u16>,
{
    let count = config.sample_count.max(1);
    let mut sum = 0u64;

    for index in 0..count {
        if index > 0 {
            delay.delay_us(config.sample_delay_us);
        }

        let raw: u32 = nb::block!(adc.read(pin)).map_err(Error::Adc)?.into();
        sum += u64::from(raw);
    }

    Ok(config.to_voltage(sum as f32 / f32::from(count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::{
        adc::{Mock, MockChan0, Transaction},
        common::Generic,
        delay::MockNoop,
        MockError,
    };
    use std::io::ErrorKind;

    #[derive(Default)]
    struct CountingDelay {
        calls: usize,
        total_us: u32,
    }

    impl DelayUs<u16> for CountingDelay {
        fn delay_us(&mut self, us: u16) {
            self.calls += 1;
            self.total_us += u32::from(us);
        }
    }

    fn config(sample_count: u16) -> SensorConfig {
        SensorConfig {
            reference_voltage: 5.0,
            resolution: 1000,
            sample_count,
            sample_delay_us: 100,
        }
    }

    fn adc(expectations: &[Transaction<u16>]) -> Generic<Transaction<u16>> {
        Mock::new(expectations)
    }

    #[test]
    fn averages_samples() {
        let expectations = [
            Transaction::read(0, 100),
            Transaction::read(0, 200),
            Transaction::read(0, 300),
            Transaction::read(0, 400),
        ];
        let mut adc = adc(&expectations);
        let mut delay = MockNoop::new();

        let voltage = sample_voltage(&mut adc, &mut MockChan0 {}, &mut delay, &config(4));

        assert_eq!(voltage, Ok(1.25));
        adc.done();
    }

    #[test]
    fn full_scale() {
        let expectations = [Transaction::read(0, 1000), Transaction::read(0, 1000)];
        let mut adc = adc(&expectations);
        let mut delay = MockNoop::new();

        let voltage = sample_voltage(&mut adc, &mut MockChan0 {}, &mut delay, &config(2));

        assert_eq!(voltage, Ok(5.0));
        adc.done();
    }

    #[test]
    fn pauses_between_samples() {
        let expectations = [
            Transaction::read(0, 0),
            Transaction::read(0, 0),
            Transaction::read(0, 0),
        ];
        let mut adc = adc(&expectations);
        let mut delay = CountingDelay::default();

        sample_voltage(&mut adc, &mut MockChan0 {}, &mut delay, &config(3)).unwrap();

        assert_eq!(delay.calls, 2);
        assert_eq!(delay.total_us, 200);
        adc.done();
    }

    #[test]
    fn zero_sample_count_reads_once() {
        let expectations = [Transaction::read(0, 500)];
        let mut adc = adc(&expectations);
        let mut delay = CountingDelay::default();

        let voltage = sample_voltage(&mut adc, &mut MockChan0 {}, &mut delay, &config(0));

        assert_eq!(voltage, Ok(2.5));
        assert_eq!(delay.calls, 0);
        adc.done();
    }

    #[test]
    fn error() {
        let expectations =
            [Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::InvalidData))];
        let mut adc = adc(&expectations);
        let mut delay = MockNoop::new();

        let voltage = sample_voltage(&mut adc, &mut MockChan0 {}, &mut delay, &config(1));

        assert!(matches!(voltage, Err(Error::Adc(MockError::Io(ErrorKind::InvalidData)))));
        adc.done();
    }
}
