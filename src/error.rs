use thiserror::Error;

/// A failure to talk to the ADC.
///
/// This is kept apart from [`Reading::Invalid`](crate::Reading::Invalid):
/// an invalid reading means the ADC answered with a voltage the sensor
/// can not produce, while this error means no voltage was obtained.
#[derive(Debug, Error, PartialEq)]
pub enum Error<E> {
    #[error("analog read failed")]
    Adc(E),
}

/// Rejected [`DaqConfig`](crate::config::DaqConfig) values.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sample rate must be at least 1 Hz")]
    ZeroSampleRate,
    #[error("at least one ADC sample must be taken per reading")]
    ZeroSampleCount,
    #[error("ADC resolution must be non-zero")]
    ZeroResolution,
    #[error("reference voltage must be positive")]
    NonPositiveReference,
}
