use thiserror::Error;

/// Rejected configuration or contract-violating input.
///
/// Raised at construction time so that evaluation itself never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("temperature limit must be a finite, non-negative value in Celsius (got {0})")]
    InvalidTemperatureLimit(f64),

    #[error("usage limit must be a fraction within [0, 1] (got {0})")]
    InvalidUsageLimit(f64),

    #[error("used fraction for volume '{device}' must be within [0, 1] (got {value})")]
    InvalidUsedFraction { device: String, value: f64 },

    #[error("volume '{0}' reports zero total capacity")]
    ZeroCapacity(String),

    #[error("temperature reading for sensor '{sensor}' is not a finite number (got {value})")]
    InvalidTemperature { sensor: String, value: f64 },
}
