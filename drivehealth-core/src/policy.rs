//! Threshold policy for drive health classification
//!
//! Two named limits drive every severity decision:
//! - `temperature_limit_celsius` (default 75.0)
//! - `usage_limit_fraction` (default 0.85)
//!
//! Reaching a limit is a WARNING; reaching the limit plus a fixed margin is CRITICAL.

use serde::Serialize;

use crate::error::ConfigError;
use crate::model::Severity;

/// Default temperature limit in degrees Celsius.
pub const DEFAULT_TEMPERATURE_LIMIT_CELSIUS: f64 = 75.0;

/// Default used-capacity limit as a fraction.
pub const DEFAULT_USAGE_LIMIT_FRACTION: f64 = 0.85;

/// Absolute offset above the usage limit at which usage becomes CRITICAL.
pub const USAGE_CRITICAL_MARGIN: f64 = 0.10;

/// Offset in degrees above the temperature limit at which a reading becomes CRITICAL.
pub const TEMPERATURE_CRITICAL_MARGIN_CELSIUS: f64 = 10.0;

/// Validated temperature and usage limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdPolicy {
    temperature_limit_celsius: f64,
    usage_limit_fraction: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            temperature_limit_celsius: DEFAULT_TEMPERATURE_LIMIT_CELSIUS,
            usage_limit_fraction: DEFAULT_USAGE_LIMIT_FRACTION,
        }
    }
}

impl ThresholdPolicy {
    /// Build a policy, rejecting negative or non-finite limits and usage limits outside [0, 1].
    pub fn new(temperature_limit_celsius: f64, usage_limit_fraction: f64) -> Result<Self, ConfigError> {
        if !temperature_limit_celsius.is_finite() || temperature_limit_celsius < 0.0 {
            return Err(ConfigError::InvalidTemperatureLimit(temperature_limit_celsius));
        }
        if !(0.0..=1.0).contains(&usage_limit_fraction) {
            return Err(ConfigError::InvalidUsageLimit(usage_limit_fraction));
        }

        Ok(Self {
            temperature_limit_celsius,
            usage_limit_fraction,
        })
    }

    /// Build a policy from a usage limit expressed as a percentage (85.0 == 0.85).
    pub fn from_percent(temperature_limit_celsius: f64, usage_limit_percent: f64) -> Result<Self, ConfigError> {
        Self::new(temperature_limit_celsius, usage_limit_percent / 100.0)
    }

    pub fn temperature_limit_celsius(&self) -> f64 {
        self.temperature_limit_celsius
    }

    pub fn usage_limit_fraction(&self) -> f64 {
        self.usage_limit_fraction
    }

    /// Classify a used-capacity fraction.
    pub fn classify_usage(&self, fraction: f64) -> Severity {
        tiered(fraction, self.usage_limit_fraction, USAGE_CRITICAL_MARGIN)
    }

    /// Classify a temperature in degrees Celsius.
    pub fn classify_temperature(&self, celsius: f64) -> Severity {
        tiered(celsius, self.temperature_limit_celsius, TEMPERATURE_CRITICAL_MARGIN_CELSIUS)
    }
}

/// Slack for float rounding when a value sits exactly on a boundary.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

// Compare the excess over the limit rather than `limit + margin`, whose sum can round upward
fn tiered(value: f64, limit: f64, critical_margin: f64) -> Severity {
    let excess = value - limit;
    if excess >= critical_margin - BOUNDARY_TOLERANCE {
        Severity::Critical
    } else if excess >= -BOUNDARY_TOLERANCE {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
