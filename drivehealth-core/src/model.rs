//! Normalized readings and findings
//!
//! Every data source is reduced to one of these shapes before evaluation:
//! - `VolumeUsage` per mounted volume
//! - `TemperatureReading` per drive sensor
//! - `SmartVerdict` per device
//!
//! A source that could not be queried at all is `SourceOutcome::Unavailable`.
//! Absence is never a failure.

use serde::Serialize;

use crate::error::ConfigError;

/// Result of querying one data source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> SourceOutcome<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SourceOutcome::Unavailable { reason: reason.into() }
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            SourceOutcome::Available(value) => Some(value),
            SourceOutcome::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            SourceOutcome::Available(_) => None,
            SourceOutcome::Unavailable { reason } => Some(reason),
        }
    }
}

/// Ordinal health classification. Ordering is `Ok < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Severity {
    pub fn is_issue(self) -> bool {
        self != Severity::Ok
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Which data source a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Usage,
    Temperature,
    Smart,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Usage => "USAGE",
            Category::Temperature => "TEMPERATURE",
            Category::Smart => "SMART",
        }
    }
}

/// Used and free capacity of one mounted volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeUsage {
    device: String,
    mount_point: String,
    used_fraction: f64,
    free_bytes: u64,
    total_bytes: u64,
}

impl VolumeUsage {
    pub fn new(
        device: impl Into<String>,
        mount_point: impl Into<String>,
        used_fraction: f64,
        free_bytes: u64,
        total_bytes: u64,
    ) -> Result<Self, ConfigError> {
        let device = device.into();
        if !(0.0..=1.0).contains(&used_fraction) {
            return Err(ConfigError::InvalidUsedFraction {
                device,
                value: used_fraction,
            });
        }

        Ok(Self {
            device,
            mount_point: mount_point.into(),
            used_fraction,
            free_bytes,
            total_bytes,
        })
    }

    /// Derive usage from raw capacity figures as reported by the filesystem.
    pub fn from_capacity(
        device: impl Into<String>,
        mount_point: impl Into<String>,
        total_bytes: u64,
        available_bytes: u64,
    ) -> Result<Self, ConfigError> {
        let device = device.into();
        if total_bytes == 0 {
            return Err(ConfigError::ZeroCapacity(device));
        }

        // Some filesystems report more available than total when reserved blocks are involved
        let free_bytes = available_bytes.min(total_bytes);
        let used_fraction = (total_bytes - free_bytes) as f64 / total_bytes as f64;
        Self::new(device, mount_point, used_fraction, free_bytes, total_bytes)
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn used_fraction(&self) -> f64 {
        self.used_fraction
    }

    pub fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

/// One drive temperature sensor value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    sensor: String,
    celsius: f64,
}

impl TemperatureReading {
    pub fn new(sensor: impl Into<String>, celsius: f64) -> Result<Self, ConfigError> {
        let sensor = sensor.into();
        if !celsius.is_finite() {
            return Err(ConfigError::InvalidTemperature { sensor, value: celsius });
        }
        Ok(Self { sensor, celsius })
    }

    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    pub fn celsius(&self) -> f64 {
        self.celsius
    }
}

/// SMART overall-health self-assessment.
///
/// `Unknown` covers a missing tool, a busy device or unparsable output.
/// It is never the same thing as `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SmartStatus {
    Passed,
    Failed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartVerdict {
    pub device: String,
    pub status: SmartStatus,
    pub detail: Option<String>,
}

impl SmartVerdict {
    pub fn passed(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            status: SmartStatus::Passed,
            detail: None,
        }
    }

    pub fn failed(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            status: SmartStatus::Failed,
            detail: None,
        }
    }

    pub fn unknown(device: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            status: SmartStatus::Unknown,
            detail: Some(detail.into()),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// One classified observation about a single subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub category: Category,
    pub subject: String,
    pub severity: Severity,
    pub message: String,
    pub metric_value: Option<f64>,
}

/// Everything collected during one run, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Readings {
    pub usage: SourceOutcome<Vec<VolumeUsage>>,
    pub temperatures: SourceOutcome<Vec<TemperatureReading>>,
    pub smart: Vec<SourceOutcome<SmartVerdict>>,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            usage: SourceOutcome::Available(Vec::new()),
            temperatures: SourceOutcome::Available(Vec::new()),
            smart: Vec::new(),
        }
    }
}

impl Readings {
    /// Human-readable notes about sources that produced nothing.
    ///
    /// These never become findings; callers print or log them.
    pub fn diagnostics(&self) -> Vec<String> {
        let mut notes = Vec::new();

        match &self.usage {
            SourceOutcome::Unavailable { reason } => {
                notes.push(format!("Disk usage unavailable: {reason}"));
            }
            SourceOutcome::Available(volumes) if volumes.is_empty() => {
                notes.push("No mounted volumes found".to_string());
            }
            SourceOutcome::Available(_) => {}
        }

        match &self.temperatures {
            SourceOutcome::Unavailable { reason } => {
                notes.push(format!("Drive temperatures unavailable: {reason}"));
            }
            SourceOutcome::Available(readings) if readings.is_empty() => {
                notes.push("No temperature sensors found or insufficient permissions".to_string());
            }
            SourceOutcome::Available(_) => {}
        }

        for outcome in &self.smart {
            if let SourceOutcome::Unavailable { reason } = outcome {
                notes.push(format!("SMART data unavailable: {reason}"));
            }
        }

        notes
    }
}
