//! Source adapters for drive health data
//!
//! Each adapter queries one external source and returns normalized readings:
//! - `usage`: mounted volume capacity (sysinfo)
//! - `temperature`: drive temperature sensors (sysinfo components)
//! - `smart`: SMART overall health via `smartctl`
//!
//! Adapters never fail upward. A source that cannot be queried becomes
//! `SourceOutcome::Unavailable`, an indeterminate SMART result becomes `UNKNOWN`.

pub mod smart;
pub mod temperature;
pub mod usage;

use async_trait::async_trait;
use drivehealth_core::{SmartVerdict, SourceOutcome, TemperatureReading, VolumeUsage};

pub use smart::SmartctlAdapter;
pub use temperature::SysinfoTemperatureAdapter;
pub use usage::SysinfoUsageAdapter;

/// Mounted volume capacity source.
#[async_trait]
pub trait UsageAdapter: Send + Sync {
    async fn volumes(&self) -> SourceOutcome<Vec<VolumeUsage>>;
}

/// Drive temperature source. No sensors is an empty list, not `Unavailable`.
#[async_trait]
pub trait TemperatureAdapter: Send + Sync {
    async fn readings(&self) -> SourceOutcome<Vec<TemperatureReading>>;
}

/// Per-device SMART health source.
#[async_trait]
pub trait SmartAdapter: Send + Sync {
    async fn verdict(&self, device: &str) -> SourceOutcome<SmartVerdict>;
}
