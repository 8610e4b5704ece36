//! DriveHealth core - storage health assessment engine
//!
//! Turns normalized readings from independent data sources into one verdict:
//! - Threshold policy (temperature and usage limits, tiered severity)
//! - Normalized readings (volume usage, drive temperatures, SMART verdicts)
//! - Health evaluator producing an ordered findings list
//! - Serializable health report for sinks and alert dispatchers
//!
//! Nothing in this crate performs I/O. Collection lives in `drivehealth-agent`.

pub mod error;
pub mod evaluator;
pub mod model;
pub mod policy;
pub mod report;

pub use error::ConfigError;
pub use evaluator::{evaluate, evaluate_at};
pub use model::{
    Category, Finding, Readings, Severity, SmartStatus, SmartVerdict, SourceOutcome,
    TemperatureReading, VolumeUsage,
};
pub use policy::ThresholdPolicy;
pub use report::{HealthReport, ThresholdsUsed};
