//! DriveHealth Agent - periodic storage health checks
//!
//! Collects drive data from the host and hands it to `drivehealth-core`:
//! - Disk usage per mounted volume
//! - Drive temperature sensors
//! - SMART overall health through smartctl
//! - JSON report persistence and optional email alerts

pub mod adapters;
pub mod alert;
pub mod collector;
pub mod config;
pub mod run;
pub mod sink;
