//! Readings collection across all adapters
//!
//! Usage and temperature adapters run concurrently. SMART devices are then
//! queried concurrently, each bounded by the same per-adapter timeout. A
//! timeout turns into `Unavailable` for that category or device so one hung
//! source never blocks the run.

use drivehealth_core::{Readings, SmartVerdict, SourceOutcome, VolumeUsage};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::adapters::smart::smart_device_path;
use crate::adapters::{SmartAdapter, TemperatureAdapter, UsageAdapter};

/// Which devices to hand to the SMART adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum SmartTargets {
    Disabled,
    /// Derive devices from the discovered volumes.
    Discovered,
    Devices(Vec<String>),
}

pub struct Collector<U, T, S> {
    usage: U,
    temperature: T,
    smart: S,
    smart_targets: SmartTargets,
    adapter_timeout: Duration,
}

impl<U, T, S> Collector<U, T, S>
where
    U: UsageAdapter,
    T: TemperatureAdapter,
    S: SmartAdapter,
{
    pub fn new(usage: U, temperature: T, smart: S, smart_targets: SmartTargets, adapter_timeout: Duration) -> Self {
        Self {
            usage,
            temperature,
            smart,
            smart_targets,
            adapter_timeout,
        }
    }

    /// Query every source once and bundle the outcomes.
    pub async fn collect(&self) -> Readings {
        info!("Checking disk usage and drive temperatures...");
        let (usage, temperatures) = tokio::join!(
            bounded(self.adapter_timeout, self.usage.volumes()),
            bounded(self.adapter_timeout, self.temperature.readings()),
        );

        let devices = match &self.smart_targets {
            SmartTargets::Disabled => Vec::new(),
            SmartTargets::Devices(devices) => devices.clone(),
            SmartTargets::Discovered => discovered_smart_devices(&usage),
        };

        if !devices.is_empty() {
            info!("Checking SMART data for {} device(s)...", devices.len());
        }
        let smart = join_all(devices.iter().map(|device| self.smart_verdict(device))).await;

        let readings = Readings {
            usage,
            temperatures,
            smart,
        };

        for note in readings.diagnostics() {
            warn!("{}", note);
        }
        readings
    }

    async fn smart_verdict(&self, device: &str) -> SourceOutcome<SmartVerdict> {
        debug!("Querying SMART status for {}", device);
        match bounded(self.adapter_timeout, self.smart.verdict(device)).await {
            SourceOutcome::Unavailable { reason } => {
                SourceOutcome::unavailable(format!("{device}: {reason}"))
            }
            available => available,
        }
    }
}

async fn bounded<V, F>(limit: Duration, query: F) -> SourceOutcome<V>
where
    F: Future<Output = SourceOutcome<V>>,
{
    match tokio::time::timeout(limit, query).await {
        Ok(outcome) => outcome,
        Err(_) => SourceOutcome::unavailable(format!("timed out after {}s", limit.as_secs_f64())),
    }
}

/// SMART device paths for discovered volumes, in discovery order, without repeats.
pub fn discovered_smart_devices(usage: &SourceOutcome<Vec<VolumeUsage>>) -> Vec<String> {
    let Some(volumes) = usage.as_available() else {
        return Vec::new();
    };

    let mut devices: Vec<String> = Vec::new();
    for volume in volumes {
        let path = smart_device_path(volume.device());
        if !devices.contains(&path) {
            devices.push(path);
        }
    }
    devices
}
