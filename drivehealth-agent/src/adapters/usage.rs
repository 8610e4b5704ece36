//! Disk usage for mounted filesystems

use async_trait::async_trait;
use drivehealth_core::{SourceOutcome, VolumeUsage};
use std::collections::HashSet;
use sysinfo::Disks;
use tracing::debug;

use super::UsageAdapter;

/// Raw capacity figures for one mounted volume, as enumerated by the OS.
#[derive(Debug, Clone)]
pub struct RawVolume {
    pub name: String,
    pub mount_point: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Usage adapter backed by `sysinfo::Disks`.
#[derive(Debug, Default)]
pub struct SysinfoUsageAdapter;

#[async_trait]
impl UsageAdapter for SysinfoUsageAdapter {
    async fn volumes(&self) -> SourceOutcome<Vec<VolumeUsage>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return SourceOutcome::unavailable("volume enumeration is not supported on this platform");
        }

        let enumerated = tokio::task::spawn_blocking(|| {
            let disks = Disks::new_with_refreshed_list();
            disks
                .list()
                .iter()
                .map(|disk| RawVolume {
                    name: disk.name().to_string_lossy().to_string(),
                    mount_point: disk.mount_point().to_string_lossy().to_string(),
                    total_bytes: disk.total_space(),
                    available_bytes: disk.available_space(),
                })
                .collect::<Vec<_>>()
        })
        .await;

        match enumerated {
            Ok(raw) => {
                debug!("Enumerated {} mounted volumes", raw.len());
                SourceOutcome::Available(normalize_volumes(raw))
            }
            Err(e) => SourceOutcome::unavailable(format!("volume enumeration failed: {e}")),
        }
    }
}

/// Device identifier for a volume: disk name, else the mount point.
///
/// Windows mount points such as `C:\` are reported as `C:`.
pub fn device_identifier(name: &str, mount_point: &str) -> String {
    let name = name.trim();
    if !name.is_empty() && !is_volume_label(name, mount_point) {
        return name.to_string();
    }

    let trimmed = mount_point.trim_end_matches('\\');
    if trimmed.is_empty() {
        mount_point.to_string()
    } else {
        trimmed.to_string()
    }
}

// On Windows sysinfo reports the volume label as the disk name
fn is_volume_label(name: &str, mount_point: &str) -> bool {
    mount_point.len() >= 2 && mount_point.as_bytes()[1] == b':' && !name.contains(':')
}

/// Convert raw volumes into validated usage, skipping zero-capacity and repeated devices.
pub fn normalize_volumes(raw: Vec<RawVolume>) -> Vec<VolumeUsage> {
    let mut seen = HashSet::new();
    let mut volumes = Vec::new();

    for volume in raw {
        let device = device_identifier(&volume.name, &volume.mount_point);
        if seen.contains(&device) {
            debug!("Skipping repeated mount of {} at {}", device, volume.mount_point);
            continue;
        }

        match VolumeUsage::from_capacity(
            device.clone(),
            volume.mount_point,
            volume.total_bytes,
            volume.available_bytes,
        ) {
            Ok(usage) => {
                seen.insert(device);
                volumes.push(usage);
            }
            Err(e) => debug!("Skipping volume: {}", e),
        }
    }

    volumes
}
