//! Drive temperature sensors
//!
//! Only components whose label mentions a storage keyword are kept, so CPU and
//! chipset sensors never show up as drive findings. Reading sensors usually
//! requires elevated privileges; without them the list is simply empty.

use async_trait::async_trait;
use drivehealth_core::{SourceOutcome, TemperatureReading};
use sysinfo::Components;
use tracing::debug;

use super::TemperatureAdapter;

/// Temperature adapter backed by `sysinfo::Components`.
#[derive(Debug, Clone)]
pub struct SysinfoTemperatureAdapter {
    keywords: Vec<String>,
}

impl SysinfoTemperatureAdapter {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl TemperatureAdapter for SysinfoTemperatureAdapter {
    async fn readings(&self) -> SourceOutcome<Vec<TemperatureReading>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return SourceOutcome::unavailable("temperature sensors are not supported on this platform");
        }

        let sensors = tokio::task::spawn_blocking(|| {
            let components = Components::new_with_refreshed_list();
            components
                .list()
                .iter()
                .map(|c| (c.label().to_string(), c.temperature()))
                .collect::<Vec<_>>()
        })
        .await;

        match sensors {
            Ok(sensors) => {
                debug!("Found {} temperature components", sensors.len());
                SourceOutcome::Available(select_drive_sensors(&self.keywords, sensors))
            }
            Err(e) => SourceOutcome::unavailable(format!("could not read temperature sensors: {e}")),
        }
    }
}

/// Keep storage sensors with a finite reading, in enumeration order.
pub fn select_drive_sensors(
    keywords: &[String],
    sensors: impl IntoIterator<Item = (String, f32)>,
) -> Vec<TemperatureReading> {
    sensors
        .into_iter()
        .filter(|(label, _)| {
            let label = label.to_lowercase();
            keywords.iter().any(|k| label.contains(k.as_str()))
        })
        .filter_map(|(label, celsius)| TemperatureReading::new(label, f64::from(celsius)).ok())
        .collect()
}
