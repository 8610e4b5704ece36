//! Configuration management
//!
//! Handles:
//! - Threshold limits (temperature, usage percentage)
//! - Collection timeouts and sensor selection
//! - smartctl invocation settings
//! - Report output directory
//! - Optional SMTP alerting (password from the environment only)

use anyhow::{Context, Result};
use drivehealth_core::policy::{DEFAULT_TEMPERATURE_LIMIT_CELSIUS, DEFAULT_USAGE_LIMIT_FRACTION};
use drivehealth_core::ThresholdPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "DRIVEHEALTH_CONFIG";

/// Environment variable holding the SMTP password.
pub const SMTP_PASSWORD_ENV: &str = "DRIVEHEALTH_SMTP_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub thresholds: ThresholdConfig,
    pub collection: CollectionConfig,
    pub smart: SmartConfig,
    pub report: ReportConfig,
    pub alert: Option<AlertConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub temperature_limit_celsius: f64,
    pub usage_limit_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub adapter_timeout_secs: u64,
    pub sensor_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartConfig {
    pub enabled: bool,
    pub smartctl_path: String,
    pub timeout_secs: u64,
    /// Devices to query. Empty means "every discovered volume".
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(skip)] // Never read from or written to the file
    pub password: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temperature_limit_celsius: DEFAULT_TEMPERATURE_LIMIT_CELSIUS,
            usage_limit_percent: DEFAULT_USAGE_LIMIT_FRACTION * 100.0,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_secs: 60,
            sensor_keywords: ["nvme", "ssd", "sata", "drive"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for SmartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smartctl_path: "smartctl".to_string(),
            timeout_secs: 30,
            devices: Vec::new(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl ThresholdConfig {
    /// Validate and convert into the evaluation policy.
    pub fn to_policy(&self) -> Result<ThresholdPolicy> {
        ThresholdPolicy::from_percent(self.temperature_limit_celsius, self.usage_limit_percent)
            .context("Invalid threshold configuration")
    }
}

impl CollectionConfig {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }
}

impl SmartConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MonitorConfig {
    /// Load config from `DRIVEHEALTH_CONFIG` or the OS-specific location.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        let mut config = if config_path.exists() {
            let content = tokio::fs::read_to_string(&config_path)
                .await
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?
        } else {
            Self::default()
        };

        if let Some(alert) = config.alert.as_mut() {
            alert.password = std::env::var(SMTP_PASSWORD_ENV).ok();
        }

        Ok(config)
    }

    /// Check the whole config before any collection and return the evaluation policy.
    ///
    /// Zero timeouts would turn every source `Unavailable` and yield an empty,
    /// "healthy" report, so they are rejected here.
    pub fn validate(&self) -> Result<ThresholdPolicy> {
        let policy = self.thresholds.to_policy()?;

        if self.collection.adapter_timeout_secs == 0 {
            anyhow::bail!("collection.adapter_timeout_secs must be greater than zero");
        }
        if self.smart.enabled && self.smart.timeout_secs == 0 {
            anyhow::bail!("smart.timeout_secs must be greater than zero");
        }
        if let Some(alert) = &self.alert {
            if alert.password.is_some() && alert.username.is_none() {
                anyhow::bail!(
                    "{} is set but alert.username is missing; mail would be sent unauthenticated",
                    SMTP_PASSWORD_ENV
                );
            }
        }

        Ok(policy)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get config file path (env override, then OS config dir)
    pub fn config_file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("drivehealth");
        path.push("config.toml");
        Ok(path)
    }
}
