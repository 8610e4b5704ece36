//! DriveHealth Agent entry point
//!
//! Runs a single health check pass and exits. Scheduling is left to cron or
//! the platform task scheduler.

use anyhow::{Context, Result};
use drivehealth_agent::adapters::{SmartctlAdapter, SysinfoTemperatureAdapter, SysinfoUsageAdapter};
use drivehealth_agent::alert::{AlertDispatcher, EmailAlerter};
use drivehealth_agent::collector::{Collector, SmartTargets};
use drivehealth_agent::config::MonitorConfig;
use drivehealth_agent::run::run_once;
use drivehealth_agent::sink::JsonFileSink;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drivehealth_agent=info,drivehealth_core=info")),
        )
        .init();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Health check aborted: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<u8> {
    info!("Drive Health Monitor starting...");

    let config = MonitorConfig::load().await.context("Failed to load configuration")?;
    let policy = config.validate()?;

    info!("Temperature threshold: {}°C", policy.temperature_limit_celsius());
    info!("Usage threshold: {:.1}%", policy.usage_limit_fraction() * 100.0);

    let smart_targets = if !config.smart.enabled {
        SmartTargets::Disabled
    } else if config.smart.devices.is_empty() {
        SmartTargets::Discovered
    } else {
        SmartTargets::Devices(config.smart.devices.clone())
    };

    let collector = Collector::new(
        SysinfoUsageAdapter,
        SysinfoTemperatureAdapter::new(&config.collection.sensor_keywords),
        SmartctlAdapter::new(config.smart.smartctl_path.clone(), config.smart.timeout()),
        smart_targets,
        config.collection.adapter_timeout(),
    );
    let sink = JsonFileSink::new(config.report.output_dir.clone());
    let alerter = config.alert.clone().map(EmailAlerter::new);

    let outcome = run_once(
        &collector,
        &policy,
        &sink,
        alerter.as_ref().map(|a| a as &dyn AlertDispatcher),
    )
    .await;

    info!("Health check complete");
    Ok(outcome.exit_code())
}
