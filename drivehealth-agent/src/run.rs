//! One health check pass: collect, evaluate, persist, alert

use drivehealth_core::{evaluate, HealthReport, Severity, ThresholdPolicy};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::adapters::{SmartAdapter, TemperatureAdapter, UsageAdapter};
use crate::alert::{AlertDispatcher, AlertError};
use crate::collector::Collector;
use crate::sink::{JsonFileSink, SinkError};

/// What happened to the alert for this run.
#[derive(Debug)]
pub enum AlertOutcome {
    /// Report was healthy; nothing to send.
    NotNeeded,
    /// Report was unhealthy but no dispatcher is configured.
    NotConfigured,
    Sent,
    Failed(AlertError),
}

/// Result of a run. The report is always present, whatever happened downstream.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: HealthReport,
    pub record_path: Result<PathBuf, SinkError>,
    pub alert: AlertOutcome,
}

impl RunOutcome {
    /// Process exit code: 0 healthy, 1 unhealthy, 2 report not persisted.
    pub fn exit_code(&self) -> u8 {
        if self.record_path.is_err() {
            2
        } else if self.report.overall_healthy() {
            0
        } else {
            1
        }
    }
}

pub async fn run_once<U, T, S>(
    collector: &Collector<U, T, S>,
    policy: &ThresholdPolicy,
    sink: &JsonFileSink,
    alerter: Option<&dyn AlertDispatcher>,
) -> RunOutcome
where
    U: UsageAdapter,
    T: TemperatureAdapter,
    S: SmartAdapter,
{
    info!("Starting drive health check...");
    let readings = collector.collect().await;
    let report = evaluate(&readings, policy);

    for finding in report.findings() {
        let line = format!("{} {}: {}", finding.category.label(), finding.subject, finding.message);
        match finding.severity {
            Severity::Ok => info!("[OK] {}", line),
            Severity::Warning => warn!("[WARNING] {}", line),
            Severity::Critical => error!("[CRITICAL] {}", line),
        }
    }

    if report.overall_healthy() {
        info!("All drives healthy ({} findings)", report.findings().len());
    } else {
        warn!("{} issue(s) found", report.issue_count());
    }

    let record_path = sink.persist(&report).await;
    if let Err(e) = &record_path {
        error!("Could not save health report: {}", e);
    }

    let alert = if report.overall_healthy() {
        info!("No alerts to send - all drives healthy");
        AlertOutcome::NotNeeded
    } else {
        match alerter {
            None => {
                warn!("Report is unhealthy but alerting is not configured");
                AlertOutcome::NotConfigured
            }
            Some(dispatcher) => match dispatcher.dispatch(&report).await {
                Ok(()) => AlertOutcome::Sent,
                Err(e) => {
                    error!("Failed to send alert: {}", e);
                    AlertOutcome::Failed(e)
                }
            },
        }
    };

    RunOutcome {
        report,
        record_path,
        alert,
    }
}
