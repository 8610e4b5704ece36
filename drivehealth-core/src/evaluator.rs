//! Health evaluator
//!
//! Pure aggregation of collected readings into a `HealthReport`:
//! 1. USAGE findings, one per volume (OK findings are kept for the audit trail)
//! 2. TEMPERATURE findings, one per reading; an absent or empty source adds nothing
//! 3. SMART findings, one per verdict: PASSED -> OK, FAILED -> CRITICAL, UNKNOWN -> WARNING
//!
//! Findings keep that category order and the supplied order within each category.

use chrono::{DateTime, Utc};

use crate::model::{
    Category, Finding, Readings, Severity, SmartStatus, SmartVerdict, SourceOutcome,
    TemperatureReading, VolumeUsage,
};
use crate::policy::ThresholdPolicy;
use crate::report::{HealthReport, ThresholdsUsed};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Evaluate readings against a policy, stamping the report with the current time.
pub fn evaluate(readings: &Readings, policy: &ThresholdPolicy) -> HealthReport {
    evaluate_at(readings, policy, Utc::now())
}

/// Evaluate readings with an explicit timestamp.
pub fn evaluate_at(readings: &Readings, policy: &ThresholdPolicy, timestamp: DateTime<Utc>) -> HealthReport {
    let mut findings = Vec::new();

    if let SourceOutcome::Available(volumes) = &readings.usage {
        findings.extend(volumes.iter().map(|v| usage_finding(v, policy)));
    }

    if let SourceOutcome::Available(temperatures) = &readings.temperatures {
        findings.extend(temperatures.iter().map(|t| temperature_finding(t, policy)));
    }

    for outcome in &readings.smart {
        match outcome {
            SourceOutcome::Available(verdict) => findings.push(smart_finding(verdict)),
            SourceOutcome::Unavailable { .. } => {}
        }
    }

    HealthReport::assemble(timestamp, ThresholdsUsed::from(policy), findings)
}

fn usage_finding(volume: &VolumeUsage, policy: &ThresholdPolicy) -> Finding {
    let fraction = volume.used_fraction();
    let severity = policy.classify_usage(fraction);
    let free_gb = volume.free_bytes() as f64 / BYTES_PER_GB;

    let message = match severity {
        Severity::Ok => format!("{:.1}% used ({:.2} GB free)", fraction * 100.0, free_gb),
        _ => format!(
            "{:.1}% full, {:.2} GB free (threshold: {:.1}%)",
            fraction * 100.0,
            free_gb,
            policy.usage_limit_fraction() * 100.0
        ),
    };

    Finding {
        category: Category::Usage,
        subject: volume.device().to_string(),
        severity,
        message,
        metric_value: Some(fraction),
    }
}

fn temperature_finding(reading: &TemperatureReading, policy: &ThresholdPolicy) -> Finding {
    let celsius = reading.celsius();
    let severity = policy.classify_temperature(celsius);

    let message = match severity {
        Severity::Ok => format!("{celsius:.1}°C"),
        _ => format!(
            "temperature {celsius:.1}°C (threshold: {:.1}°C)",
            policy.temperature_limit_celsius()
        ),
    };

    Finding {
        category: Category::Temperature,
        subject: reading.sensor().to_string(),
        severity,
        message,
        metric_value: Some(celsius),
    }
}

fn smart_finding(verdict: &SmartVerdict) -> Finding {
    let (severity, mut message) = match verdict.status {
        SmartStatus::Passed => (Severity::Ok, "SMART status PASSED".to_string()),
        SmartStatus::Failed => (
            Severity::Critical,
            "SMART status FAILED - drive may be failing".to_string(),
        ),
        SmartStatus::Unknown => (Severity::Warning, "SMART status UNKNOWN".to_string()),
    };

    if let Some(detail) = &verdict.detail {
        message.push_str(&format!(" ({detail})"));
    }

    Finding {
        category: Category::Smart,
        subject: verdict.device.clone(),
        severity,
        message,
        metric_value: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn volume(device: &str, fraction: f64) -> VolumeUsage {
        VolumeUsage::new(device, device, fraction, 50 * 1024 * 1024 * 1024, 100 * 1024 * 1024 * 1024).unwrap()
    }

    fn temp(sensor: &str, celsius: f64) -> TemperatureReading {
        TemperatureReading::new(sensor, celsius).unwrap()
    }

    fn policy() -> ThresholdPolicy {
        ThresholdPolicy::new(75.0, 0.85).unwrap()
    }

    fn severities(report: &HealthReport, category: Category) -> Vec<Severity> {
        report
            .findings()
            .iter()
            .filter(|f| f.category == category)
            .map(|f| f.severity)
            .collect()
    }

    #[test]
    fn test_usage_findings() {
        let readings = Readings {
            usage: SourceOutcome::Available(vec![
                volume("C:", 0.452),
                volume("D:", 0.90),
                volume("E:", 0.96),
            ]),
            ..Readings::default()
        };

        let report = evaluate(&readings, &policy());
        assert_eq!(
            severities(&report, Category::Usage),
            vec![Severity::Ok, Severity::Warning, Severity::Critical]
        );
        assert_eq!(report.findings()[0].metric_value, Some(0.452));
        assert_eq!(report.findings()[0].message, "45.2% used (50.00 GB free)");
        assert!(report.findings()[1].message.contains("threshold: 85.0%"));
        assert!(!report.overall_healthy());
    }

    #[test]
    fn test_temperature_findings() {
        let readings = Readings {
            temperatures: SourceOutcome::Available(vec![
                temp("nvme Composite", 42.0),
                temp("nvme Sensor 1", 80.0),
                temp("nvme Sensor 2", 90.0),
            ]),
            ..Readings::default()
        };

        let report = evaluate(&readings, &policy());
        assert_eq!(
            severities(&report, Category::Temperature),
            vec![Severity::Ok, Severity::Warning, Severity::Critical]
        );
        assert_eq!(report.findings()[1].metric_value, Some(80.0));
    }

    #[test]
    fn test_smart_findings() {
        let readings = Readings {
            smart: vec![
                SourceOutcome::Available(SmartVerdict::passed("/dev/nvme0n1")),
                SourceOutcome::Available(SmartVerdict::failed("/dev/sda")),
                SourceOutcome::Available(SmartVerdict::unknown("/dev/sdb", "smartctl not found")),
            ],
            ..Readings::default()
        };

        let report = evaluate(&readings, &policy());
        assert_eq!(
            severities(&report, Category::Smart),
            vec![Severity::Ok, Severity::Critical, Severity::Warning]
        );
        assert_eq!(report.findings()[0].subject, "/dev/nvme0n1");
        assert_eq!(report.findings()[2].message, "SMART status UNKNOWN (smartctl not found)");
        assert_eq!(report.findings()[2].metric_value, None);
        assert!(!report.overall_healthy());
    }

    #[test]
    fn test_smart_failed_makes_report_unhealthy() {
        let readings = Readings {
            smart: vec![SourceOutcome::Available(SmartVerdict::failed("/dev/nvme0n1"))],
            ..Readings::default()
        };
        let report = evaluate(&readings, &policy());
        assert_eq!(report.findings()[0].severity, Severity::Critical);
        assert!(!report.overall_healthy());
    }

    #[test]
    fn test_unavailable_sources_produce_no_findings() {
        let readings = Readings {
            usage: SourceOutcome::unavailable("volume enumeration failed"),
            temperatures: SourceOutcome::unavailable("unsupported platform"),
            smart: vec![SourceOutcome::unavailable("timed out after 30s")],
        };

        let report = evaluate(&readings, &policy());
        assert!(report.findings().is_empty());
        assert!(report.overall_healthy());
    }

    #[test]
    fn test_empty_temperatures_do_not_affect_health() {
        let with_empty = Readings {
            usage: SourceOutcome::Available(vec![volume("C:", 0.3)]),
            temperatures: SourceOutcome::Available(Vec::new()),
            smart: vec![SourceOutcome::Available(SmartVerdict::passed("/dev/sda"))],
        };

        let report = evaluate(&with_empty, &policy());
        assert!(severities(&report, Category::Temperature).is_empty());
        assert!(report.overall_healthy());
    }

    #[test]
    fn test_findings_order_is_stable() {
        let readings = Readings {
            usage: SourceOutcome::Available(vec![volume("/dev/sdb1", 0.1), volume("/dev/sda1", 0.2)]),
            temperatures: SourceOutcome::Available(vec![temp("nvme", 40.0)]),
            smart: vec![
                SourceOutcome::Available(SmartVerdict::passed("/dev/sdb")),
                SourceOutcome::unavailable("busy"),
                SourceOutcome::Available(SmartVerdict::passed("/dev/sda")),
            ],
        };

        let report = evaluate(&readings, &policy());
        let order: Vec<(Category, &str)> = report
            .findings()
            .iter()
            .map(|f| (f.category, f.subject.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Category::Usage, "/dev/sdb1"),
                (Category::Usage, "/dev/sda1"),
                (Category::Temperature, "nvme"),
                (Category::Smart, "/dev/sdb"),
                (Category::Smart, "/dev/sda"),
            ]
        );
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let readings = Readings {
            usage: SourceOutcome::Available(vec![volume("C:", 0.88)]),
            temperatures: SourceOutcome::Available(vec![temp("ssd", 77.0)]),
            smart: vec![SourceOutcome::Available(SmartVerdict::unknown("/dev/sda", "parse failure"))],
        };

        let first = evaluate(&readings, &policy());
        let second = evaluate(&readings, &policy());
        assert_eq!(first.findings(), second.findings());
        assert_eq!(first.overall_healthy(), second.overall_healthy());
    }

    #[test]
    fn test_all_sources_healthy_end_to_end() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let readings = Readings {
            usage: SourceOutcome::Available(vec![volume("C:", 0.452), volume("D:", 0.6)]),
            temperatures: SourceOutcome::Available(vec![temp("nvme Composite", 38.0)]),
            smart: vec![
                SourceOutcome::Available(SmartVerdict::passed("/dev/sda")),
                SourceOutcome::Available(SmartVerdict::passed("/dev/sdb")),
            ],
        };

        let report = evaluate_at(&readings, &policy(), ts);
        assert!(report.overall_healthy());
        assert_eq!(report.findings().len(), 5);
        assert!(report.findings().iter().all(|f| f.severity == Severity::Ok));
        assert_eq!(report.timestamp(), ts);
        assert_eq!(report.thresholds().temperature_limit_celsius, 75.0);
        assert_eq!(report.thresholds().usage_limit_fraction, 0.85);
    }
}
