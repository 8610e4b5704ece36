//! Health report produced by one evaluation pass
//!
//! The report is the persisted record and the alert payload. `overall_healthy`
//! is derived from the findings when the report is assembled and cannot be set
//! independently.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Finding, Severity};
use crate::policy::ThresholdPolicy;

/// Limits that were active when the report was produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdsUsed {
    pub temperature_limit_celsius: f64,
    pub usage_limit_fraction: f64,
}

impl From<&ThresholdPolicy> for ThresholdsUsed {
    fn from(policy: &ThresholdPolicy) -> Self {
        Self {
            temperature_limit_celsius: policy.temperature_limit_celsius(),
            usage_limit_fraction: policy.usage_limit_fraction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    timestamp: DateTime<Utc>,
    thresholds: ThresholdsUsed,
    findings: Vec<Finding>,
    overall_healthy: bool,
}

impl HealthReport {
    /// Assemble a report; health is true iff no finding is WARNING or CRITICAL.
    pub fn assemble(timestamp: DateTime<Utc>, thresholds: ThresholdsUsed, findings: Vec<Finding>) -> Self {
        let overall_healthy = !findings.iter().any(|f| f.severity.is_issue());
        Self {
            timestamp,
            thresholds,
            findings,
            overall_healthy,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn thresholds(&self) -> &ThresholdsUsed {
        &self.thresholds
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn overall_healthy(&self) -> bool {
        self.overall_healthy
    }

    /// Findings with severity WARNING or CRITICAL, in report order.
    pub fn issues(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity.is_issue())
    }

    pub fn issue_count(&self) -> usize {
        self.issues().count()
    }

    /// Highest severity present, `Ok` for an empty report.
    pub fn worst_severity(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    /// Timestamp-derived file name for the persisted record.
    pub fn record_name(&self) -> String {
        format!("drive_health_{}.json", self.timestamp.format("%Y%m%d_%H%M%S"))
    }

    /// One line per finding followed by the verdict.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .findings
            .iter()
            .map(|f| format!("[{}] {} {}: {}", f.severity.label(), f.category.label(), f.subject, f.message))
            .collect();

        if self.overall_healthy {
            lines.push("All drives healthy".to_string());
        } else {
            lines.push(format!("{} issue(s) found", self.issue_count()));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::TimeZone;
    use rand::Rng;

    fn finding(severity: Severity) -> Finding {
        Finding {
            category: Category::Usage,
            subject: "/dev/sda1".to_string(),
            severity,
            message: "test".to_string(),
            metric_value: Some(0.5),
        }
    }

    fn thresholds() -> ThresholdsUsed {
        ThresholdsUsed::from(&ThresholdPolicy::default())
    }

    #[test]
    fn test_empty_report_is_healthy() {
        let report = HealthReport::assemble(Utc::now(), thresholds(), Vec::new());
        assert!(report.overall_healthy());
        assert_eq!(report.worst_severity(), Severity::Ok);
        assert_eq!(report.issue_count(), 0);
    }

    #[test]
    fn test_overall_health_property() {
        let severities = [Severity::Ok, Severity::Warning, Severity::Critical];
        let mut rng = rand::thread_rng();

        for _ in 0..1_000 {
            let count = rng.gen_range(0..12);
            let findings: Vec<Finding> = (0..count)
                .map(|_| finding(severities[rng.gen_range(0..severities.len())]))
                .collect();
            let any_issue = findings
                .iter()
                .any(|f| f.severity == Severity::Warning || f.severity == Severity::Critical);

            let report = HealthReport::assemble(Utc::now(), thresholds(), findings);
            assert_eq!(report.overall_healthy(), !any_issue);
        }
    }

    #[test]
    fn test_worst_severity_and_issues() {
        let report = HealthReport::assemble(
            Utc::now(),
            thresholds(),
            vec![finding(Severity::Ok), finding(Severity::Critical), finding(Severity::Warning)],
        );
        assert_eq!(report.worst_severity(), Severity::Critical);
        let issues: Vec<Severity> = report.issues().map(|f| f.severity).collect();
        assert_eq!(issues, vec![Severity::Critical, Severity::Warning]);
    }

    #[test]
    fn test_record_name_uses_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap();
        let report = HealthReport::assemble(ts, thresholds(), Vec::new());
        assert_eq!(report.record_name(), "drive_health_20260307_140509.json");
    }

    #[test]
    fn test_serialized_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap();
        let report = HealthReport::assemble(ts, thresholds(), vec![finding(Severity::Warning)]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["overall_healthy"], false);
        assert_eq!(json["thresholds"]["temperature_limit_celsius"], 75.0);
        assert_eq!(json["thresholds"]["usage_limit_fraction"], 0.85);
        assert_eq!(json["findings"][0]["category"], "USAGE");
        assert_eq!(json["findings"][0]["severity"], "WARNING");
        assert_eq!(json["findings"][0]["subject"], "/dev/sda1");
        assert_eq!(json["findings"][0]["metric_value"], 0.5);
        assert!(json["timestamp"].as_str().unwrap().starts_with("2026-03-07T14:05:09"));
    }

    #[test]
    fn test_summary_lines() {
        let report = HealthReport::assemble(Utc::now(), thresholds(), vec![finding(Severity::Critical)]);
        let lines = report.summary_lines();
        assert_eq!(lines[0], "[CRITICAL] USAGE /dev/sda1: test");
        assert_eq!(lines[1], "1 issue(s) found");
    }
}
