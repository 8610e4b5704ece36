//! Alert dispatch for unhealthy reports
//!
//! [`EmailAlerter`] wraps the `lettre` async SMTP transport and sends a
//! plain-text summary built from the report's stored findings. Severities are
//! read, never recomputed, and the report is never modified.

use async_trait::async_trait;
use drivehealth_core::HealthReport;
use thiserror::Error;

use crate::config::AlertConfig;

#[derive(Debug, Error)]
pub enum AlertError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Sends a notification for a report.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn dispatch(&self, report: &HealthReport) -> Result<(), AlertError>;
}

/// Subject and body of an alert message.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// Format the human-readable alert for a report.
pub fn compose_alert(report: &HealthReport) -> AlertMessage {
    let issues: Vec<String> = report
        .issues()
        .map(|f| format!("[{}] {} {}: {}", f.severity.label(), f.category.label(), f.subject, f.message))
        .collect();

    let thresholds = report.thresholds();
    let body = format!(
        "Drive Health Monitor Alert - {}\n\n\
         The following issues were detected:\n\n\
         {}\n\n\
         Thresholds: temperature {:.1}°C, usage {:.1}%\n\n\
         Please investigate these issues as soon as possible.\n\n\
         --\n\
         Drive Health Monitor\n",
        report.timestamp().format("%Y-%m-%d %H:%M:%S UTC"),
        issues.join("\n"),
        thresholds.temperature_limit_celsius,
        thresholds.usage_limit_fraction * 100.0,
    );

    AlertMessage {
        subject: format!("Drive Health Alert - {} issues detected", issues.len()),
        body,
    }
}

/// Email alerts over SMTP with STARTTLS.
pub struct EmailAlerter {
    config: AlertConfig,
}

impl EmailAlerter {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AlertDispatcher for EmailAlerter {
    async fn dispatch(&self, report: &HealthReport) -> Result<(), AlertError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let alert = compose_alert(report);

        let email = Message::builder()
            .from(self.config.from.parse()?)
            .to(self.config.to.parse()?)
            .subject(alert.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body)
            .map_err(|e| AlertError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => {
                transport_builder = transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
            }
            (None, Some(_)) => {
                tracing::warn!("SMTP password is set but no username is configured; sending unauthenticated");
            }
            _ => {}
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = %self.config.to, "Alert email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use drivehealth_core::{
        evaluate_at, Readings, SmartVerdict, SourceOutcome, TemperatureReading, ThresholdPolicy,
        VolumeUsage,
    };

    fn unhealthy_report() -> HealthReport {
        let readings = Readings {
            usage: SourceOutcome::Available(vec![
                VolumeUsage::new("C:", "C:\\", 0.40, 600, 1_000).unwrap(),
                VolumeUsage::new("D:", "D:\\", 0.90, 100, 1_000).unwrap(),
            ]),
            temperatures: SourceOutcome::Available(vec![TemperatureReading::new("nvme Composite", 91.0).unwrap()]),
            smart: vec![SourceOutcome::Available(SmartVerdict::passed("/dev/sdc"))],
        };
        let ts = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        evaluate_at(&readings, &ThresholdPolicy::default(), ts)
    }

    #[test]
    fn test_compose_lists_only_issues() {
        let alert = compose_alert(&unhealthy_report());
        assert_eq!(alert.subject, "Drive Health Alert - 2 issues detected");
        assert!(alert.body.contains("2026-02-03 04:05:06 UTC"));
        assert!(alert.body.contains("[WARNING] USAGE D:"));
        assert!(alert.body.contains("[CRITICAL] TEMPERATURE nvme Composite"));
        assert!(!alert.body.contains("USAGE C:"));
        assert!(!alert.body.contains("/dev/sdc"));
        assert!(alert.body.contains("temperature 75.0°C, usage 85.0%"));
    }

    #[test]
    fn test_compose_does_not_alter_report() {
        let report = unhealthy_report();
        let before = report.clone();
        let _ = compose_alert(&report);
        assert_eq!(report, before);
    }

    #[tokio::test]
    async fn test_invalid_sender_address_is_reported() {
        let alerter = EmailAlerter::new(AlertConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            from: "not-an-email".to_string(),
            to: "admin@example.com".to_string(),
            username: None,
            password: None,
        });

        let err = alerter.dispatch(&unhealthy_report()).await.unwrap_err();
        assert!(matches!(err, AlertError::Address(_)));
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[test]
    fn test_error_display_build() {
        let err = AlertError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
