//! SMART health via `smartctl -a -j`
//!
//! The tool's JSON output is translated into a `SmartVerdict` here and nowhere
//! else. Anything indeterminate (tool missing, device busy, timeout, unparsable
//! output) becomes `UNKNOWN` with a reason, never `FAILED`.

use async_trait::async_trait;
use drivehealth_core::{SmartVerdict, SourceOutcome};
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use super::SmartAdapter;

// smartctl exit status bits
const EXIT_COMMAND_LINE_ERROR: i32 = 1 << 0;
const EXIT_DEVICE_OPEN_FAILED: i32 = 1 << 1;

#[derive(Debug, Default, Deserialize)]
struct SmartctlOutput {
    #[serde(default)]
    smartctl: SmartctlMeta,
    model_name: Option<String>,
    smart_status: Option<SmartctlStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct SmartctlMeta {
    #[serde(default)]
    messages: Vec<SmartctlMessage>,
}

#[derive(Debug, Deserialize)]
struct SmartctlMessage {
    string: String,
}

#[derive(Debug, Deserialize)]
struct SmartctlStatus {
    passed: Option<bool>,
}

/// SMART adapter that shells out to smartmontools.
#[derive(Debug, Clone)]
pub struct SmartctlAdapter {
    program: String,
    timeout: Duration,
}

impl SmartctlAdapter {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl SmartAdapter for SmartctlAdapter {
    async fn verdict(&self, device: &str) -> SourceOutcome<SmartVerdict> {
        debug!("Running {} -a -j {} (timeout: {:?})", self.program, device, self.timeout);

        let run = AsyncCommand::new(&self.program)
            .args(["-a", "-j", device])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let verdict = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => SmartVerdict::unknown(
                device,
                format!("smartctl timed out after {}s", self.timeout.as_secs()),
            ),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => SmartVerdict::unknown(
                device,
                format!("'{}' not found - install smartmontools", self.program),
            ),
            Ok(Err(e)) => SmartVerdict::unknown(device, format!("could not run smartctl: {e}")),
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                interpret_smartctl(device, output.status.code(), &stdout)
            }
        };

        SourceOutcome::Available(verdict)
    }
}

/// Translate smartctl's exit status and JSON output into a verdict.
pub fn interpret_smartctl(device: &str, exit_code: Option<i32>, stdout: &str) -> SmartVerdict {
    let parsed: Option<SmartctlOutput> = serde_json::from_str(stdout).ok();

    if let Some(code) = exit_code {
        if code & (EXIT_COMMAND_LINE_ERROR | EXIT_DEVICE_OPEN_FAILED) != 0 {
            let reason = parsed
                .as_ref()
                .and_then(|p| p.smartctl.messages.first())
                .map(|m| m.string.clone())
                .unwrap_or_else(|| format!("smartctl exited with status {code}; check privileges"));
            return SmartVerdict::unknown(device, reason);
        }
    }

    let Some(output) = parsed else {
        return SmartVerdict::unknown(device, "could not parse smartctl output");
    };

    let verdict = match output.smart_status.and_then(|s| s.passed) {
        Some(true) => SmartVerdict::passed(device),
        Some(false) => SmartVerdict::failed(device),
        None => return SmartVerdict::unknown(device, "no SMART status reported"),
    };

    match output.model_name {
        Some(model) => verdict.with_detail(model),
        None => verdict,
    }
}

/// Device path to hand to smartctl for a volume identifier.
///
/// Windows drive letters map onto smartctl's `/dev/sdX` naming (`C:` -> `/dev/sdc`).
pub fn smart_device_path(device: &str) -> String {
    let bytes = device.as_bytes();
    if bytes.len() == 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        let letter = bytes[0].to_ascii_lowercase();
        return format!("/dev/sd{}", letter as char);
    }
    device.to_string()
}
