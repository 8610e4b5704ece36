//! Report persistence
//!
//! Writes each `HealthReport` as pretty-printed JSON to a timestamp-named file.
//! Failures are returned to the caller, never swallowed.

use drivehealth_core::HealthReport;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to serialize health report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write health report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// JSON file sink rooted at an output directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    output_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist the report, returning the path of the written record.
    pub async fn persist(&self, report: &HealthReport) -> Result<PathBuf, SinkError> {
        let payload = serde_json::to_string_pretty(report)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| SinkError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(report.record_name());
        let io_error = |source: std::io::Error| SinkError::Io {
            path: path.clone(),
            source,
        };

        // An existing record from a run in the same second is never overwritten
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(io_error)?;
        file.write_all(payload.as_bytes()).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;

        info!("Results saved to {}", path.display());
        Ok(path)
    }
}
