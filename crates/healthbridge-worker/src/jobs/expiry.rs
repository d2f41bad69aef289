//! Expiry-alert job handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use healthbridge_service::expiry::{AlertSweep, AlertSweepOptions};

use crate::executor::{JobExecutionError, JobHandler, JobRequest};

/// Runs the expiry-alert sweep on schedule.
#[derive(Debug)]
pub struct ExpiryAlertHandler {
    /// The alert sweep.
    sweep: Arc<AlertSweep>,
    /// Default alert window in days.
    default_days: i64,
}

impl ExpiryAlertHandler {
    /// Create a new expiry alert handler.
    pub fn new(sweep: Arc<AlertSweep>, default_days: i64) -> Self {
        Self {
            sweep,
            default_days,
        }
    }
}

#[async_trait]
impl JobHandler for ExpiryAlertHandler {
    fn job_type(&self) -> &str {
        "expiry_check"
    }

    async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let options = AlertSweepOptions {
            days: job
                .payload
                .get("days")
                .and_then(Value::as_i64)
                .unwrap_or(self.default_days),
            dry_run: job
                .payload
                .get("dry_run")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            force: job
                .payload
                .get("force")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            critical_only: job
                .payload
                .get("critical_only")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        };

        let report = self
            .sweep
            .run(options)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Expiry sweep failed: {e}")))?;

        tracing::info!(
            sent = report.alerts_sent,
            skipped = report.skipped_duplicates,
            "Scheduled expiry alert sweep completed"
        );

        Ok(Some(serde_json::json!({
            "task": "expiry_check",
            "window_days": report.window_days,
            "scanned": report.scanned,
            "alerts_sent": report.alerts_sent,
            "skipped_duplicates": report.skipped_duplicates,
        })))
    }
}
