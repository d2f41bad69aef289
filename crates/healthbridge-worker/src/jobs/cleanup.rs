//! Expired-donation cleanup job handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use healthbridge_service::expiry::{CleanupSweep, CleanupSweepOptions};

use crate::executor::{JobExecutionError, JobHandler, JobRequest};

/// Runs the expired-donation cleanup sweep on schedule.
#[derive(Debug)]
pub struct ExpiredCleanupHandler {
    /// The cleanup sweep.
    sweep: Arc<CleanupSweep>,
    /// Default grace period in days past expiry.
    default_days_past_expiry: i64,
}

impl ExpiredCleanupHandler {
    /// Create a new cleanup handler.
    pub fn new(sweep: Arc<CleanupSweep>, default_days_past_expiry: i64) -> Self {
        Self {
            sweep,
            default_days_past_expiry,
        }
    }
}

#[async_trait]
impl JobHandler for ExpiredCleanupHandler {
    fn job_type(&self) -> &str {
        "expired_cleanup"
    }

    async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let options = CleanupSweepOptions {
            days_past_expiry: job
                .payload
                .get("days_past_expiry")
                .and_then(Value::as_i64)
                .unwrap_or(self.default_days_past_expiry),
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
        };

        let report = self
            .sweep
            .run(options)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Cleanup sweep failed: {e}")))?;

        tracing::info!(
            deleted = report.donations_deleted,
            requests_cancelled = report.requests_cancelled,
            "Scheduled cleanup sweep completed"
        );

        Ok(Some(serde_json::json!({
            "task": "expired_cleanup",
            "examined": report.examined,
            "donations_deleted": report.donations_deleted,
            "requests_cancelled": report.requests_cancelled,
            "image_failures": report.image_failures,
            "failures": report.failures,
        })))
    }
}
