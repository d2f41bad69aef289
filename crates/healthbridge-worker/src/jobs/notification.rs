//! Notification retention job handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tracing;

use healthbridge_database::repositories::notification::NotificationRepository;

use crate::executor::{JobExecutionError, JobHandler, JobRequest};

/// Trims notifications past the retention window.
#[derive(Debug)]
pub struct NotificationTrimHandler {
    /// Notification repository.
    notification_repo: Arc<NotificationRepository>,
    /// Retention window in days.
    retention_days: i64,
}

impl NotificationTrimHandler {
    /// Create a new notification trim handler.
    pub fn new(notification_repo: Arc<NotificationRepository>, retention_days: i64) -> Self {
        Self {
            notification_repo,
            retention_days,
        }
    }
}

#[async_trait]
impl JobHandler for NotificationTrimHandler {
    fn job_type(&self) -> &str {
        "notification_trim"
    }

    async fn execute(&self, _job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let before = Utc::now() - Duration::days(self.retention_days);

        let removed = self
            .notification_repo
            .cleanup_old(before)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Notification trim failed: {e}")))?;

        tracing::info!(removed, retention_days = self.retention_days, "Trimmed old notifications");

        Ok(Some(serde_json::json!({
            "task": "notification_trim",
            "removed": removed,
            "retention_days": self.retention_days,
        })))
    }
}
