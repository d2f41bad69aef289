//! Cron scheduler for periodic sweeps.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use healthbridge_core::error::AppError;

use crate::executor::{JobExecutor, JobRequest};

/// Cron-based scheduler that fires sweep jobs through the executor.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Dispatches jobs to their handlers.
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register all default scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        // Expiry alerts — every day at 8 AM.
        self.register("expiry_check", "0 0 8 * * *").await?;
        // Expired-donation cleanup — every day at 2 AM.
        self.register("expired_cleanup", "0 0 2 * * *").await?;
        // Notification trim — every day at 3 AM.
        self.register("notification_trim", "0 0 3 * * *").await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Register one cron entry that dispatches `job_type` through the
    /// executor with an empty payload (handlers fall back to configured
    /// defaults).
    async fn register(&self, job_type: &'static str, schedule: &str) -> Result<(), AppError> {
        let executor = Arc::clone(&self.executor);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            Box::pin(async move {
                tracing::debug!(job_type, "Dispatching scheduled job");
                let request = JobRequest::new(job_type);
                if let Err(e) = executor.execute(&request).await {
                    tracing::error!(job_type, error = %e, "Scheduled job failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create {job_type} schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {job_type} schedule: {e}")))?;

        tracing::info!(job_type, schedule, "Registered scheduled task");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
