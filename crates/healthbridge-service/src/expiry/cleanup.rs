//! Expired-donation cleanup sweep.
//!
//! Destructive pass over donations past their expiry cutoff. Each
//! donation's cascade runs in a fixed order: cancel referencing requests
//! (notifying recipients first), delete the image blob, notify the donor,
//! delete the donation row. Every side effect is independently
//! best-effort — a failed image delete or notification never aborts the
//! row deletion, and a failed donation skips to the next one.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use healthbridge_core::error::AppError;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_storage::manager::StorageManager;

use crate::notification::Notifier;

/// Options for one cleanup-sweep run.
#[derive(Debug, Clone)]
pub struct CleanupSweepOptions {
    /// Remove donations expired for more than this many days.
    pub days_past_expiry: i64,
    /// Report what would be deleted without deleting.
    pub dry_run: bool,
    /// Remove all expired donations regardless of how long ago.
    pub force: bool,
}

impl Default for CleanupSweepOptions {
    fn default() -> Self {
        Self {
            days_past_expiry: 7,
            dry_run: false,
            force: false,
        }
    }
}

/// Outcome of one cleanup-sweep run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupSweepReport {
    /// Expired donations examined.
    pub examined: u64,
    /// Donation rows deleted (or, in a dry run, that would be).
    pub donations_deleted: u64,
    /// Matched requests cancelled alongside their donations.
    pub requests_cancelled: u64,
    /// Image blobs that failed to delete.
    pub image_failures: u64,
    /// Donations skipped because their row deletion failed.
    pub failures: u64,
}

/// Removes long-expired donations with cascading cleanup.
#[derive(Debug, Clone)]
pub struct CleanupSweep {
    /// Donation repository.
    donation_repo: Arc<DonationRepository>,
    /// Request repository.
    request_repo: Arc<RequestRepository>,
    /// Image blob storage.
    storage: Arc<StorageManager>,
    /// Notification sink.
    notifier: Arc<Notifier>,
}

impl CleanupSweep {
    /// Creates a new cleanup sweep.
    pub fn new(
        donation_repo: Arc<DonationRepository>,
        request_repo: Arc<RequestRepository>,
        storage: Arc<StorageManager>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            donation_repo,
            request_repo,
            storage,
            notifier,
        }
    }

    /// Runs the sweep relative to today.
    pub async fn run(&self, options: CleanupSweepOptions) -> Result<CleanupSweepReport, AppError> {
        self.run_at(Utc::now().date_naive(), options).await
    }

    /// Runs the sweep relative to an explicit date.
    pub async fn run_at(
        &self,
        today: NaiveDate,
        options: CleanupSweepOptions,
    ) -> Result<CleanupSweepReport, AppError> {
        let cutoff = if options.force {
            today
        } else {
            today - Duration::days(options.days_past_expiry)
        };

        let expired = self.donation_repo.find_expired_before(cutoff).await?;

        info!(
            %cutoff,
            count = expired.len(),
            dry_run = options.dry_run,
            force = options.force,
            "Expired donation cleanup started"
        );

        let mut report = CleanupSweepReport::default();

        for donation in &expired {
            report.examined += 1;
            let days_expired = (today - donation.expiry_date).num_days();

            let related = match self.request_repo.find_by_matched_donation(donation.id).await {
                Ok(r) => r,
                Err(e) => {
                    error!(
                        donation_id = %donation.id,
                        error = %e,
                        "Failed to load related requests; skipping donation"
                    );
                    report.failures += 1;
                    continue;
                }
            };

            if options.dry_run {
                info!(
                    donation_id = %donation.id,
                    tracking_code = %donation.tracking_code,
                    days_expired,
                    related_requests = related.len(),
                    "[dry run] Would delete expired donation"
                );
                report.donations_deleted += 1;
                report.requests_cancelled += related.len() as u64;
                continue;
            }

            // 1. Cancel requests still referencing this donation,
            //    notifying each recipient first.
            for request in &related {
                self.notifier
                    .request_cancelled_expired(request, donation)
                    .await;
                match self.request_repo.delete(request.id).await {
                    Ok(_) => report.requests_cancelled += 1,
                    Err(e) => warn!(
                        request_id = %request.id,
                        error = %e,
                        "Failed to delete request matched to expired donation"
                    ),
                }
            }

            // 2. Image blob, best-effort.
            if let Err(e) = self.storage.delete_image(&donation.image_path).await {
                warn!(
                    donation_id = %donation.id,
                    error = %e,
                    "Failed to delete image of expired donation"
                );
                report.image_failures += 1;
            }

            // 3. Donor notification, best-effort.
            self.notifier
                .expired_donation_removed(donation, days_expired)
                .await;

            // 4. The donation row itself.
            match self.donation_repo.delete(donation.id).await {
                Ok(_) => {
                    info!(
                        donation_id = %donation.id,
                        tracking_code = %donation.tracking_code,
                        days_expired,
                        "Expired donation removed"
                    );
                    report.donations_deleted += 1;
                }
                Err(e) => {
                    error!(
                        donation_id = %donation.id,
                        error = %e,
                        "Failed to delete expired donation"
                    );
                    report.failures += 1;
                }
            }
        }

        info!(
            examined = report.examined,
            deleted = report.donations_deleted,
            requests_cancelled = report.requests_cancelled,
            failures = report.failures,
            "Expired donation cleanup finished"
        );

        Ok(report)
    }
}
