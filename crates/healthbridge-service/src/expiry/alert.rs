//! Expiry-alert sweep.
//!
//! Scans for donations expiring within a window and alerts each donor,
//! deduplicated through the alert ledger so that re-running the sweep on
//! the same day never double-notifies.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use healthbridge_core::error::AppError;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::expiry_alert::ExpiryAlertRepository;
use healthbridge_database::repositories::user::UserRepository;

use crate::notification::Notifier;

/// Ledger channel tag for in-app alerts.
const ALERT_TYPE: &str = "in_app";
/// The critical-only mode caps the window at this many days.
const CRITICAL_WINDOW_DAYS: i64 = 3;

/// Options for one alert-sweep run.
#[derive(Debug, Clone)]
pub struct AlertSweepOptions {
    /// Alert on donations expiring within this many days.
    pub days: i64,
    /// Report what would be sent without recording or notifying.
    pub dry_run: bool,
    /// Send even when the ledger already has an entry.
    pub force: bool,
    /// Cap the window at three days.
    pub critical_only: bool,
}

impl Default for AlertSweepOptions {
    fn default() -> Self {
        Self {
            days: 10,
            dry_run: false,
            force: false,
            critical_only: false,
        }
    }
}

/// Outcome of one alert-sweep run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertSweepReport {
    /// Effective window in days after the critical-only cap.
    pub window_days: i64,
    /// Donations examined.
    pub scanned: u64,
    /// Alerts sent (or, in a dry run, that would have been sent).
    pub alerts_sent: u64,
    /// Alerts suppressed by the deduplication ledger.
    pub skipped_duplicates: u64,
}

/// Scans for soon-to-expire donations and alerts donors.
#[derive(Debug, Clone)]
pub struct AlertSweep {
    /// Donation repository.
    donation_repo: Arc<DonationRepository>,
    /// Alert deduplication ledger.
    alert_repo: Arc<ExpiryAlertRepository>,
    /// User lookups for donor emails.
    user_repo: Arc<UserRepository>,
    /// Notification sink.
    notifier: Arc<Notifier>,
}

impl AlertSweep {
    /// Creates a new alert sweep.
    pub fn new(
        donation_repo: Arc<DonationRepository>,
        alert_repo: Arc<ExpiryAlertRepository>,
        user_repo: Arc<UserRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            donation_repo,
            alert_repo,
            user_repo,
            notifier,
        }
    }

    /// Runs the sweep relative to today.
    pub async fn run(&self, options: AlertSweepOptions) -> Result<AlertSweepReport, AppError> {
        self.run_at(Utc::now().date_naive(), options).await
    }

    /// Runs the sweep relative to an explicit date.
    pub async fn run_at(
        &self,
        today: NaiveDate,
        options: AlertSweepOptions,
    ) -> Result<AlertSweepReport, AppError> {
        let window_days = if options.critical_only {
            options.days.min(CRITICAL_WINDOW_DAYS)
        } else {
            options.days
        };

        let expiring = self
            .donation_repo
            .find_expiring_within(today, window_days)
            .await?;

        info!(
            window_days,
            count = expiring.len(),
            dry_run = options.dry_run,
            "Expiry alert sweep started"
        );

        let mut report = AlertSweepReport {
            window_days,
            ..AlertSweepReport::default()
        };

        for donation in &expiring {
            report.scanned += 1;

            let days_until_expiry = donation.days_until_expiry(today);
            if days_until_expiry < 0 {
                continue;
            }

            let Some(donor) = self.user_repo.find_by_id(donation.donor_id).await? else {
                warn!(donation_id = %donation.id, "Donor missing; skipping alert");
                continue;
            };

            let already_sent = self
                .alert_repo
                .exists(donation.id, days_until_expiry as i32, &donor.email)
                .await?;

            if already_sent && !options.force {
                report.skipped_duplicates += 1;
                continue;
            }

            if options.dry_run {
                info!(
                    donation_id = %donation.id,
                    days_until_expiry,
                    donor = %donor.email,
                    "[dry run] Would send expiry alert"
                );
                report.alerts_sent += 1;
                continue;
            }

            let recorded = self
                .alert_repo
                .record_if_absent(
                    donation.id,
                    days_until_expiry as i32,
                    &donor.email,
                    ALERT_TYPE,
                )
                .await?;

            // A concurrent sweep got there first; only force overrides.
            if !recorded && !options.force {
                report.skipped_duplicates += 1;
                continue;
            }

            let tier = donation.expiry_tier(today);
            self.notifier
                .medicine_expiring(donation, tier, days_until_expiry)
                .await;
            report.alerts_sent += 1;
        }

        info!(
            scanned = report.scanned,
            sent = report.alerts_sent,
            skipped = report.skipped_duplicates,
            "Expiry alert sweep finished"
        );

        Ok(report)
    }
}
