//! Expiry-alert CLI command.

use std::sync::Arc;

use clap::Args;

use healthbridge_core::error::AppError;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::expiry_alert::ExpiryAlertRepository;
use healthbridge_database::repositories::notification::NotificationRepository;
use healthbridge_database::repositories::user::UserRepository;
use healthbridge_service::expiry::{AlertSweep, AlertSweepOptions};
use healthbridge_service::notification::Notifier;

use crate::output::{self, OutputFormat};

/// Arguments for the check-expiry command.
#[derive(Debug, Args)]
pub struct CheckExpiryArgs {
    /// Number of days before expiry to send alerts
    #[arg(long, default_value_t = 10)]
    pub days: i64,

    /// Show what would be done without sending alerts
    #[arg(long)]
    pub dry_run: bool,

    /// Send alerts even if already sent (ignore duplicates)
    #[arg(long)]
    pub force: bool,

    /// Only alert for medicines expiring in 3 days or less
    #[arg(long)]
    pub critical_only: bool,
}

/// Run the expiry-alert sweep once.
pub async fn execute(
    args: &CheckExpiryArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    let donation_repo = Arc::new(DonationRepository::new(pool.clone()));
    let alert_repo = Arc::new(ExpiryAlertRepository::new(pool.clone()));
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let notifier = Arc::new(Notifier::new(Arc::new(NotificationRepository::new(
        pool.clone(),
    ))));

    let sweep = AlertSweep::new(donation_repo, alert_repo, user_repo, notifier);
    let report = sweep
        .run(AlertSweepOptions {
            days: args.days,
            dry_run: args.dry_run,
            force: args.force,
            critical_only: args.critical_only,
        })
        .await?;

    match format {
        OutputFormat::Json => output::print_item(&report, format),
        OutputFormat::Table => {
            if args.dry_run {
                println!(
                    "Dry run completed. Would have sent {} notifications.",
                    report.alerts_sent
                );
            } else {
                println!(
                    "Successfully sent {} expiry notifications.",
                    report.alerts_sent
                );
            }
            output::print_kv("Window (days)", &report.window_days.to_string());
            output::print_kv("Donations scanned", &report.scanned.to_string());
            output::print_kv("Duplicates skipped", &report.skipped_duplicates.to_string());
        }
    }

    Ok(())
}
