//! Expired-donation cleanup CLI command.

use std::sync::Arc;

use clap::Args;

use healthbridge_core::error::AppError;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::notification::NotificationRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_service::expiry::{CleanupSweep, CleanupSweepOptions};
use healthbridge_service::notification::Notifier;
use healthbridge_storage::manager::StorageManager;

use crate::output::{self, OutputFormat};

/// Arguments for the cleanup-expired command.
#[derive(Debug, Args)]
pub struct CleanupExpiredArgs {
    /// Delete donations expired for this many days
    #[arg(long, default_value_t = 7)]
    pub days_past_expiry: i64,

    /// Show what would be deleted without actually deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Delete all expired donations regardless of expiry date
    #[arg(long)]
    pub force: bool,
}

/// Run the cleanup sweep once.
pub async fn execute(
    args: &CleanupExpiredArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let storage = Arc::new(StorageManager::new(&config.storage).await?);

    let donation_repo = Arc::new(DonationRepository::new(pool.clone()));
    let request_repo = Arc::new(RequestRepository::new(pool.clone()));
    let notifier = Arc::new(Notifier::new(Arc::new(NotificationRepository::new(
        pool.clone(),
    ))));

    let sweep = CleanupSweep::new(donation_repo, request_repo, storage, notifier);
    let report = sweep
        .run(CleanupSweepOptions {
            days_past_expiry: args.days_past_expiry,
            dry_run: args.dry_run,
            force: args.force,
        })
        .await?;

    match format {
        OutputFormat::Json => output::print_item(&report, format),
        OutputFormat::Table => {
            if args.dry_run {
                println!(
                    "Dry run completed. Would have deleted {} donations.",
                    report.donations_deleted
                );
            } else {
                println!(
                    "Successfully cleaned up {} expired donations.",
                    report.donations_deleted
                );
            }
            output::print_kv("Examined", &report.examined.to_string());
            output::print_kv("Requests cancelled", &report.requests_cancelled.to_string());
            output::print_kv("Image failures", &report.image_failures.to_string());
            output::print_kv("Failures", &report.failures.to_string());
        }
    }

    Ok(())
}
