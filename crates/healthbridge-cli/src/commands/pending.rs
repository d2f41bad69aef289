//! Pending-review listing CLI command.

use serde::Serialize;
use tabled::Tabled;

use healthbridge_core::error::AppError;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::request::RequestRepository;

use crate::output::{self, OutputFormat};

/// Table row for a pending donation.
#[derive(Debug, Serialize, Tabled)]
struct PendingDonationRow {
    /// Tracking code.
    tracking: String,
    /// Medicine name.
    medicine: String,
    /// Units donated.
    quantity: i32,
    /// Expiry date.
    expiry: String,
    /// Submission date.
    submitted: String,
}

/// Table row for a pending request.
#[derive(Debug, Serialize, Tabled)]
struct PendingRequestRow {
    /// Tracking code.
    tracking: String,
    /// Medicine name.
    medicine: String,
    /// Units requested.
    quantity: String,
    /// Urgency level.
    urgency: String,
    /// Whether a donation is matched.
    matched: bool,
}

/// List pending donations and requests in review order.
pub async fn execute(env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    let donation_repo = DonationRepository::new(pool.clone());
    let request_repo = RequestRepository::new(pool);

    let donations: Vec<PendingDonationRow> = donation_repo
        .find_pending_review()
        .await?
        .into_iter()
        .map(|d| PendingDonationRow {
            tracking: d.tracking_code,
            medicine: d.name,
            quantity: d.quantity,
            expiry: d.expiry_date.to_string(),
            submitted: d.donated_at.date_naive().to_string(),
        })
        .collect();

    let requests: Vec<PendingRequestRow> = request_repo
        .find_pending_review()
        .await?
        .into_iter()
        .map(|r| PendingRequestRow {
            tracking: r.tracking_code,
            medicine: r.medicine_name,
            quantity: r.quantity,
            urgency: r.urgency.to_string(),
            matched: r.matched_donation_id.is_some(),
        })
        .collect();

    println!("Pending donations:");
    output::print_list(&donations, format);
    println!("\nPending requests (most urgent first):");
    output::print_list(&requests, format);

    Ok(())
}
