//! Medicine request entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::RequestStatus;
use super::urgency::Urgency;
use crate::donation::ApprovalStatus;
use healthbridge_core::{AppError, AppResult};

/// A recipient's ask for a quantity of a named medicine, optionally bound
/// to a specific donation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicineRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// Requested medicine name.
    pub medicine_name: String,
    /// Requested amount. Stored as text; semantically a positive integer.
    pub quantity: String,
    /// Urgency of the ask.
    pub urgency: Urgency,
    /// Free-text justification.
    pub reason: Option<String>,
    /// The requesting user.
    pub recipient_id: Uuid,
    /// The donation this request reserved, if any.
    pub matched_donation_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Admin review status.
    pub approval_status: ApprovalStatus,
    /// Date the recipient may pick the medicine up, set on approval.
    pub claim_ready_date: Option<NaiveDate>,
    /// Human-readable tracking code (e.g. `REQ-9B2XWQ4T`).
    pub tracking_code: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// The reviewing admin, once reviewed.
    pub reviewed_by: Option<Uuid>,
    /// When the review happened.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl MedicineRequest {
    /// Parse the requested quantity into an integer.
    ///
    /// The column is text for historical reasons; anything that is not a
    /// positive integer is a validation error.
    pub fn quantity_value(&self) -> AppResult<i32> {
        parse_quantity(&self.quantity)
    }

    /// Days elapsed since the request was created.
    pub fn days_since_request(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }
}

/// Parse a quantity string into a positive integer.
pub fn parse_quantity(raw: &str) -> AppResult<i32> {
    let value: i32 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("'{raw}' is not a valid quantity")))?;
    if value <= 0 {
        return Err(AppError::validation("Quantity must be positive"));
    }
    Ok(value)
}

/// Data required to create a new request record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Requested medicine name.
    pub medicine_name: String,
    /// Requested amount (text column).
    pub quantity: String,
    /// Urgency of the ask.
    pub urgency: Urgency,
    /// Free-text justification.
    pub reason: Option<String>,
    /// The requesting user.
    pub recipient_id: Uuid,
    /// Donation to bind, when matching succeeded.
    pub matched_donation_id: Option<Uuid>,
    /// Initial lifecycle status (`Matched` when bound, else `Pending`).
    pub status: RequestStatus,
    /// Pre-generated tracking code.
    pub tracking_code: String,
}
