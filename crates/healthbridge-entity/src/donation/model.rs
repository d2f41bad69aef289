//! Donation entity model and pure lifecycle arithmetic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{ApprovalStatus, DonationStatus};
use crate::expiry::ExpiryTier;

/// A donated medicine batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    /// Unique donation identifier.
    pub id: Uuid,
    /// Medicine name.
    pub name: String,
    /// Remaining units. Never negative.
    pub quantity: i32,
    /// Calendar expiry date printed on the packaging.
    pub expiry_date: NaiveDate,
    /// The donating user.
    pub donor_id: Uuid,
    /// Blob-store path of the required medicine photo.
    pub image_path: String,
    /// Stock lifecycle status.
    pub status: DonationStatus,
    /// Admin review status.
    pub approval_status: ApprovalStatus,
    /// Human-readable tracking code (e.g. `DON-4K7QZP2M`).
    pub tracking_code: String,
    /// Free-form donor notes.
    pub notes: Option<String>,
    /// The reviewing admin, once reviewed.
    pub reviewed_by: Option<Uuid>,
    /// When the review happened.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// When the donation was submitted.
    pub donated_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub last_update: DateTime<Utc>,
}

/// Result of applying a delivery decrement to a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Quantity remaining after the decrement (never negative).
    pub remaining: i32,
    /// Status the donation transitions to.
    pub status: DonationStatus,
}

impl Donation {
    /// Days until the expiry date, negative once expired.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    /// Whether the donation has passed its expiry date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today) < 0
    }

    /// Expiry urgency tier for alerting, relative to `today`.
    pub fn expiry_tier(&self, today: NaiveDate) -> ExpiryTier {
        ExpiryTier::classify(self.days_until_expiry(today))
    }

    /// Whether recipients may match against this donation.
    ///
    /// A donation is only matchable when an admin approved it and no other
    /// request currently holds it.
    pub fn is_matchable(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved && self.status == DonationStatus::Available
    }

    /// Compute the delivery transition for a fulfilled request of
    /// `requested` units.
    ///
    /// Quantity is clamped at zero; the donation moves to `Delivered` when
    /// the stock is exhausted and back to `Available` otherwise, freeing the
    /// remainder for new requests.
    pub fn delivery_outcome(&self, requested: i32) -> DeliveryOutcome {
        let remaining = (self.quantity - requested).max(0);
        let status = if self.quantity - requested <= 0 {
            DonationStatus::Delivered
        } else {
            DonationStatus::Available
        };
        DeliveryOutcome { remaining, status }
    }
}

/// Data required to create a new donation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonation {
    /// Medicine name.
    pub name: String,
    /// Number of units donated.
    pub quantity: i32,
    /// Expiry date printed on the packaging.
    pub expiry_date: NaiveDate,
    /// The donating user.
    pub donor_id: Uuid,
    /// Blob-store path of the uploaded photo.
    pub image_path: String,
    /// Free-form donor notes.
    pub notes: Option<String>,
    /// Pre-generated tracking code.
    pub tracking_code: String,
}
