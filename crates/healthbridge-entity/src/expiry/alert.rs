//! Expiry alert deduplication ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A recorded expiry alert.
///
/// One row per `(donation, days_before_expiry, recipient_email)` triple;
/// the unique constraint on that key is what makes the alert sweep
/// re-run-safe.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpiryAlert {
    /// Unique ledger entry identifier.
    pub id: Uuid,
    /// The donation the alert was about.
    pub donation_id: Uuid,
    /// Days until expiry at the time the alert was sent.
    pub days_before_expiry: i32,
    /// Email address of the alerted donor.
    pub recipient_email: String,
    /// Delivery channel tag (currently always `"in_app"`).
    pub alert_type: String,
    /// When the alert was recorded.
    pub created_at: DateTime<Utc>,
}
