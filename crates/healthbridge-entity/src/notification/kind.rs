//! Notification type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorizes every notification emitted by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An admin approved the donor's donation.
    DonationApproved,
    /// An admin rejected (and removed) the donor's donation.
    DonationRejected,
    /// An admin approved the recipient's request.
    RequestApproved,
    /// An admin rejected (and removed) the recipient's request.
    RequestRejected,
    /// A recipient matched a request against the donor's donation.
    RequestMatched,
    /// The donor's donation is approaching its expiry date.
    MedicineExpiring,
    /// Automated system housekeeping (expiry removal, cascades).
    System,
}

impl NotificationKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DonationApproved => "donation_approved",
            Self::DonationRejected => "donation_rejected",
            Self::RequestApproved => "request_approved",
            Self::RequestRejected => "request_rejected",
            Self::RequestMatched => "request_matched",
            Self::MedicineExpiring => "medicine_expiring",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
