//! Request lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a medicine request.
///
/// `Claimed` is terminal and reachable only from `Fulfilled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Submitted without a bound donation.
    Pending,
    /// Bound to a reserved donation.
    Matched,
    /// Donor confirmed the physical handoff; stock already decremented.
    Fulfilled,
    /// Recipient confirmed receipt. Terminal.
    Claimed,
}

impl RequestStatus {
    /// Whether the donor may deliver against this request.
    ///
    /// Requiring `Matched` makes a second delivery call fail instead of
    /// decrementing the donation twice.
    pub fn can_deliver(&self) -> bool {
        matches!(self, Self::Matched)
    }

    /// Whether the recipient may claim the medicine.
    pub fn can_claim(&self) -> bool {
        matches!(self, Self::Fulfilled)
    }

    /// Whether a rejected or deleted request must restore its matched
    /// donation to `available`.
    ///
    /// Once delivered, the stock was already decremented and there is
    /// nothing to restore.
    pub fn restores_donation_on_removal(&self) -> bool {
        matches!(self, Self::Pending | Self::Matched)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Matched => "matched",
            Self::Fulfilled => "fulfilled",
            Self::Claimed => "claimed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
