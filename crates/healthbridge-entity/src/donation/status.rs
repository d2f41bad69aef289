//! Donation lifecycle and review status enums.
//!
//! The two enums are deliberately orthogonal: `DonationStatus` tracks the
//! physical stock lifecycle while `ApprovalStatus` tracks admin review.
//! Every combination is representable and must be matched explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stock lifecycle of a donated medicine batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Open for matching.
    Available,
    /// Bound to exactly one matched request; hidden from further matching.
    Reserved,
    /// Stock fully handed over.
    Delivered,
}

impl DonationStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin review status shared by donations and requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting admin review.
    Pending,
    /// Cleared by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
}

impl ApprovalStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = healthbridge_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(healthbridge_core::AppError::validation(format!(
                "Invalid approval status: '{s}'"
            ))),
        }
    }
}
