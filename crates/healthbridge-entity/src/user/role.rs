//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in HealthBridge.
///
/// Donor and recipient are permanent, one-time selections; admins review
/// submissions from both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Submits medicine donations.
    Donor,
    /// Requests donated medicines.
    Recipient,
    /// Reviews and approves donations and requests.
    Admin,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Recipient => "recipient",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = healthbridge_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "donor" => Ok(Self::Donor),
            "recipient" => Ok(Self::Recipient),
            "admin" => Ok(Self::Admin),
            _ => Err(healthbridge_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: donor, recipient, admin"
            ))),
        }
    }
}
