//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered HealthBridge user.
///
/// Authentication happens upstream; the application only needs identity
/// and contact details for authorization checks and notifications.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique email address (also the notification target).
    pub email: String,
    /// Short login/display handle.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role: donor, recipient, or admin.
    pub role: UserRole,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The user's full display name, falling back to the username.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        if name.trim().is_empty() {
            self.username.clone()
        } else {
            name.trim().to_string()
        }
    }

    /// Whether the user donates medicines.
    pub fn is_donor(&self) -> bool {
        self.role == UserRole::Donor
    }

    /// Whether the user requests medicines.
    pub fn is_recipient(&self) -> bool {
        self.role == UserRole::Recipient
    }
}
