//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use healthbridge_entity::user::{User, UserRole};

/// Context for the current authenticated request.
///
/// Authentication happens upstream; this context is built from the
/// already-verified principal and passed into every service method so
/// that each operation knows *who* is acting. The reviewing admin is
/// never read from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: Uuid,
    /// The acting user's role.
    pub role: UserRole,
    /// The acting user's handle.
    pub username: String,
    /// The acting user's email (notification target).
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Build a context from a loaded user record.
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name(),
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
