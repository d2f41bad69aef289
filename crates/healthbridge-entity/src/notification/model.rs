//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;

/// An append-only in-app notification.
///
/// Created as a side effect of state transitions that affect another
/// party; only `is_read`/`read_at` are ever mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The user this notification is addressed to.
    pub user_id: Uuid,
    /// Type tag.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Full message body.
    pub message: String,
    /// Related donation, if any.
    pub donation_id: Option<Uuid>,
    /// Related request, if any.
    pub request_id: Option<Uuid>,
    /// Whether the user has opened it.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When it was marked read.
    pub read_at: Option<DateTime<Utc>>,
}

/// Data required to append a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// The addressed user.
    pub user_id: Uuid,
    /// Type tag.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Full message body.
    pub message: String,
    /// Related donation, if any.
    pub donation_id: Option<Uuid>,
    /// Related request, if any.
    pub request_id: Option<Uuid>,
}
