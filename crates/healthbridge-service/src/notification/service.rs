//! Notification center: listing and read-state management.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use healthbridge_core::error::AppError;
use healthbridge_core::types::pagination::{PageRequest, PageResponse};
use healthbridge_database::repositories::notification::NotificationRepository;
use healthbridge_entity::notification::Notification;

use crate::context::RequestContext;

/// Manages a user's notification center.
#[derive(Debug, Clone)]
pub struct NotificationService {
    /// Notification repository.
    notification_repo: Arc<NotificationRepository>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notification_repo: Arc<NotificationRepository>) -> Self {
        Self { notification_repo }
    }

    /// Lists notifications for the current user, newest first.
    pub async fn list_notifications(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<Notification>, AppError> {
        self.notification_repo.find_by_user(ctx.user_id, &page).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<i64, AppError> {
        self.notification_repo.count_unread(ctx.user_id).await
    }

    /// Marks a notification as read.
    ///
    /// Marking an already-read notification is a no-op; marking someone
    /// else's notification is not-found.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        self.notification_repo
            .mark_read(notification_id, ctx.user_id, Utc::now())
            .await?;
        Ok(())
    }

    /// Marks all notifications as read for the current user. Returns the
    /// number updated.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        self.notification_repo
            .mark_all_read(ctx.user_id, Utc::now())
            .await
    }
}
