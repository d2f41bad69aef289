//! Notification sink.
//!
//! Every state transition that affects another party goes through the
//! [`Notifier`]. Emission is fire-and-forget: a failed insert is logged
//! and swallowed so that the primary mutation always wins. Callers emit
//! *after* their transaction commits.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use healthbridge_database::repositories::notification::NotificationRepository;
use healthbridge_entity::donation::Donation;
use healthbridge_entity::expiry::ExpiryTier;
use healthbridge_entity::notification::{CreateNotification, NotificationKind};
use healthbridge_entity::request::MedicineRequest;
use healthbridge_entity::user::User;

/// Human-friendly date format used in notification bodies.
const DATE_FMT: &str = "%B %d, %Y";

/// Fire-and-forget notification sink backed by the notification log.
#[derive(Debug, Clone)]
pub struct Notifier {
    notification_repo: Arc<NotificationRepository>,
}

impl Notifier {
    /// Create a new notifier.
    pub fn new(notification_repo: Arc<NotificationRepository>) -> Self {
        Self { notification_repo }
    }

    /// Append a notification, logging and swallowing failures.
    pub async fn emit(&self, data: CreateNotification) {
        if let Err(e) = self.notification_repo.create(&data).await {
            warn!(
                user_id = %data.user_id,
                kind = %data.kind,
                error = %e,
                "Failed to emit notification"
            );
        }
    }

    /// Tell a donor that a recipient matched their donation.
    pub async fn request_matched(
        &self,
        donor_id: Uuid,
        recipient: &User,
        request: &MedicineRequest,
    ) {
        self.emit(CreateNotification {
            user_id: donor_id,
            kind: NotificationKind::RequestMatched,
            title: "Medicine Request Received".to_string(),
            message: format!(
                "{} has requested {}x {} from your donation. The request is pending admin \
                 approval. Recipient: {} (@{}) | Contact: {} | Urgency: {} | Tracking Code: {}",
                recipient.full_name(),
                request.quantity,
                request.medicine_name,
                recipient.full_name(),
                recipient.username,
                recipient.email,
                request.urgency.as_str().to_uppercase(),
                request.tracking_code,
            ),
            donation_id: request.matched_donation_id,
            request_id: Some(request.id),
        })
        .await;
    }

    /// Tell a donor their donation was approved.
    pub async fn donation_approved(&self, donation: &Donation) {
        self.emit(CreateNotification {
            user_id: donation.donor_id,
            kind: NotificationKind::DonationApproved,
            title: "Donation Approved".to_string(),
            message: format!(
                "Your donation of {}x {} has been approved and is now available for \
                 recipients to request.",
                donation.quantity, donation.name,
            ),
            donation_id: Some(donation.id),
            request_id: None,
        })
        .await;
    }

    /// Tell a donor their donation was rejected and removed.
    ///
    /// Takes captured fields because the row is already gone.
    pub async fn donation_rejected(
        &self,
        donor_id: Uuid,
        name: &str,
        quantity: i32,
        reason: &str,
    ) {
        self.emit(CreateNotification {
            user_id: donor_id,
            kind: NotificationKind::DonationRejected,
            title: "Donation Rejected".to_string(),
            message: format!(
                "Your donation of {quantity}x {name} was rejected and removed. Reason: {reason}"
            ),
            donation_id: None,
            request_id: None,
        })
        .await;
    }

    /// Tell a recipient their request was approved, including the claim date.
    pub async fn request_approved(&self, request: &MedicineRequest, claim_date: NaiveDate) {
        self.emit(CreateNotification {
            user_id: request.recipient_id,
            kind: NotificationKind::RequestApproved,
            title: "Request Approved".to_string(),
            message: format!(
                "Your request for {}x {} has been approved! You can claim it on {}.",
                request.quantity,
                request.medicine_name,
                claim_date.format(DATE_FMT),
            ),
            donation_id: request.matched_donation_id,
            request_id: Some(request.id),
        })
        .await;
    }

    /// Tell a donor their matched donation now has a delivery deadline.
    ///
    /// Distinctly worded from the recipient-facing approval notice.
    pub async fn delivery_required(
        &self,
        donor_id: Uuid,
        request: &MedicineRequest,
        recipient: &User,
        claim_date: NaiveDate,
    ) {
        self.emit(CreateNotification {
            user_id: donor_id,
            kind: NotificationKind::RequestApproved,
            title: format!(
                "Delivery Required by {} - Action Needed",
                claim_date.format("%b %d"),
            ),
            message: format!(
                "DELIVERY REQUIRED: The request for {}x {} from {} has been approved by admin. \
                 You must deliver this medicine on or before {}. Recipient contact: {} | \
                 Tracking Code: {}. Please coordinate with the recipient to arrange delivery.",
                request.quantity,
                request.medicine_name,
                recipient.full_name(),
                claim_date.format(DATE_FMT),
                recipient.email,
                request.tracking_code,
            ),
            donation_id: request.matched_donation_id,
            request_id: Some(request.id),
        })
        .await;
    }

    /// Tell a recipient their request was rejected and removed.
    pub async fn request_rejected(
        &self,
        recipient_id: Uuid,
        medicine_name: &str,
        quantity: &str,
        reason: &str,
    ) {
        self.emit(CreateNotification {
            user_id: recipient_id,
            kind: NotificationKind::RequestRejected,
            title: "Request Rejected".to_string(),
            message: format!(
                "Your request for {quantity}x {medicine_name} was rejected and removed. \
                 Reason: {reason}"
            ),
            donation_id: None,
            request_id: None,
        })
        .await;
    }

    /// Alert a donor that their donation is approaching expiry.
    pub async fn medicine_expiring(
        &self,
        donation: &Donation,
        tier: ExpiryTier,
        days_until_expiry: i64,
    ) {
        self.emit(CreateNotification {
            user_id: donation.donor_id,
            kind: NotificationKind::MedicineExpiring,
            title: format!("Medicine Expiry Alert: {}", donation.name),
            message: format!(
                "{} Medicine: {} | Quantity: {} | Expiry Date: {} | Status: {} | \
                 Tracking Code: {} | Urgency Level: {}. To prevent waste, please update the \
                 medicine status if it is no longer available.",
                tier.headline(days_until_expiry),
                donation.name,
                donation.quantity,
                donation.expiry_date.format(DATE_FMT),
                donation.status,
                donation.tracking_code,
                tier.as_str().to_uppercase(),
            ),
            donation_id: Some(donation.id),
            request_id: None,
        })
        .await;
    }

    /// Tell a recipient their request was cancelled because the matched
    /// donation expired.
    pub async fn request_cancelled_expired(
        &self,
        request: &MedicineRequest,
        donation: &Donation,
    ) {
        self.emit(CreateNotification {
            user_id: request.recipient_id,
            kind: NotificationKind::System,
            title: "Request Cancelled: Medicine Expired".to_string(),
            message: format!(
                "Your request for '{}' has been automatically cancelled because the matched \
                 medicine has expired and been removed from the system. Expired medicine: {} \
                 (Tracking Code: {}, Expiry Date: {}). Your request: {} ({}x, urgency {}). \
                 Please submit a new request if you still need this medicine.",
                request.medicine_name,
                donation.name,
                donation.tracking_code,
                donation.expiry_date.format(DATE_FMT),
                request.tracking_code,
                request.quantity,
                request.urgency,
            ),
            donation_id: None,
            request_id: Some(request.id),
        })
        .await;
    }

    /// Tell a donor their expired donation was removed by the cleanup sweep.
    pub async fn expired_donation_removed(&self, donation: &Donation, days_expired: i64) {
        self.emit(CreateNotification {
            user_id: donation.donor_id,
            kind: NotificationKind::System,
            title: format!("Expired Medicine Removed: {}", donation.name),
            message: format!(
                "Your donated medicine '{}' has been automatically removed from the system as \
                 it expired {} days ago (expiry date: {}). Tracking Code: {} | Quantity: {} | \
                 Donated on: {}. Thank you for your contribution, and please keep donating \
                 unexpired medicines.",
                donation.name,
                days_expired,
                donation.expiry_date.format(DATE_FMT),
                donation.tracking_code,
                donation.quantity,
                donation.donated_at.format(DATE_FMT),
            ),
            donation_id: Some(donation.id),
            request_id: None,
        })
        .await;
    }
}
