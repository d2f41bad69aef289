//! Admin review workflow: approvals, rejections, and the dashboard.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use healthbridge_core::error::AppError;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::lifecycle::LifecycleRepository;
use healthbridge_database::repositories::request::{CompletedPickup, RequestRepository};
use healthbridge_database::repositories::user::UserRepository;
use healthbridge_entity::donation::{ApprovalStatus, Donation};
use healthbridge_entity::request::MedicineRequest;
use healthbridge_storage::manager::StorageManager;

use crate::context::RequestContext;
use crate::notification::Notifier;

/// How many recent approvals the dashboard shows per entity type.
const RECENT_APPROVALS: i64 = 5;

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Total donations ever submitted.
    pub total_donations: i64,
    /// Donations currently approved.
    pub approved_donations: i64,
    /// Total requests ever submitted.
    pub total_requests: i64,
    /// Requests currently approved.
    pub approved_requests: i64,
    /// Donations awaiting review.
    pub pending_donations: i64,
    /// Requests awaiting review.
    pub pending_requests: i64,
}

/// Everything the admin dashboard renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Donations awaiting review, newest first.
    pub pending_donations: Vec<Donation>,
    /// Requests awaiting review, most urgent first, FIFO within a tier.
    pub pending_requests: Vec<MedicineRequest>,
    /// Aggregate counters.
    pub stats: DashboardStats,
    /// Recently approved donations.
    pub recent_approved_donations: Vec<Donation>,
    /// Recently approved requests.
    pub recent_approved_requests: Vec<MedicineRequest>,
    /// Claimed requests whose matched donation was fully delivered.
    pub completed_pickups: Vec<CompletedPickup>,
}

/// Admin-driven review transitions for donations and requests.
#[derive(Debug, Clone)]
pub struct AdminService {
    /// Donation repository.
    donation_repo: Arc<DonationRepository>,
    /// Request repository.
    request_repo: Arc<RequestRepository>,
    /// Cross-entity transactional mutations.
    lifecycle_repo: Arc<LifecycleRepository>,
    /// User lookups for notification bodies.
    user_repo: Arc<UserRepository>,
    /// Image blob storage, for rejection cleanup.
    storage: Arc<StorageManager>,
    /// Notification sink.
    notifier: Arc<Notifier>,
}

impl AdminService {
    /// Creates a new admin service.
    pub fn new(
        donation_repo: Arc<DonationRepository>,
        request_repo: Arc<RequestRepository>,
        lifecycle_repo: Arc<LifecycleRepository>,
        user_repo: Arc<UserRepository>,
        storage: Arc<StorageManager>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            donation_repo,
            request_repo,
            lifecycle_repo,
            user_repo,
            storage,
            notifier,
        }
    }

    fn require_admin(ctx: &RequestContext) -> Result<(), AppError> {
        if ctx.is_admin() {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "Administrator privileges required",
            ))
        }
    }

    /// Builds the admin dashboard summary.
    pub async fn dashboard(&self, ctx: &RequestContext) -> Result<DashboardSummary, AppError> {
        Self::require_admin(ctx)?;

        let pending_donations = self.donation_repo.find_pending_review().await?;
        let pending_requests = self.request_repo.find_pending_review().await?;

        let stats = DashboardStats {
            total_donations: self.donation_repo.count_all().await?,
            approved_donations: self
                .donation_repo
                .count_by_approval(ApprovalStatus::Approved)
                .await?,
            total_requests: self.request_repo.count_all().await?,
            approved_requests: self
                .request_repo
                .count_by_approval(ApprovalStatus::Approved)
                .await?,
            pending_donations: pending_donations.len() as i64,
            pending_requests: pending_requests.len() as i64,
        };

        Ok(DashboardSummary {
            pending_donations,
            pending_requests,
            stats,
            recent_approved_donations: self
                .donation_repo
                .find_recent_approved(RECENT_APPROVALS)
                .await?,
            recent_approved_requests: self
                .request_repo
                .find_recent_approved(RECENT_APPROVALS)
                .await?,
            completed_pickups: self.request_repo.find_completed_pickups().await?,
        })
    }

    /// Approves a pending donation, making it visible to recipients.
    pub async fn approve_donation(
        &self,
        ctx: &RequestContext,
        donation_id: Uuid,
    ) -> Result<Donation, AppError> {
        Self::require_admin(ctx)?;

        let donation = self
            .donation_repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donation not found"))?;

        if donation.approval_status != ApprovalStatus::Pending {
            return Err(AppError::invalid_state(format!(
                "Donation is already {}",
                donation.approval_status
            )));
        }

        let donation = self
            .donation_repo
            .set_review(donation.id, ApprovalStatus::Approved, ctx.user_id, Utc::now())
            .await?;

        info!(
            admin = %ctx.email,
            donation_id = %donation.id,
            tracking_code = %donation.tracking_code,
            "Donation approved"
        );

        self.notifier.donation_approved(&donation).await;

        Ok(donation)
    }

    /// Rejects a pending donation, deleting it entirely.
    ///
    /// A non-empty reason is required and is embedded in the donor's
    /// notification. The image blob is removed best-effort.
    pub async fn reject_donation(
        &self,
        ctx: &RequestContext,
        donation_id: Uuid,
        reason: &str,
    ) -> Result<(), AppError> {
        Self::require_admin(ctx)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation(
                "Please provide a reason for rejection",
            ));
        }

        let donation = self
            .donation_repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donation not found"))?;

        if donation.approval_status != ApprovalStatus::Pending {
            return Err(AppError::invalid_state(format!(
                "Donation is already {}",
                donation.approval_status
            )));
        }

        self.donation_repo.delete(donation.id).await?;

        if let Err(e) = self.storage.delete_image(&donation.image_path).await {
            warn!(
                donation_id = %donation.id,
                error = %e,
                "Failed to delete image of rejected donation"
            );
        }

        info!(
            admin = %ctx.email,
            donation_id = %donation.id,
            tracking_code = %donation.tracking_code,
            "Donation rejected and deleted"
        );

        self.notifier
            .donation_rejected(donation.donor_id, &donation.name, donation.quantity, reason)
            .await;

        Ok(())
    }

    /// Approves a pending request.
    ///
    /// Requires a claim-ready date that is not in the past. The recipient
    /// is told when to claim; when a donation is matched, its donor gets a
    /// separate delivery-deadline notice.
    pub async fn approve_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        claim_ready_date: Option<NaiveDate>,
    ) -> Result<MedicineRequest, AppError> {
        Self::require_admin(ctx)?;

        let claim_date = claim_ready_date.ok_or_else(|| {
            AppError::invalid_claim_date("Claim ready date is required when approving a request")
        })?;
        if claim_date < Utc::now().date_naive() {
            return Err(AppError::invalid_claim_date(
                "Claim ready date cannot be in the past",
            ));
        }

        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.approval_status != ApprovalStatus::Pending {
            return Err(AppError::invalid_state(format!(
                "Request is already {}",
                request.approval_status
            )));
        }

        let request = self
            .request_repo
            .approve(request.id, ctx.user_id, Utc::now(), claim_date)
            .await?;

        info!(
            admin = %ctx.email,
            request_id = %request.id,
            tracking_code = %request.tracking_code,
            claim_ready_date = %claim_date,
            "Request approved"
        );

        self.notifier.request_approved(&request, claim_date).await;

        if let Some(donation_id) = request.matched_donation_id {
            if let Some(donation) = self.donation_repo.find_by_id(donation_id).await? {
                if let Some(recipient) = self.user_repo.find_by_id(request.recipient_id).await? {
                    self.notifier
                        .delivery_required(donation.donor_id, &request, &recipient, claim_date)
                        .await;
                }
            }
        }

        Ok(request)
    }

    /// Rejects a pending request, deleting it entirely.
    ///
    /// A reserved matched donation reverts to available (quantity
    /// unchanged, since stock is only decremented at delivery) in the same
    /// transaction that removes the request.
    pub async fn reject_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        reason: &str,
    ) -> Result<(), AppError> {
        Self::require_admin(ctx)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation(
                "Please provide a reason for rejection",
            ));
        }

        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.approval_status != ApprovalStatus::Pending {
            return Err(AppError::invalid_state(format!(
                "Request is already {}",
                request.approval_status
            )));
        }

        self.lifecycle_repo
            .remove_request_restoring_donation(request.id, request.matched_donation_id)
            .await?;

        info!(
            admin = %ctx.email,
            request_id = %request.id,
            tracking_code = %request.tracking_code,
            restored_donation = ?request.matched_donation_id,
            "Request rejected and deleted"
        );

        self.notifier
            .request_rejected(
                request.recipient_id,
                &request.medicine_name,
                &request.quantity,
                reason,
            )
            .await;

        Ok(())
    }
}
