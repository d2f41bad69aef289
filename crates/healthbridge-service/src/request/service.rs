//! Request creation (with matching), delivery, claim, and deletion.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use healthbridge_core::error::{AppError, ErrorKind};
use healthbridge_core::types::pagination::{PageRequest, PageResponse};
use healthbridge_core::types::tracking;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::lifecycle::LifecycleRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_database::repositories::user::UserRepository;
use healthbridge_entity::request::model::parse_quantity;
use healthbridge_entity::request::{CreateRequest, MedicineRequest, RequestStatus, Urgency};

use crate::context::RequestContext;
use crate::notification::Notifier;

/// Input for submitting a medicine request.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Requested medicine name.
    pub medicine_name: String,
    /// Requested amount as entered by the recipient.
    pub quantity: String,
    /// Urgency of the ask.
    pub urgency: Urgency,
    /// Free-text justification.
    pub reason: Option<String>,
    /// Specific donation to match against, when the recipient picked one
    /// from the catalogue.
    pub donation_id: Option<Uuid>,
}

/// Manages the recipient/donor-facing request lifecycle.
#[derive(Debug, Clone)]
pub struct RequestService {
    /// Request repository.
    request_repo: Arc<RequestRepository>,
    /// Donation repository.
    donation_repo: Arc<DonationRepository>,
    /// Cross-entity transactional mutations.
    lifecycle_repo: Arc<LifecycleRepository>,
    /// User lookups for notification bodies.
    user_repo: Arc<UserRepository>,
    /// Notification sink.
    notifier: Arc<Notifier>,
}

impl RequestService {
    /// Creates a new request service.
    pub fn new(
        request_repo: Arc<RequestRepository>,
        donation_repo: Arc<DonationRepository>,
        lifecycle_repo: Arc<LifecycleRepository>,
        user_repo: Arc<UserRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            request_repo,
            donation_repo,
            lifecycle_repo,
            user_repo,
            notifier,
        }
    }

    /// Submits a medicine request, matching it against a donation when one
    /// was targeted.
    ///
    /// A targeted donation that cannot be found (or is no longer matchable)
    /// never blocks creation — the request falls back to unmatched pending.
    /// Only overt quantity insufficiency on an existing, matchable donation
    /// is an error.
    pub async fn submit_request(
        &self,
        ctx: &RequestContext,
        input: SubmitRequest,
    ) -> Result<MedicineRequest, AppError> {
        if input.medicine_name.trim().is_empty() {
            return Err(AppError::validation("Medicine name is required"));
        }
        let requested = parse_quantity(&input.quantity)?;

        let mut data = CreateRequest {
            medicine_name: input.medicine_name.trim().to_string(),
            quantity: requested.to_string(),
            urgency: input.urgency,
            reason: input.reason,
            recipient_id: ctx.user_id,
            matched_donation_id: None,
            status: RequestStatus::Pending,
            tracking_code: tracking::generate(tracking::REQUEST_PREFIX),
        };

        if let Some(donation_id) = input.donation_id {
            if let Some(donation) = self.donation_repo.find_by_id(donation_id).await? {
                if donation.donor_id == ctx.user_id {
                    return Err(AppError::validation(
                        "You cannot request your own donation",
                    ));
                }
                if donation.is_matchable() {
                    if donation.quantity < requested {
                        return Err(AppError::insufficient_quantity(format!(
                            "Only {} units available, but you requested {requested}",
                            donation.quantity
                        )));
                    }
                    return self.create_matched(ctx, donation_id, data).await;
                }
                debug!(
                    donation_id = %donation_id,
                    status = %donation.status,
                    approval = %donation.approval_status,
                    "Targeted donation not matchable; creating unmatched request"
                );
            } else {
                debug!(donation_id = %donation_id, "Targeted donation not found; creating unmatched request");
            }
        } else if self
            .donation_repo
            .exists_by_donor_and_name(ctx.user_id, &data.medicine_name)
            .await?
        {
            return Err(AppError::validation(
                "You cannot request your own donation",
            ));
        }

        data.status = RequestStatus::Pending;
        let request = self.request_repo.create(&data).await?;

        info!(
            recipient_id = %ctx.user_id,
            request_id = %request.id,
            tracking_code = %request.tracking_code,
            "Unmatched request submitted"
        );

        Ok(request)
    }

    /// Atomically reserve the donation and create the matched request,
    /// notifying the donor afterwards.
    async fn create_matched(
        &self,
        ctx: &RequestContext,
        donation_id: Uuid,
        mut data: CreateRequest,
    ) -> Result<MedicineRequest, AppError> {
        data.matched_donation_id = Some(donation_id);
        data.status = RequestStatus::Matched;

        let request = match self
            .lifecycle_repo
            .reserve_and_create_request(donation_id, &data)
            .await
        {
            Ok(r) => r,
            // The donation raced away between the visibility check and the
            // reservation; fall back to an unmatched request, same as a
            // failed lookup.
            Err(e) if e.kind == ErrorKind::Conflict => {
                debug!(donation_id = %donation_id, "Reservation lost race; creating unmatched request");
                data.matched_donation_id = None;
                data.status = RequestStatus::Pending;
                return self.request_repo.create(&data).await;
            }
            Err(e) => return Err(e),
        };

        info!(
            recipient_id = %ctx.user_id,
            request_id = %request.id,
            donation_id = %donation_id,
            tracking_code = %request.tracking_code,
            "Request matched and donation reserved"
        );

        if let Some(donation) = self.donation_repo.find_by_id(donation_id).await? {
            if let Some(recipient) = self.user_repo.find_by_id(ctx.user_id).await? {
                self.notifier
                    .request_matched(donation.donor_id, &recipient, &request)
                    .await;
            }
        }

        Ok(request)
    }

    /// Lists the current user's requests, newest first.
    pub async fn list_my_requests(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<MedicineRequest>, AppError> {
        self.request_repo.find_by_recipient(ctx.user_id, &page).await
    }

    /// Gets one of the current user's requests.
    pub async fn get_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> Result<MedicineRequest, AppError> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.recipient_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::permission_denied(
                "You can only view your own requests",
            ));
        }

        Ok(request)
    }

    /// Deletes one of the current user's requests, reverting a reserved
    /// donation to available when the medicine was never delivered.
    pub async fn delete_request(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> Result<(), AppError> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.recipient_id != ctx.user_id {
            return Err(AppError::permission_denied(
                "You can only delete your own requests",
            ));
        }

        let restore = request
            .matched_donation_id
            .filter(|_| request.status.restores_donation_on_removal());

        self.lifecycle_repo
            .remove_request_restoring_donation(request.id, restore)
            .await?;

        info!(
            recipient_id = %ctx.user_id,
            request_id = %request.id,
            restored_donation = ?restore,
            "Request deleted by recipient"
        );

        Ok(())
    }

    /// Marks a request as delivered (donor confirms the physical handoff).
    ///
    /// Only the donor of the matched donation may deliver, and only while
    /// the request is still `matched` — a second call fails instead of
    /// decrementing the stock twice. The quantity decrement and both
    /// status flips commit atomically.
    pub async fn deliver(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> Result<MedicineRequest, AppError> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        let donation_id = request.matched_donation_id.ok_or_else(|| {
            AppError::permission_denied("You do not have permission to deliver this medicine")
        })?;

        let donation = self
            .donation_repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Matched donation not found"))?;

        if donation.donor_id != ctx.user_id {
            return Err(AppError::permission_denied(
                "You do not have permission to deliver this medicine",
            ));
        }

        if !request.status.can_deliver() {
            return Err(AppError::invalid_state(format!(
                "Request is {} and cannot be delivered",
                request.status
            )));
        }

        let requested = request.quantity_value()?;
        let outcome = donation.delivery_outcome(requested);

        self.lifecycle_repo
            .deliver(donation.id, outcome.remaining, outcome.status, request.id)
            .await?;

        info!(
            donor_id = %ctx.user_id,
            request_id = %request.id,
            donation_id = %donation.id,
            delivered = requested,
            remaining = outcome.remaining,
            donation_status = %outcome.status,
            "Medicine delivered"
        );

        self.request_repo
            .find_by_id(request.id)
            .await?
            .ok_or_else(|| AppError::internal("Request vanished after delivery"))
    }

    /// Marks a request as claimed (recipient confirms receipt). Terminal.
    pub async fn claim(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> Result<MedicineRequest, AppError> {
        let request = self
            .request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.recipient_id != ctx.user_id {
            return Err(AppError::permission_denied(
                "You can only claim your own requests",
            ));
        }

        if !request.status.can_claim() {
            return Err(AppError::invalid_state(
                "This medicine is not ready to be claimed yet",
            ));
        }

        self.request_repo
            .set_status(request.id, RequestStatus::Claimed)
            .await?;

        info!(
            recipient_id = %ctx.user_id,
            request_id = %request.id,
            "Medicine claimed"
        );

        self.request_repo
            .find_by_id(request.id)
            .await?
            .ok_or_else(|| AppError::internal("Request vanished after claim"))
    }
}
