//! Donation submission, listing, and deletion.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use healthbridge_core::error::AppError;
use healthbridge_core::types::pagination::{PageRequest, PageResponse};
use healthbridge_core::types::tracking;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_entity::donation::{CreateDonation, Donation};
use healthbridge_storage::manager::StorageManager;

use crate::context::RequestContext;

/// Input for submitting a donation.
#[derive(Debug, Clone)]
pub struct SubmitDonation {
    /// Medicine name.
    pub name: String,
    /// Number of units donated.
    pub quantity: i32,
    /// Expiry date printed on the packaging.
    pub expiry_date: NaiveDate,
    /// Original filename of the uploaded photo.
    pub image_filename: String,
    /// Raw bytes of the uploaded photo.
    pub image_data: Bytes,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Manages the donor-facing donation lifecycle.
#[derive(Debug, Clone)]
pub struct DonationService {
    /// Donation repository.
    donation_repo: Arc<DonationRepository>,
    /// Request repository, for the image-preservation rule on deletion.
    request_repo: Arc<RequestRepository>,
    /// Image blob storage.
    storage: Arc<StorageManager>,
}

impl DonationService {
    /// Creates a new donation service.
    pub fn new(
        donation_repo: Arc<DonationRepository>,
        request_repo: Arc<RequestRepository>,
        storage: Arc<StorageManager>,
    ) -> Self {
        Self {
            donation_repo,
            request_repo,
            storage,
        }
    }

    /// Submits a new donation for admin review.
    ///
    /// The photo is required and must decode as an image; the expiry date
    /// must not be in the past. The image is stored before the row is
    /// inserted, and removed again if the insert fails.
    pub async fn submit_donation(
        &self,
        ctx: &RequestContext,
        input: SubmitDonation,
    ) -> Result<Donation, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("Medicine name is required"));
        }
        if input.quantity <= 0 {
            return Err(AppError::validation("Quantity must be positive"));
        }
        if input.image_data.is_empty() {
            return Err(AppError::validation(
                "Medicine image is required. Please upload a clear image of the medicine.",
            ));
        }
        if image::guess_format(&input.image_data).is_err() {
            return Err(AppError::validation(
                "The uploaded file is not a recognized image format",
            ));
        }

        let today = Utc::now().date_naive();
        if input.expiry_date < today {
            return Err(AppError::validation(format!(
                "Cannot donate expired medicine. The expiry date ({}) has already passed.",
                input.expiry_date
            )));
        }

        let image_path = StorageManager::image_path(Uuid::new_v4(), &input.image_filename);
        self.storage
            .put_image(&image_path, input.image_data)
            .await?;

        let data = CreateDonation {
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            expiry_date: input.expiry_date,
            donor_id: ctx.user_id,
            image_path: image_path.clone(),
            notes: input.notes,
            tracking_code: tracking::generate(tracking::DONATION_PREFIX),
        };

        let donation = match self.donation_repo.create(&data).await {
            Ok(d) => d,
            Err(e) => {
                if let Err(del) = self.storage.delete_image(&image_path).await {
                    warn!(path = %image_path, error = %del, "Failed to remove orphan image");
                }
                return Err(e);
            }
        };

        info!(
            donor_id = %ctx.user_id,
            donation_id = %donation.id,
            tracking_code = %donation.tracking_code,
            "Donation submitted for review"
        );

        Ok(donation)
    }

    /// Lists the current user's donations, newest first.
    pub async fn list_my_donations(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<Donation>, AppError> {
        self.donation_repo.find_by_donor(ctx.user_id, &page).await
    }

    /// Gets one of the current user's donations.
    pub async fn get_donation(
        &self,
        ctx: &RequestContext,
        donation_id: Uuid,
    ) -> Result<Donation, AppError> {
        let donation = self
            .donation_repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donation not found"))?;

        if donation.donor_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::permission_denied(
                "You can only view your own donations",
            ));
        }

        Ok(donation)
    }

    /// Deletes one of the current user's donations.
    ///
    /// The stored image is only removed when no request references the
    /// donation; an image-deletion failure never blocks the row deletion.
    pub async fn delete_donation(
        &self,
        ctx: &RequestContext,
        donation_id: Uuid,
    ) -> Result<(), AppError> {
        let donation = self
            .donation_repo
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donation not found"))?;

        if donation.donor_id != ctx.user_id {
            return Err(AppError::permission_denied(
                "You can only delete your own donations",
            ));
        }

        let has_requests = !self
            .request_repo
            .find_by_matched_donation(donation.id)
            .await?
            .is_empty();

        if !has_requests {
            if let Err(e) = self.storage.delete_image(&donation.image_path).await {
                warn!(
                    donation_id = %donation.id,
                    error = %e,
                    "Failed to delete donation image; continuing with row deletion"
                );
            }
        }

        self.donation_repo.delete(donation.id).await?;

        info!(
            donor_id = %ctx.user_id,
            donation_id = %donation.id,
            image_kept = has_requests,
            "Donation deleted by donor"
        );

        Ok(())
    }
}
