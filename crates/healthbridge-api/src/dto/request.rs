//! Request body DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use healthbridge_entity::request::Urgency;

/// Body for `POST /api/requests`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequestDto {
    /// Requested medicine name.
    #[validate(length(min = 1, message = "Medicine name is required"))]
    pub medicine_name: String,
    /// Requested amount.
    #[validate(length(min = 1, message = "Quantity is required"))]
    pub quantity: String,
    /// Urgency (defaults to medium).
    #[serde(default)]
    pub urgency: Urgency,
    /// Free-text justification.
    pub reason: Option<String>,
    /// Specific donation to match against.
    pub donation_id: Option<Uuid>,
}

/// Body for admin rejection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectDto {
    /// Rejection reason, shown to the affected user.
    #[validate(length(min = 1, message = "A rejection reason is required"))]
    pub reason: String,
}

/// Body for `POST /api/admin/requests/{id}/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequestDto {
    /// Date the recipient may claim the medicine.
    pub claim_ready_date: Option<NaiveDate>,
}

/// Query parameters for `GET /api/donations/search`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchParamsDto {
    /// Name substring.
    pub q: Option<String>,
    /// Only medicines expiring on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Only medicines expiring on or before this date.
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for `GET /api/donations/autocomplete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteParamsDto {
    /// Name prefix/substring.
    #[serde(default)]
    pub q: String,
}
