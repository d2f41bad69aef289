//! Donation handlers.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use bytes::Bytes;
use chrono::NaiveDate;
use uuid::Uuid;

use healthbridge_service::donation::search::SearchFilters;
use healthbridge_service::donation::service::SubmitDonation;

use crate::dto::request::{AutocompleteParamsDto, SearchParamsDto};
use crate::dto::response::{ApiResponse, MessageResponse, SuggestionsResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/donations (multipart: name, quantity, expiry_date, notes, image)
pub async fn create_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut name: Option<String> = None;
    let mut quantity: Option<i32> = None;
    let mut expiry_date: Option<NaiveDate> = None;
    let mut notes: Option<String> = None;
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "quantity" => {
                let raw = read_text(field).await?;
                quantity = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ApiError::bad_request("Please enter a valid quantity"))?,
                );
            }
            "expiry_date" => {
                let raw = read_text(field).await?;
                expiry_date = Some(
                    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                        ApiError::bad_request("Invalid date format. Please use YYYY-MM-DD.")
                    })?,
                );
            }
            "notes" => notes = Some(read_text(field).await?),
            "image" => {
                let filename = field.file_name().unwrap_or("image.bin").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read image: {e}")))?;
                image = Some((filename, data));
            }
            _ => {}
        }
    }

    let (name, quantity, expiry_date) = match (name, quantity, expiry_date) {
        (Some(n), Some(q), Some(e)) => (n, q, e),
        _ => return Err(ApiError::bad_request("Please fill in all required fields")),
    };
    let (image_filename, image_data) = image
        .ok_or_else(|| ApiError::bad_request("Medicine image is required"))?;

    let donation = state
        .donation_service
        .submit_donation(
            &auth,
            SubmitDonation {
                name,
                quantity,
                expiry_date,
                image_filename,
                image_data,
                notes,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": donation,
        "tracking_code": donation.tracking_code,
    })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart field: {e}")))
}

/// GET /api/donations
pub async fn list_my_donations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .donation_service
        .list_my_donations(&auth, params.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/donations/{id}
pub async fn get_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let donation = state.donation_service.get_donation(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": donation })))
}

/// DELETE /api/donations/{id}
pub async fn delete_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.donation_service.delete_donation(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Donation deleted successfully".to_string(),
    })))
}

/// GET /api/donations/search
pub async fn search_medicines(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(search): Query<SearchParamsDto>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filters = SearchFilters {
        query: search.q,
        expiry_from: search.start_date,
        expiry_to: search.end_date,
    };
    let result = state
        .search_service
        .search(filters, page.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/donations/autocomplete
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParamsDto>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let suggestions = state.search_service.autocomplete(&params.q).await?;
    Ok(Json(SuggestionsResponse { suggestions }))
}
