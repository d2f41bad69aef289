//! Admin review handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use crate::dto::request::{ApproveRequestDto, RejectDto};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let summary = state.admin_service.dashboard(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": summary })))
}

/// POST /api/admin/donations/{id}/approve
pub async fn approve_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let donation = state.admin_service.approve_donation(&auth, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": donation,
        "message": "Donation approved",
    })))
}

/// POST /api/admin/donations/{id}/reject
pub async fn reject_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<RejectDto>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    dto.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    state
        .admin_service
        .reject_donation(&auth, id, &dto.reason)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Donation rejected and removed".to_string(),
    })))
}

/// POST /api/admin/requests/{id}/approve
pub async fn approve_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<ApproveRequestDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = state
        .admin_service
        .approve_request(&auth, id, dto.claim_ready_date)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": request,
        "message": "Request approved",
    })))
}

/// POST /api/admin/requests/{id}/reject
pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<RejectDto>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    dto.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    state
        .admin_service
        .reject_request(&auth, id, &dto.reason)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Request rejected and removed".to_string(),
    })))
}
