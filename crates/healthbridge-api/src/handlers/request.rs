//! Medicine request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use healthbridge_service::request::service::SubmitRequest;

use crate::dto::request::CreateRequestDto;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/requests
pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(dto): Json<CreateRequestDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    dto.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let request = state
        .request_service
        .submit_request(
            &auth,
            SubmitRequest {
                medicine_name: dto.medicine_name,
                quantity: dto.quantity,
                urgency: dto.urgency,
                reason: dto.reason,
                donation_id: dto.donation_id,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": request,
        "tracking_code": request.tracking_code,
    })))
}

/// GET /api/requests
pub async fn list_my_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .request_service
        .list_my_requests(&auth, params.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = state.request_service.get_request(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": request })))
}

/// DELETE /api/requests/{id}
pub async fn delete_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.request_service.delete_request(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Request deleted successfully".to_string(),
    })))
}

/// POST /api/requests/{id}/deliver
pub async fn deliver(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = state.request_service.deliver(&auth, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": request,
        "message": "Medicine marked as delivered successfully",
    })))
}

/// POST /api/requests/{id}/claim
pub async fn claim(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = state.request_service.claim(&auth, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": request,
        "message": "Medicine claimed successfully",
    })))
}
