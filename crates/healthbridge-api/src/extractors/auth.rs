//! `AuthUser` extractor — resolves the pre-authenticated principal.
//!
//! Authentication itself is handled by an upstream gateway; by the time a
//! request reaches this service, the verified user ID travels in the
//! `X-User-Id` header. The extractor loads the user and injects a
//! [`RequestContext`] into the handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use healthbridge_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the verified user ID.
const USER_ID_HEADER: &str = "x-user-id";

/// Extracted principal context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing X-User-Id header"))?;

        let user_id: Uuid = header
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid X-User-Id header"))?;

        let user = state
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

        Ok(AuthUser(RequestContext::for_user(&user)))
    }
}
