//! Response body DTOs.

use serde::{Deserialize, Serialize};

/// Standard success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always true for success responses.
    pub success: bool,
    /// Payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload in the success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A bare count payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// The count.
    pub count: i64,
}

/// A bare message payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

/// Autocomplete suggestion list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    /// Suggested medicine names.
    pub suggestions: Vec<String>,
}
