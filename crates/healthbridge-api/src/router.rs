//! Route definitions for the HealthBridge HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(donation_routes())
        .merge(request_routes())
        .merge(notification_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

fn donation_routes() -> Router<AppState> {
    Router::new()
        .route("/donations", post(handlers::donation::create_donation))
        .route("/donations", get(handlers::donation::list_my_donations))
        .route("/donations/search", get(handlers::donation::search_medicines))
        .route(
            "/donations/autocomplete",
            get(handlers::donation::autocomplete),
        )
        .route("/donations/{id}", get(handlers::donation::get_donation))
        .route("/donations/{id}", delete(handlers::donation::delete_donation))
}

fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(handlers::request::create_request))
        .route("/requests", get(handlers::request::list_my_requests))
        .route("/requests/{id}", get(handlers::request::get_request))
        .route("/requests/{id}", delete(handlers::request::delete_request))
        .route("/requests/{id}/deliver", post(handlers::request::deliver))
        .route("/requests/{id}/claim", post(handlers::request::claim))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(handlers::admin::dashboard))
        .route(
            "/admin/donations/{id}/approve",
            post(handlers::admin::approve_donation),
        )
        .route(
            "/admin/donations/{id}/reject",
            post(handlers::admin::reject_donation),
        )
        .route(
            "/admin/requests/{id}/approve",
            post(handlers::admin::approve_request),
        )
        .route(
            "/admin/requests/{id}/reject",
            post(handlers::admin::reject_request),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
