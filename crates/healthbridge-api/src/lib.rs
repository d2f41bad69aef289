//! # healthbridge-api
//!
//! Axum HTTP surface for HealthBridge. Handlers stay thin: extract the
//! principal and parameters, call a service, serialize the result. All
//! domain decisions live in `healthbridge-service`.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;
