//! # healthbridge-service
//!
//! Business logic for HealthBridge. Services orchestrate repositories,
//! blob storage, and the notification sink; every operation takes an
//! explicit [`context::RequestContext`] identifying the acting principal.

pub mod admin;
pub mod context;
pub mod donation;
pub mod expiry;
pub mod notification;
pub mod request;
