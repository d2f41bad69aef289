//! # healthbridge-core
//!
//! Core crate for HealthBridge. Contains the unified error system,
//! configuration schemas, pagination and tracking-code types, and the
//! collaborator traits (blob store) consumed by the rest of the workspace.
//!
//! This crate has **no** internal dependencies on other HealthBridge crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
