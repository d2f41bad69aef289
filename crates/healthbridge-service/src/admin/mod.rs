//! Admin review services.

pub mod service;

pub use service::AdminService;
