//! Donation services.

pub mod search;
pub mod service;

pub use search::MedicineSearchService;
pub use service::DonationService;
