//! Donation entity.

pub mod model;
pub mod status;

pub use model::{CreateDonation, DeliveryOutcome, Donation};
pub use status::{ApprovalStatus, DonationStatus};
