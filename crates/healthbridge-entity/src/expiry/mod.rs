//! Expiry alert ledger and urgency tiers.

pub mod alert;
pub mod tier;

pub use alert::ExpiryAlert;
pub use tier::ExpiryTier;
