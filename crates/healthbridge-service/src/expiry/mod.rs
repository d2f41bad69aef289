//! Expiry sweeps: deduplicated alerting and destructive cleanup.

pub mod alert;
pub mod cleanup;

pub use alert::{AlertSweep, AlertSweepOptions, AlertSweepReport};
pub use cleanup::{CleanupSweep, CleanupSweepOptions, CleanupSweepReport};
