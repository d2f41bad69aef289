//! # healthbridge-worker
//!
//! Background job execution for HealthBridge. Job handlers implement
//! [`executor::JobHandler`]; the [`scheduler::CronScheduler`] dispatches
//! them on a daily cadence (expiry alerts, expired-donation cleanup,
//! notification trimming).

pub mod executor;
pub mod jobs;
pub mod scheduler;
