//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background sweep and maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduled worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Expiry-alert window in days (donations expiring within this many
    /// days trigger an alert).
    #[serde(default = "default_alert_days")]
    pub alert_days: i64,
    /// Donations expired for longer than this many days are removed by the
    /// cleanup sweep.
    #[serde(default = "default_cleanup_days")]
    pub cleanup_days_past_expiry: i64,
    /// Notifications older than this many days are trimmed.
    #[serde(default = "default_retention_days")]
    pub notification_retention_days: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            alert_days: default_alert_days(),
            cleanup_days_past_expiry: default_cleanup_days(),
            notification_retention_days: default_retention_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_alert_days() -> i64 {
    10
}

fn default_cleanup_days() -> i64 {
    7
}

fn default_retention_days() -> i64 {
    90
}
