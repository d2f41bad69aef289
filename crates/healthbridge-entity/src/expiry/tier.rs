//! Expiry urgency classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency tier of an expiry alert, derived from days-until-expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryTier {
    /// Expires today or tomorrow.
    Critical,
    /// Expires within three days.
    High,
    /// Expires later in the alert window.
    Notice,
}

impl ExpiryTier {
    /// Classify a days-until-expiry count.
    pub fn classify(days_until_expiry: i64) -> Self {
        if days_until_expiry <= 1 {
            Self::Critical
        } else if days_until_expiry <= 3 {
            Self::High
        } else {
            Self::Notice
        }
    }

    /// Tier-specific headline for the alert message.
    pub fn headline(&self, days_until_expiry: i64) -> String {
        match days_until_expiry {
            0 => "CRITICAL: This medicine expires TODAY!".to_string(),
            1 => "URGENT: This medicine expires TOMORROW!".to_string(),
            d if d <= 3 => format!("HIGH PRIORITY: This medicine expires in {d} days."),
            d => format!("NOTICE: This medicine will expire in {d} days."),
        }
    }

    /// Return the tier as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Notice => "notice",
        }
    }
}

impl fmt::Display for ExpiryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
