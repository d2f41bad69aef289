//! Request urgency levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Urgency a recipient attaches to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "urgency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// No time pressure.
    Low,
    /// Default level.
    Medium,
    /// Needed soon.
    High,
    /// Needed immediately.
    Critical,
}

impl Urgency {
    /// Review-queue rank: critical requests surface first, then FIFO.
    pub fn review_rank(&self) -> u8 {
        match self {
            Self::Critical => 1,
            Self::High => 2,
            Self::Medium => 3,
            Self::Low => 4,
        }
    }

    /// Return the urgency as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = healthbridge_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(healthbridge_core::AppError::validation(format!(
                "Invalid urgency: '{s}'. Expected one of: low, medium, high, critical"
            ))),
        }
    }
}
