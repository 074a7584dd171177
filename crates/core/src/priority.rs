//! The fixed three-point priority scale
//!
//! The backend stores priority as an integer: `0 = low`, `1 = medium`,
//! `2 = high`. Labels coming back from the ML service are mapped onto the
//! same scale, with anything unrecognised treated as medium.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority level of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Every level, lowest first
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Numeric value sent to the backend
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Lowercase label (`"low"`, `"medium"`, `"high"`)
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a label case-insensitively; unknown labels become medium
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Map any integer onto the scale, clamping at both ends.
    ///
    /// Out-of-range values are reported with a warning so they can be
    /// noticed instead of silently landing in a bucket.
    #[must_use]
    pub fn saturating_from_value(value: i64) -> Self {
        Self::try_from(value).unwrap_or_else(|_| {
            tracing::warn!(value, "priority outside the 0-2 scale");
            if value < 0 { Self::Low } else { Self::High }
        })
    }
}

impl TryFrom<i64> for Priority {
    type Error = CoreError;

    fn try_from(value: i64) -> CoreResult<Self> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::Medium),
            2 => Ok(Self::High),
            other => Err(CoreError::priority_out_of_range(other)),
        }
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric value for a label; unknown labels map to `1` (medium)
#[must_use]
pub fn priority_label_to_value(label: &str) -> i64 {
    Priority::from_label(label).value()
}

/// Label for a numeric value; values off the scale map to `"medium"`
#[must_use]
pub fn priority_value_to_label(value: i64) -> &'static str {
    Priority::try_from(value).unwrap_or_default().label()
}
