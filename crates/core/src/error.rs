//! Common error types for core operations

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Core error types shared across crates
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum CoreError {
    #[error("Priority {value} is outside the 0-2 scale")]
    PriorityOutOfRange { value: i64 },

    #[error("Invalid date: {input}")]
    InvalidDate { input: String },
}

impl CoreError {
    /// Create an out-of-range priority error
    pub const fn priority_out_of_range(value: i64) -> Self {
        Self::PriorityOutOfRange { value }
    }

    /// Create an invalid date error
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
        }
    }
}
