//! Refresh-and-retry state machine for one logical API call
//!
//! ```text
//! Requesting(First) ──2xx──────────────▶ Done
//!        │ ──other error───────────────▶ Failed
//!        │ ──401, no refresh token─────▶ SessionExpired
//!        └─401, refresh token──▶ Refreshing ──ok──▶ Requesting(Retry)
//!                                    └──err──▶ SessionExpired
//! Requesting(Retry) ──2xx──▶ Done,  anything else ──▶ Failed
//! ```
//!
//! A retried request can never re-enter `Refreshing`, so each call
//! performs at most one refresh and one retry.

use reqwest::StatusCode;

/// Which attempt of a call is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// State of a call; `R` is whatever carries the server response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallState<R> {
    Requesting(Attempt),
    Refreshing { refresh_token: String },
    Done(R),
    Failed(R),
    SessionExpired,
}

impl<R> CallState<R> {
    /// Transition out of `Requesting(attempt)` once a response arrives.
    ///
    /// `refresh_token` is only consulted for a first-attempt 401.
    pub fn on_response(
        attempt: Attempt,
        status: StatusCode,
        response: R,
        refresh_token: impl FnOnce() -> Option<String>,
    ) -> Self {
        if status.is_success() {
            return Self::Done(response);
        }

        match (status, attempt) {
            (StatusCode::UNAUTHORIZED, Attempt::First) => match refresh_token() {
                Some(refresh_token) => Self::Refreshing { refresh_token },
                None => Self::SessionExpired,
            },
            _ => Self::Failed(response),
        }
    }

    /// Transition out of `Refreshing`
    #[must_use]
    pub const fn on_refresh(refreshed: bool) -> Self {
        if refreshed {
            Self::Requesting(Attempt::Retry)
        } else {
            Self::SessionExpired
        }
    }

    /// Whether the call has finished
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_) | Self::SessionExpired)
    }
}
