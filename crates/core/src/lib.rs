//! Taskdash core types and derived-state helpers

pub mod display;
pub mod due;
pub mod error;
pub mod ml;
pub mod priority;
pub mod stats;
pub mod task;
pub mod types;

pub use display::{Badge, format_status, priority_badge};
pub use due::{
    days_until_due, days_until_due_from, is_overdue, parse_due_instant, require_due_instant,
};
pub use error::{CoreError, CoreResult};
pub use priority::{Priority, priority_label_to_value, priority_value_to_label};
pub use stats::TaskStats;
pub use task::{ImportSummary, Task, TaskCreate, TaskId, TaskStatus, TaskUpdate};
pub use types::{
    LinkedAccount, OAuthLinkUrl, OAuthProviders, RefreshRequest, RegisterRequest,
    SetPasswordRequest, TokenResponse, User, UserUpdate,
};
