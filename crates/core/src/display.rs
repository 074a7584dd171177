//! Display mapping for status and priority badges

use crate::priority::Priority;
use crate::task::TaskStatus;

/// A badge: the text shown and the theme tone (CSS custom property) used
/// to colour it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub tone: &'static str,
}

impl TaskStatus {
    /// Title-cased label, e.g. `"In Progress"`
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Badge for this status
    #[must_use]
    pub const fn badge(self) -> Badge {
        let tone = match self {
            Self::Pending => "--status-pending",
            Self::InProgress => "--status-in-progress",
            Self::Completed => "--status-completed",
        };
        Badge {
            label: self.label(),
            tone,
        }
    }
}

impl Priority {
    /// Badge for this level
    #[must_use]
    pub const fn badge(self) -> Badge {
        match self {
            Self::Low => Badge {
                label: "Low",
                tone: "--priority-low",
            },
            Self::Medium => Badge {
                label: "Medium",
                tone: "--priority-medium",
            },
            Self::High => Badge {
                label: "High",
                tone: "--priority-high",
            },
        }
    }
}

/// Badge for a raw numeric priority.
///
/// Values above the scale show as high and values below it as low; both
/// are logged by [`Priority::saturating_from_value`].
#[must_use]
pub fn priority_badge(value: i64) -> Badge {
    Priority::saturating_from_value(value).badge()
}

/// Title-case a raw status string the way badges show it
/// (`"in_progress"` becomes `"In Progress"`).
#[must_use]
pub fn format_status(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_distinct_tone() {
        let tones: Vec<_> = TaskStatus::ALL.iter().map(|s| s.badge().tone).collect();
        assert_eq!(
            tones,
            ["--status-pending", "--status-in-progress", "--status-completed"]
        );
    }

    #[test]
    fn status_labels_match_formatting() {
        for status in TaskStatus::ALL {
            assert_eq!(format_status(status.as_str()), status.label());
        }
    }

    #[test]
    fn priority_badges_follow_the_scale() {
        assert_eq!(priority_badge(0).label, "Low");
        assert_eq!(priority_badge(1).label, "Medium");
        assert_eq!(priority_badge(2).tone, "--priority-high");
    }

    #[test]
    fn out_of_range_priorities_saturate() {
        assert_eq!(priority_badge(7).label, "High");
        assert_eq!(priority_badge(-3).label, "Low");
    }
}
