//! Request and response shapes of the `/ml` prediction endpoints

use crate::due::days_until_due_from;
use crate::priority::Priority;
use crate::task::{Task, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /ml/predict/completion-time`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionTimeRequest {
    /// Length of the task description (backend accepts 1-1000)
    pub description_length: u32,
    pub priority: i64,
    pub user_experience: u32,
    pub is_complex: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_due: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Description lengths the completion-time model accepts
const DESCRIPTION_LENGTH_RANGE: (u32, u32) = (1, 1000);

impl CompletionTimeRequest {
    /// Features of a stored task, as of `today`.
    ///
    /// The description length is counted in characters and clamped to what
    /// the model accepts.
    #[must_use]
    pub fn for_task(task: &Task, user_experience: u32, is_complex: bool, today: NaiveDate) -> Self {
        let length = task
            .description
            .as_deref()
            .map_or(0, |description| description.chars().count());
        let (min, max) = DESCRIPTION_LENGTH_RANGE;

        Self {
            description_length: u32::try_from(length).unwrap_or(max).clamp(min, max),
            priority: task.priority,
            user_experience,
            is_complex,
            days_until_due: days_until_due_from(task.due_date.as_deref(), today),
            status: Some(task.status),
        }
    }
}

/// Response of `POST /ml/predict/completion-time`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionTimePrediction {
    pub predicted_hours: f64,
    #[serde(default)]
    pub input_features: Map<String, Value>,
}

/// Body of `POST /ml/predict/priority`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_due: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl PriorityRequest {
    /// Ask about a stored task: its description, or the title when the
    /// description is blank
    #[must_use]
    pub fn for_task(task: &Task, today: NaiveDate) -> Self {
        let text = task
            .description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .unwrap_or(&task.title);

        Self {
            text: text.to_string(),
            days_until_due: days_until_due_from(task.due_date.as_deref(), today),
            status: Some(task.status),
        }
    }
}

/// Per-level confidence scores, each in `0.0..=1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityConfidence {
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub medium: f64,
    #[serde(default)]
    pub high: f64,
}

impl PriorityConfidence {
    /// Confidence for one level of the scale
    #[must_use]
    pub const fn for_priority(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
        }
    }
}

/// Response of `POST /ml/predict/priority`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityPrediction {
    /// `"low"`, `"medium"` or `"high"`
    pub predicted_priority: String,
    #[serde(default)]
    pub confidence: PriorityConfidence,
}

impl PriorityPrediction {
    /// The suggested priority; unknown labels fall back to medium
    #[must_use]
    pub fn priority(&self) -> Priority {
        Priority::from_label(&self.predicted_priority)
    }

    /// Confidence attached to the suggested level
    #[must_use]
    pub fn suggested_confidence(&self) -> f64 {
        self.confidence.for_priority(self.priority())
    }
}

/// Body of `POST /ml/predict/batch` (the backend caps this at 100 tasks)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchCompletionTimeRequest {
    pub tasks: Vec<CompletionTimeRequest>,
}

/// Response of `POST /ml/predict/batch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCompletionTimePrediction {
    pub predictions: Vec<f64>,
    pub total_predicted_hours: f64,
}

/// Response of `GET /ml/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlHealth {
    pub status: String,
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub details: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_request_skips_unknown_due_date() {
        let request = CompletionTimeRequest {
            description_length: 120,
            priority: 1,
            user_experience: 2,
            is_complex: false,
            days_until_due: None,
            status: Some(TaskStatus::Pending),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("days_until_due").is_none());
        assert_eq!(value["status"], "pending");
    }

    fn stored_task(description: Option<&str>, due_date: Option<&str>) -> Task {
        Task {
            id: 7,
            title: "Renew certificates".into(),
            description: description.map(str::to_string),
            priority: 2,
            due_date: due_date.map(str::to_string),
            status: TaskStatus::InProgress,
            owner_id: None,
            completed: false,
        }
    }

    #[test]
    fn completion_features_come_from_the_task() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let task = stored_task(Some("Rotate the wildcard cert"), Some("2024-03-15"));

        let request = CompletionTimeRequest::for_task(&task, 3, true, today);
        assert_eq!(request.description_length, 24);
        assert_eq!(request.priority, 2);
        assert_eq!(request.user_experience, 3);
        assert!(request.is_complex);
        assert_eq!(request.days_until_due, Some(5));
        assert_eq!(request.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn completion_description_length_stays_in_model_range() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let empty = CompletionTimeRequest::for_task(&stored_task(None, None), 1, false, today);
        assert_eq!(empty.description_length, 1);
        assert_eq!(empty.days_until_due, None);

        let long = "x".repeat(4000);
        let capped = CompletionTimeRequest::for_task(&stored_task(Some(&long), None), 1, false, today);
        assert_eq!(capped.description_length, 1000);
    }

    #[test]
    fn priority_text_falls_back_to_title() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let request = PriorityRequest::for_task(&stored_task(Some("  "), Some("2024-03-11")), today);
        assert_eq!(request.text, "Renew certificates");
        assert_eq!(request.days_until_due, Some(1));

        let request = PriorityRequest::for_task(&stored_task(Some("urgent: expires friday"), None), today);
        assert_eq!(request.text, "urgent: expires friday");
        assert_eq!(request.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn priority_prediction_picks_matching_confidence() {
        let prediction: PriorityPrediction = serde_json::from_value(json!({
            "predicted_priority": "high",
            "confidence": { "low": 0.1, "medium": 0.2, "high": 0.7 }
        }))
        .unwrap();

        assert_eq!(prediction.priority(), Priority::High);
        assert!((prediction.suggested_confidence() - 0.7).abs() < f64::EPSILON);
    }
}
