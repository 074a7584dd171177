//! Dashboard summary counts

use crate::due::is_overdue;
use crate::task::{Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts shown on the dashboard cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl TaskStats {
    /// Summarize a task list as of `now`
    #[must_use]
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            if is_overdue(task, now) {
                stats.overdue += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, status: TaskStatus, due_date: Option<&str>) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: None,
            priority: 1,
            due_date: due_date.map(str::to_string),
            status,
            owner_id: None,
            completed: status == TaskStatus::Completed,
        }
    }

    #[test]
    fn counts_by_status_and_overdue() {
        let tasks = vec![
            task(1, TaskStatus::Pending, Some("2000-01-01")),
            task(2, TaskStatus::Pending, None),
            task(3, TaskStatus::InProgress, Some("2999-01-01")),
            task(4, TaskStatus::Completed, Some("2000-01-01")),
        ];

        let stats = TaskStats::from_tasks(&tasks, Utc::now());
        assert_eq!(
            stats,
            TaskStats {
                total: 4,
                pending: 2,
                in_progress: 1,
                completed: 1,
                overdue: 1,
            }
        );
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(TaskStats::from_tasks(&[], Utc::now()), TaskStats::default());
    }
}
