//! Terminal rendering of tasks and predictions

use chrono::{DateTime, Utc};
use taskdash_core::{Task, TaskStats, days_until_due, is_overdue, priority_badge};

/// One-line summary of a task
pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "#{:<5} {:<12} {:<7} {}",
        task.id,
        task.status.label(),
        priority_badge(task.priority).label,
        task.title
    );

    if is_overdue(task, now) {
        line.push_str("  (overdue)");
    } else if let Some(days) = days_until_due(task.due_date.as_deref()) {
        match days {
            0 => line.push_str("  (due today)"),
            1 => line.push_str("  (due tomorrow)"),
            n => line.push_str(&format!("  (due in {n} days)")),
        }
    }

    line
}

/// Multi-line detail view of a task
pub fn task_detail(task: &Task, now: DateTime<Utc>) -> String {
    let mut out = task_line(task, now);
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str("\n\n");
        out.push_str(description);
    }
    if let Some(due) = &task.due_date {
        out.push_str(&format!("\n\nDue: {due}"));
    }
    out
}

pub fn stats_block(stats: &TaskStats) -> String {
    format!(
        "Total:       {}\nPending:     {}\nIn Progress: {}\nCompleted:   {}\nOverdue:     {}",
        stats.total, stats.pending, stats.in_progress, stats.completed, stats.overdue
    )
}
