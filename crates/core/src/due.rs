//! Due-date arithmetic

use crate::error::{CoreError, CoreResult};
use crate::task::{Task, TaskStatus};
use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Granularity used to step over a skipped stretch of local time
const GAP_STEP_MINUTES: i64 = 15;
/// No zone skips more than a day
const GAP_MAX_STEPS: i64 = 24 * 60 / GAP_STEP_MINUTES;

/// A due date as the backend or the user wrote it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DueDate {
    /// RFC 3339, offset included
    Instant(DateTime<FixedOffset>),
    /// Wall-clock time with no offset, read as local time
    Local(NaiveDateTime),
    /// Calendar date only
    Date(NaiveDate),
}

impl DueDate {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
            return Some(Self::Instant(instant));
        }

        NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .map(Self::Local)
            .or_else(|| {
                NaiveDate::parse_from_str(input, "%Y-%m-%d")
                    .ok()
                    .map(Self::Date)
            })
    }

    fn instant(self) -> Option<DateTime<Utc>> {
        let naive = match self {
            Self::Instant(instant) => return Some(instant.with_timezone(&Utc)),
            Self::Local(naive) => naive,
            Self::Date(date) => date.and_time(NaiveTime::MIN),
        };
        resolve_local(naive, |wall| Local.from_local_datetime(wall))
    }

    fn local_date(self) -> NaiveDate {
        match self {
            Self::Instant(instant) => instant.with_timezone(&Local).date_naive(),
            Self::Local(naive) => naive.date(),
            Self::Date(date) => date,
        }
    }
}

/// Map a wall-clock time to an instant through `lookup`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// do not exist (clocks jumping forward) move to the first valid wall-clock
/// time after the gap.
fn resolve_local<Tz, F>(naive: NaiveDateTime, lookup: F) -> Option<DateTime<Utc>>
where
    Tz: TimeZone,
    F: Fn(&NaiveDateTime) -> LocalResult<DateTime<Tz>>,
{
    (0..=GAP_MAX_STEPS).find_map(|step| {
        let wall = naive.checked_add_signed(Duration::minutes(step * GAP_STEP_MINUTES))?;
        lookup(&wall).earliest().map(|local| local.with_timezone(&Utc))
    })
}

/// Parse a due date into an instant.
///
/// Accepts RFC 3339 timestamps, naive datetimes (read as local time) and
/// plain `YYYY-MM-DD` dates (local midnight, or the first valid time after
/// it when midnight is skipped). Returns `None` for anything else.
#[must_use]
pub fn parse_due_instant(input: &str) -> Option<DateTime<Utc>> {
    DueDate::parse(input)?.instant()
}

/// Like [`parse_due_instant`], reporting unparsable input as an error
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] when `input` is not a recognised date.
pub fn require_due_instant(input: &str) -> CoreResult<DateTime<Utc>> {
    parse_due_instant(input).ok_or_else(|| CoreError::invalid_date(input))
}

/// Calendar date (local time) a due date falls on.
///
/// Dates and naive datetimes are already local, so only RFC 3339 input is
/// converted.
#[must_use]
pub fn due_date_local(input: &str) -> Option<NaiveDate> {
    DueDate::parse(input).map(DueDate::local_date)
}

/// Whole days from today until the due date, never negative.
///
/// Both ends are normalized to local midnight, so a task due later today
/// yields `0` and one due tomorrow yields `1`. Missing or unparsable input
/// yields `None`, which callers treat as "unknown" and leave out of request
/// payloads.
#[must_use]
pub fn days_until_due(input: Option<&str>) -> Option<u32> {
    days_until_due_from(input, Local::now().date_naive())
}

/// [`days_until_due`] against an explicit `today`
#[must_use]
pub fn days_until_due_from(input: Option<&str>, today: NaiveDate) -> Option<u32> {
    let due = due_date_local(input?)?;
    let days = (due - today).num_days().max(0);
    Some(u32::try_from(days).unwrap_or(u32::MAX))
}

/// A task is overdue when it has a due date in the past and is not completed
#[must_use]
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    if task.status == TaskStatus::Completed {
        return false;
    }

    task.due_date
        .as_deref()
        .and_then(parse_due_instant)
        .is_some_and(|due| due < now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_due(due_date: Option<&str>, status: TaskStatus) -> Task {
        Task {
            id: 1,
            title: "t".into(),
            description: None,
            priority: 1,
            due_date: due_date.map(str::to_string),
            status,
            owner_id: None,
            completed: status == TaskStatus::Completed,
        }
    }

    #[test]
    fn future_date_counts_calendar_days() {
        let today = date(2024, 3, 10);
        assert_eq!(days_until_due_from(Some("2024-03-13"), today), Some(3));
        assert_eq!(days_until_due_from(Some("2024-03-13T18:45:00"), today), Some(3));
        assert_eq!(days_until_due_from(Some("2024-04-10"), today), Some(31));
    }

    #[test]
    fn today_plus_three_from_the_clock() {
        let due = (Local::now().date_naive() + Duration::days(3))
            .format("%Y-%m-%d")
            .to_string();
        assert_eq!(days_until_due(Some(&due)), Some(3));
    }

    #[test]
    fn past_and_same_day_are_zero() {
        let today = date(2024, 3, 10);
        assert_eq!(days_until_due_from(Some("2024-03-10"), today), Some(0));
        assert_eq!(days_until_due_from(Some("2024-03-01"), today), Some(0));
        assert_eq!(days_until_due_from(Some("1999-12-31"), today), Some(0));
    }

    #[test]
    fn invalid_or_missing_is_unknown() {
        let today = date(2024, 3, 10);
        assert_eq!(days_until_due_from(None, today), None);
        assert_eq!(days_until_due_from(Some(""), today), None);
        assert_eq!(days_until_due_from(Some("next tuesday"), today), None);
        assert_eq!(days_until_due_from(Some("2024-13-45"), today), None);
    }

    #[test]
    fn rfc3339_is_accepted() {
        assert!(parse_due_instant("2024-03-13T10:00:00Z").is_some());
        assert!(parse_due_instant("2024-03-13T10:00:00+02:00").is_some());
        assert!(parse_due_instant("2024-03-13T10:00:00.123456").is_some());
    }

    #[test]
    fn date_only_ignores_skipped_midnight() {
        // Sao Paulo skipped 00:00-01:00 on 2018-11-04; the calendar date still counts
        let today = date(2018, 11, 1);
        assert_eq!(days_until_due_from(Some("2018-11-04"), today), Some(3));
        assert_eq!(days_until_due_from(Some("2018-11-04T00:30:00"), today), Some(3));
        assert_eq!(due_date_local("2018-11-04"), Some(date(2018, 11, 4)));
    }

    fn sao_paulo_2018(wall: &NaiveDateTime) -> LocalResult<DateTime<FixedOffset>> {
        let before = FixedOffset::west_opt(3 * 3600).unwrap();
        let after = FixedOffset::west_opt(2 * 3600).unwrap();
        let gap_start = date(2018, 11, 4).and_hms_opt(0, 0, 0).unwrap();
        let gap_end = date(2018, 11, 4).and_hms_opt(1, 0, 0).unwrap();

        if *wall < gap_start {
            before.from_local_datetime(wall)
        } else if *wall < gap_end {
            LocalResult::None
        } else {
            after.from_local_datetime(wall)
        }
    }

    #[test]
    fn skipped_local_time_moves_past_the_gap() {
        let midnight = date(2018, 11, 4).and_hms_opt(0, 0, 0).unwrap();
        let resolved = resolve_local(midnight, sao_paulo_2018).unwrap();
        // 01:00 at UTC-2
        assert_eq!(resolved, Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap());

        let evening = date(2018, 11, 3).and_hms_opt(22, 0, 0).unwrap();
        assert_eq!(
            resolve_local(evening, sao_paulo_2018),
            Some(Utc.with_ymd_and_hms(2018, 11, 4, 1, 0, 0).unwrap())
        );
    }

    #[test]
    fn repeated_local_time_takes_the_earlier_instant() {
        let wall = date(2024, 11, 3).and_hms_opt(1, 30, 0).unwrap();
        let resolved = resolve_local(wall, |wall: &NaiveDateTime| {
            let daylight = FixedOffset::west_opt(4 * 3600).unwrap();
            let standard = FixedOffset::west_opt(5 * 3600).unwrap();
            match (daylight.from_local_datetime(wall), standard.from_local_datetime(wall)) {
                (LocalResult::Single(first), LocalResult::Single(second)) => {
                    LocalResult::Ambiguous(first, second)
                }
                _ => LocalResult::None,
            }
        });
        assert_eq!(resolved, Some(Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap()));
    }

    #[test]
    fn strict_parse_reports_input() {
        assert!(require_due_instant("2024-03-13").is_ok());
        assert_eq!(
            require_due_instant("soon"),
            Err(CoreError::InvalidDate {
                input: "soon".to_string()
            })
        );
    }

    #[test]
    fn overdue_requires_past_date_and_open_status() {
        let now = Utc::now();
        assert!(is_overdue(&task_due(Some("2000-01-01"), TaskStatus::Pending), now));
        assert!(is_overdue(&task_due(Some("2000-01-01T09:00:00Z"), TaskStatus::InProgress), now));
        assert!(!is_overdue(&task_due(Some("2000-01-01"), TaskStatus::Completed), now));
        assert!(!is_overdue(&task_due(Some("2999-01-01"), TaskStatus::Pending), now));
        assert!(!is_overdue(&task_due(None, TaskStatus::Pending), now));
        assert!(!is_overdue(&task_due(Some("garbage"), TaskStatus::Pending), now));
    }
}
