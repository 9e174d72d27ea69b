use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::model::task::TaskList;
use crate::ops::task_ops::TaskError;

/// Which deadline transition a task crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineKind {
    /// Deadline is within the soon window and has not passed
    Soon,
    /// Deadline has passed on an incomplete task
    Overdue,
}

/// A notification-worthy transition found by `check_deadlines`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineEvent {
    pub kind: DeadlineKind,
    pub task_id: u64,
    pub description: String,
    pub deadline: DateTime<Utc>,
}

impl DeadlineEvent {
    pub fn title(&self) -> &'static str {
        match self.kind {
            DeadlineKind::Soon => "Task due soon",
            DeadlineKind::Overdue => "Task overdue",
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            DeadlineKind::Soon => format!(
                "\"{}\" is due {}",
                self.description,
                format_deadline(self.deadline)
            ),
            DeadlineKind::Overdue => format!(
                "\"{}\" was due {}",
                self.description,
                format_deadline(self.deadline)
            ),
        }
    }
}

/// Flag soon-due and overdue transitions.
///
/// Each task fires at most one Soon and one Overdue event per deadline value;
/// the `notified_*` flags record what already fired and `edit_task` clears
/// them. Completed tasks never fire. The caller persists the list when the
/// returned vector is non-empty.
pub fn check_deadlines(
    list: &mut TaskList,
    now: DateTime<Utc>,
    soon_window: Duration,
) -> Vec<DeadlineEvent> {
    let mut events = Vec::new();
    for task in list.tasks.iter_mut() {
        if task.completed {
            continue;
        }
        let Some(deadline) = task.deadline else {
            continue;
        };

        let kind = if deadline < now {
            if task.notified_overdue {
                continue;
            }
            task.notified_overdue = true;
            DeadlineKind::Overdue
        } else if deadline - now <= soon_window {
            if task.notified_soon {
                continue;
            }
            task.notified_soon = true;
            DeadlineKind::Soon
        } else {
            continue;
        };

        events.push(DeadlineEvent {
            kind,
            task_id: task.id,
            description: task.description.clone(),
            deadline,
        });
    }
    events
}

/// Parse a user-typed deadline in local time. Empty input means no deadline.
pub fn parse_deadline_input(input: &str) -> Result<Option<DateTime<Utc>>, TaskError> {
    parse_deadline_in(input, &Local)
}

/// Parse a user-typed deadline relative to `tz`.
///
/// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM`, a bare date (taken as
/// 23:59 that day) or a full RFC 3339 timestamp.
pub fn parse_deadline_in<Tz: TimeZone>(
    input: &str,
    tz: &Tz,
) -> Result<Option<DateTime<Utc>>, TaskError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(23, 59, 0))
        })
        .ok_or_else(|| TaskError::InvalidDeadline(input.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .ok_or_else(|| TaskError::InvalidDeadline(input.to_string()))
}

/// Localized display form of a deadline
pub fn format_deadline(deadline: DateTime<Utc>) -> String {
    format_deadline_in(deadline, &Local)
}

pub fn format_deadline_in<Tz: TimeZone>(deadline: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    deadline
        .with_timezone(tz)
        .format("%b %-d, %Y %H:%M")
        .to_string()
}

/// Editable form of a deadline, the inverse of `parse_deadline_input`
pub fn deadline_input_value(deadline: Option<DateTime<Utc>>) -> String {
    deadline
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
