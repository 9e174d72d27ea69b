use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a task came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Created by the user
    #[default]
    User,
    /// Imported by the one-time seed load
    Api,
}

/// A checklist item nested under a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Unique within the parent task (epoch milliseconds at creation)
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// A task with its deadline, subtasks and notification bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub source: Source,
    #[serde(default, with = "deadline_format")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// A "due soon" notification has fired for the current deadline
    #[serde(default)]
    pub notified_soon: bool,
    /// An "overdue" notification has fired for the current deadline
    #[serde(default)]
    pub notified_overdue: bool,
}

impl Task {
    /// Create a new incomplete user task with no deadline or subtasks
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Task {
            id,
            description: description.into(),
            completed: false,
            source: Source::User,
            deadline: None,
            subtasks: Vec::new(),
            notified_soon: false,
            notified_overdue: false,
        }
    }

    /// Incomplete, has a deadline, and the deadline is strictly before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline.is_some_and(|d| d < now)
    }

    pub fn find_subtask(&self, subtask_id: i64) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    pub fn find_subtask_mut(&mut self, subtask_id: i64) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|s| s.id == subtask_id)
    }
}

/// The ordered task collection and its identity counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    /// Always greater than every task id in `tasks`
    pub next_id: u64,
}

impl Default for TaskList {
    fn default() -> Self {
        TaskList {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl TaskList {
    /// Wrap loaded tasks, recomputing the id counter from the largest id.
    ///
    /// `None` when the largest id is `u64::MAX` and no counter can exceed it.
    pub fn from_tasks(tasks: Vec<Task>) -> Option<Self> {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0).checked_add(1)?;
        Some(TaskList { tasks, next_id })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Deadline (de)serialization.
///
/// Written as RFC 3339 UTC with millisecond precision. Read leniently: any
/// RFC 3339 offset, a naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (taken as UTC), or
/// a bare date (UTC midnight). `null` and absent both mean no deadline.
pub mod deadline_format {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid deadline: {}", s))),
        }
    }

    /// Parse a stored timestamp in any of the accepted shapes
    pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn overdue_requires_incomplete_task_with_past_deadline() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut task = Task::new(1, "Pay rent");
        assert!(!task.is_overdue(now));

        task.deadline = Some(now - chrono::Duration::minutes(1));
        assert!(task.is_overdue(now));

        task.completed = true;
        assert!(!task.is_overdue(now));

        task.completed = false;
        task.deadline = Some(now);
        assert!(!task.is_overdue(now)); // strictly before
    }

    #[test]
    fn next_id_follows_largest_id() {
        let list =
            TaskList::from_tasks(vec![Task::new(4, "a"), Task::new(9, "b"), Task::new(2, "c")])
                .unwrap();
        assert_eq!(list.next_id, 10);
        assert_eq!(TaskList::from_tasks(Vec::new()).unwrap().next_id, 1);
    }

    #[test]
    fn max_id_leaves_no_counter() {
        assert!(TaskList::from_tasks(vec![Task::new(u64::MAX, "last")]).is_none());
    }

    #[test]
    fn serializes_camel_case_with_canonical_deadline() {
        let mut task = Task::new(3, "Ship it");
        task.deadline = Some(Utc.with_ymd_and_hms(2026, 10, 17, 18, 0, 0).unwrap());
        task.notified_soon = true;
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["deadline"], "2026-10-17T18:00:00.000Z");
        assert_eq!(json["notifiedSoon"], true);
        assert_eq!(json["notifiedOverdue"], false);
        assert_eq!(json["source"], "user");
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let task: Task =
            serde_json::from_str(r#"{"id":1,"description":"x","extra":"ignored"}"#).unwrap();
        assert!(!task.completed);
        assert_eq!(task.source, Source::User);
        assert!(task.deadline.is_none());
        assert!(task.subtasks.is_empty());
        assert!(!task.notified_soon && !task.notified_overdue);
    }

    #[test]
    fn deadline_accepts_lenient_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 0).unwrap();
        for raw in [
            "2026-01-02T03:04:00.000Z",
            "2026-01-02T05:04:00+02:00",
            "2026-01-02T03:04",
            "2026-01-02T03:04:00",
        ] {
            let json = format!(r#"{{"id":1,"description":"x","deadline":"{}"}}"#, raw);
            let task: Task = serde_json::from_str(&json).unwrap();
            assert_eq!(task.deadline, Some(expected), "shape {}", raw);
        }

        let task: Task =
            serde_json::from_str(r#"{"id":1,"description":"x","deadline":"2026-01-02"}"#).unwrap();
        assert_eq!(
            task.deadline,
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap())
        );

        let task: Task =
            serde_json::from_str(r#"{"id":1,"description":"x","deadline":null}"#).unwrap();
        assert!(task.deadline.is_none());
    }

    #[test]
    fn invalid_deadline_is_an_error() {
        let result: Result<Task, _> =
            serde_json::from_str(r#"{"id":1,"description":"x","deadline":"next tuesday"}"#);
        assert!(result.is_err());
    }
}
