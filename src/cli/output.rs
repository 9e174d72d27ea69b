use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::task::{Source, Subtask, Task};
use crate::ops::deadline::{DeadlineEvent, DeadlineKind, format_deadline};
use crate::ops::filter::FilterMode;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: u64,
    pub description: String,
    pub completed: bool,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub overdue: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskJson>,
}

#[derive(Serialize)]
pub struct SubtaskJson {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJson {
    pub filter: FilterMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub items_left: usize,
    pub all_visible_completed: bool,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineEventJson {
    pub kind: &'static str,
    pub task_id: u64,
    pub description: String,
    pub deadline: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, now: DateTime<Utc>) -> TaskJson {
    TaskJson {
        id: task.id,
        description: task.description.clone(),
        completed: task.completed,
        source: task.source,
        deadline: task.deadline.map(|d| d.to_rfc3339()),
        overdue: task.is_overdue(now),
        subtasks: task.subtasks.iter().map(subtask_to_json).collect(),
    }
}

fn subtask_to_json(sub: &Subtask) -> SubtaskJson {
    SubtaskJson {
        id: sub.id,
        text: sub.text.clone(),
        completed: sub.completed,
    }
}

pub fn event_to_json(event: &DeadlineEvent) -> DeadlineEventJson {
    DeadlineEventJson {
        kind: match event.kind {
            DeadlineKind::Soon => "soon",
            DeadlineKind::Overdue => "overdue",
        },
        task_id: event.task_id,
        description: event.description.clone(),
        deadline: event.deadline.to_rfc3339(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// One-line task summary: `[x] 12 Buy milk  (due 2030-01-15 18:00)`
pub fn format_task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mut line = format!("{} {} {}", checkbox(task.completed), task.id, task.description);
    if let Some(deadline) = task.deadline {
        let label = if task.is_overdue(now) { "overdue" } else { "due" };
        line.push_str(&format!("  ({} {})", label, format_deadline(deadline)));
    }
    if task.source == Source::Api {
        line.push_str("  [sample]");
    }
    line
}

/// Task followed by its subtasks, indented
pub fn format_task_tree(task: &Task, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format_task_line(task, now)];
    for sub in &task.subtasks {
        lines.push(format!("    {} {} {}", checkbox(sub.completed), sub.id, sub.text));
    }
    lines
}

pub fn format_items_left(count: usize) -> String {
    match count {
        1 => "1 item left".to_string(),
        n => format!("{} items left", n),
    }
}

pub fn format_event(event: &DeadlineEvent) -> String {
    format!("{}: {}", event.title(), event.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn task_line_marks_completion_and_source() {
        let mut task = Task::new(3, "Read book");
        task.completed = true;
        task.source = Source::Api;
        assert_eq!(format_task_line(&task, now()), "[x] 3 Read book  [sample]");
    }

    #[test]
    fn task_line_labels_overdue() {
        let mut task = Task::new(1, "Pay rent");
        task.deadline = Some(Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap());
        let line = format_task_line(&task, now());
        assert!(line.starts_with("[ ] 1 Pay rent  (overdue "), "{line}");
    }

    #[test]
    fn tree_indents_subtasks() {
        let mut task = Task::new(1, "Trip");
        task.subtasks.push(Subtask {
            id: 5,
            text: "pack".into(),
            completed: false,
        });
        let lines = format_task_tree(&task, now());
        assert_eq!(lines[1], "    [ ] 5 pack");
    }

    #[test]
    fn items_left_pluralizes() {
        assert_eq!(format_items_left(0), "0 items left");
        assert_eq!(format_items_left(1), "1 item left");
        assert_eq!(format_items_left(4), "4 items left");
    }

    #[test]
    fn json_omits_empty_fields() {
        let json = serde_json::to_value(task_to_json(&Task::new(2, "x"), now())).unwrap();
        assert_eq!(json["source"], "user");
        assert!(json.get("deadline").is_none());
        assert!(json.get("subtasks").is_none());
    }
}
