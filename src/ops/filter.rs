use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Status filter applied before the text search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
}

impl FilterMode {
    /// All modes in tab order
    pub const ALL: [FilterMode; 4] = [
        FilterMode::All,
        FilterMode::Active,
        FilterMode::Completed,
        FilterMode::Overdue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
            FilterMode::Overdue => "Overdue",
        }
    }

    /// Next mode in tab order, wrapping around
    pub fn next(self) -> FilterMode {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> FilterMode {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn matches(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
            FilterMode::Overdue => task.is_overdue(now),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" | "done" => Ok(FilterMode::Completed),
            "overdue" => Ok(FilterMode::Overdue),
            other => Err(format!(
                "unknown filter '{}' (expected all, active, completed, overdue)",
                other
            )),
        }
    }
}

/// The tasks to show for a filter mode and search text, in list order.
///
/// Overdue is evaluated against `now`, never cached. The search is a
/// case-insensitive substring match on the description or any subtask text,
/// skipped when the trimmed text is empty.
pub fn visible<'a>(
    tasks: &'a [Task],
    mode: FilterMode,
    search: &str,
    now: DateTime<Utc>,
) -> Vec<&'a Task> {
    let needle = search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| mode.matches(t, now))
        .filter(|t| needle.is_empty() || matches_search(t, &needle))
        .collect()
}

/// `needle` must already be lowercased
fn matches_search(task: &Task, needle: &str) -> bool {
    task.description.to_lowercase().contains(needle)
        || task
            .subtasks
            .iter()
            .any(|s| s.text.to_lowercase().contains(needle))
}

/// Select-all indicator: every visible task is completed.
/// An empty visible set reads as unchecked.
pub fn all_completed(visible: &[&Task]) -> bool {
    !visible.is_empty() && visible.iter().all(|t| t.completed)
}

/// Number of incomplete tasks in the whole list
pub fn remaining(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| !t.completed).count()
}
