use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ops::deadline::{deadline_input_value, parse_deadline_input};
use crate::ops::filter;
use crate::ops::task_ops::{self, TaskError};

use super::app::App;
use super::popup::Severity;

/// A user interaction routed to a model operation, keyed by task/subtask id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Raw deadline text as typed; empty means no deadline
    AddTask { description: String, deadline: String },
    SaveEdit {
        task_id: u64,
        description: String,
        deadline: String,
    },
    ToggleTask(u64),
    DeleteTask(u64),
    /// Check or uncheck every visible task
    ToggleAll,
    AddSubtask { task_id: u64, text: String },
    ToggleSubtask { task_id: u64, subtask_id: i64 },
    DeleteSubtask { task_id: u64, subtask_id: i64 },
    /// Move `moved` to just before `target`
    Reorder { moved: u64, target: u64 },
}

/// What a successful action did to the model
enum Effect {
    Unchanged,
    Changed,
    /// Changed, with a confirmation popup
    Announce(String),
}

impl App {
    /// Run an action against the model. Success persists the collection,
    /// rebuilds the rows and returns true; failure shows an error popup and
    /// leaves the model and the store untouched.
    pub fn dispatch(&mut self, action: Action) -> bool {
        self.dispatch_at(action, Utc::now())
    }

    pub fn dispatch_at(&mut self, action: Action, now: DateTime<Utc>) -> bool {
        debug!(?action, "dispatch");
        // Held from the reload through the save
        let lock = self.lock_store(now);
        match self.apply(action, now) {
            Ok(Effect::Unchanged) => true,
            Ok(effect) => {
                self.persist(lock.as_ref());
                self.refresh_at(now);
                if let Effect::Announce(message) = effect {
                    self.popups.show(message, Severity::Success);
                }
                true
            }
            Err(e) => {
                debug!(error = %e, "action rejected");
                self.popups.show(capitalize(&e.to_string()), Severity::Error);
                false
            }
        }
    }

    fn apply(&mut self, action: Action, now: DateTime<Utc>) -> Result<Effect, TaskError> {
        let list = &mut self.tasks;
        match action {
            Action::AddTask {
                description,
                deadline,
            } => {
                let deadline = parse_deadline_input(&deadline)?;
                task_ops::add_task(list, &description, deadline, now)?;
                Ok(Effect::Announce("Task added".into()))
            }
            Action::SaveEdit {
                task_id,
                description,
                deadline,
            } => {
                let task = task_ops::find_task(list, task_id).ok_or(TaskError::NotFound(task_id))?;
                let completed = task.completed;
                // The field shows minutes only; untouched text keeps the exact deadline
                let deadline = if deadline == deadline_input_value(task.deadline) {
                    task.deadline
                } else {
                    parse_deadline_input(&deadline)?
                };
                task_ops::edit_task(list, task_id, &description, deadline, completed, now)?;
                Ok(Effect::Announce("Task updated".into()))
            }
            Action::ToggleTask(task_id) => {
                let completed = task_ops::find_task(list, task_id)
                    .ok_or(TaskError::NotFound(task_id))?
                    .completed;
                task_ops::toggle_completed(list, task_id, !completed)?;
                Ok(Effect::Changed)
            }
            Action::DeleteTask(task_id) => {
                let removed = task_ops::delete_task(list, task_id)?;
                Ok(Effect::Announce(format!("Deleted \"{}\"", removed.description)))
            }
            Action::ToggleAll => {
                let visible = filter::visible(&list.tasks, self.filter, self.search.value(), now);
                if visible.is_empty() {
                    return Ok(Effect::Unchanged);
                }
                let value = !filter::all_completed(&visible);
                let ids: Vec<u64> = visible.iter().map(|t| t.id).collect();
                task_ops::set_all_completed(list, &ids, value);
                Ok(Effect::Changed)
            }
            Action::AddSubtask { task_id, text } => {
                task_ops::add_subtask(list, task_id, &text, now)?;
                Ok(Effect::Changed)
            }
            Action::ToggleSubtask {
                task_id,
                subtask_id,
            } => {
                let completed = task_ops::find_task(list, task_id)
                    .and_then(|t| t.find_subtask(subtask_id))
                    .ok_or(TaskError::SubtaskNotFound {
                        task_id,
                        subtask_id,
                    })?
                    .completed;
                task_ops::toggle_subtask(list, task_id, subtask_id, !completed)?;
                Ok(Effect::Changed)
            }
            Action::DeleteSubtask {
                task_id,
                subtask_id,
            } => {
                task_ops::delete_subtask(list, task_id, subtask_id)?;
                Ok(Effect::Changed)
            }
            Action::Reorder { moved, target } => {
                if task_ops::reorder(list, moved, target)? {
                    Ok(Effect::Changed)
                } else {
                    Ok(Effect::Unchanged)
                }
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
