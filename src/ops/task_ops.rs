use chrono::{DateTime, SubsecRound, Utc};

use crate::model::task::{Source, Subtask, Task, TaskList};

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task description cannot be empty")]
    EmptyDescription,
    #[error("subtask text cannot be empty")]
    EmptySubtask,
    #[error("deadline cannot be in the past")]
    DeadlineInPast,
    #[error("invalid deadline: {0}")]
    InvalidDeadline(String),
    #[error("task not found: {0}")]
    NotFound(u64),
    #[error("subtask {subtask_id} not found on task {task_id}")]
    SubtaskNotFound { task_id: u64, subtask_id: i64 },
    #[error("cannot add subtasks to completed task {0}")]
    ParentCompleted(u64),
    #[error("cannot add subtasks to overdue task {0}")]
    ParentOverdue(u64),
    #[error("no task ids left to assign")]
    IdsExhausted,
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Add a task at the front of the list (most recent first).
/// Returns the assigned ID.
pub fn add_task(
    list: &mut TaskList,
    description: &str,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<u64, TaskError> {
    let description = validate_description(description)?;
    let deadline = validate_deadline(deadline, now)?;

    let id = list.next_id;
    let next_id = id.checked_add(1).ok_or(TaskError::IdsExhausted)?;
    let mut task = Task::new(id, description);
    task.deadline = deadline;
    list.tasks.insert(0, task);
    list.next_id = next_id;
    Ok(id)
}

/// Replace a task's description, deadline and completion in place.
/// Both notification flags reset so a changed deadline notifies again.
pub fn edit_task(
    list: &mut TaskList,
    task_id: u64,
    description: &str,
    deadline: Option<DateTime<Utc>>,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    let description = validate_description(description)?;
    let deadline = validate_deadline(deadline, now)?;
    let task = find_task_mut(list, task_id).ok_or(TaskError::NotFound(task_id))?;
    task.description = description;
    task.deadline = deadline;
    task.completed = completed;
    task.notified_soon = false;
    task.notified_overdue = false;
    Ok(())
}

/// Set a task's completion. Subtasks are left alone.
pub fn toggle_completed(list: &mut TaskList, task_id: u64, value: bool) -> Result<(), TaskError> {
    let task = find_task_mut(list, task_id).ok_or(TaskError::NotFound(task_id))?;
    task.completed = value;
    Ok(())
}

/// Remove a task together with its subtasks.
pub fn delete_task(list: &mut TaskList, task_id: u64) -> Result<Task, TaskError> {
    let idx = position(list, task_id).ok_or(TaskError::NotFound(task_id))?;
    Ok(list.tasks.remove(idx))
}

/// Set completion on every listed task (the "select all" control).
/// Unknown IDs are skipped. Returns how many tasks changed.
pub fn set_all_completed(list: &mut TaskList, task_ids: &[u64], value: bool) -> usize {
    let mut changed = 0;
    for task in list.tasks.iter_mut() {
        if task_ids.contains(&task.id) && task.completed != value {
            task.completed = value;
            changed += 1;
        }
    }
    changed
}

// ---------------------------------------------------------------------------
// Subtasks
// ---------------------------------------------------------------------------

/// Append a subtask. Completed and overdue parents refuse new subtasks.
/// Returns the assigned subtask ID.
pub fn add_subtask(
    list: &mut TaskList,
    task_id: u64,
    text: &str,
    now: DateTime<Utc>,
) -> Result<i64, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskError::EmptySubtask);
    }
    let parent = find_task_mut(list, task_id).ok_or(TaskError::NotFound(task_id))?;
    if parent.completed {
        return Err(TaskError::ParentCompleted(task_id));
    }
    if parent.is_overdue(now) {
        return Err(TaskError::ParentOverdue(task_id));
    }

    let max_existing = parent.subtasks.iter().map(|s| s.id).max();
    let stamp = now.timestamp_millis();
    let id = match max_existing {
        Some(max) if max >= stamp => max + 1,
        _ => stamp,
    };
    parent.subtasks.push(Subtask {
        id,
        text: text.to_string(),
        completed: false,
    });
    Ok(id)
}

pub fn toggle_subtask(
    list: &mut TaskList,
    task_id: u64,
    subtask_id: i64,
    value: bool,
) -> Result<(), TaskError> {
    let task = find_task_mut(list, task_id).ok_or(TaskError::NotFound(task_id))?;
    let sub = task
        .find_subtask_mut(subtask_id)
        .ok_or(TaskError::SubtaskNotFound {
            task_id,
            subtask_id,
        })?;
    sub.completed = value;
    Ok(())
}

pub fn delete_subtask(
    list: &mut TaskList,
    task_id: u64,
    subtask_id: i64,
) -> Result<Subtask, TaskError> {
    let task = find_task_mut(list, task_id).ok_or(TaskError::NotFound(task_id))?;
    let idx = task
        .subtasks
        .iter()
        .position(|s| s.id == subtask_id)
        .ok_or(TaskError::SubtaskNotFound {
            task_id,
            subtask_id,
        })?;
    Ok(task.subtasks.remove(idx))
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

/// Move `moved_id` to sit immediately before `target_id`.
///
/// Returns `Ok(false)` when the two IDs are equal. Both IDs are resolved
/// before anything is removed, so a missing target leaves the list untouched.
pub fn reorder(list: &mut TaskList, moved_id: u64, target_id: u64) -> Result<bool, TaskError> {
    if moved_id == target_id {
        return Ok(false);
    }
    let from = position(list, moved_id).ok_or(TaskError::NotFound(moved_id))?;
    if position(list, target_id).is_none() {
        return Err(TaskError::NotFound(target_id));
    }

    let task = list.tasks.remove(from);
    // Target index after removal
    let to = position(list, target_id).unwrap_or(from.min(list.tasks.len()));
    list.tasks.insert(to, task);
    Ok(true)
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// Merge seeded tasks into the list.
///
/// Into an empty list the remote IDs are kept. If the user created tasks
/// while the seed was in flight, seeded tasks go after them and are
/// renumbered from `next_id` so IDs stay unique.
///
/// Nothing changes when the ids would run past `u64::MAX`.
pub fn apply_seed(list: &mut TaskList, seeded: Vec<Task>) -> Result<usize, TaskError> {
    let count = seeded.len();
    if list.tasks.is_empty() {
        let floor = list.next_id;
        let mut seeded_list = TaskList::from_tasks(seeded).ok_or(TaskError::IdsExhausted)?;
        seeded_list.next_id = seeded_list.next_id.max(floor);
        *list = seeded_list;
        return Ok(count);
    }
    let first = list.next_id;
    let next_id = u64::try_from(count)
        .ok()
        .and_then(|n| first.checked_add(n))
        .ok_or(TaskError::IdsExhausted)?;
    for (id, mut task) in (first..).zip(seeded) {
        task.id = id;
        task.source = Source::Api;
        list.tasks.push(task);
    }
    list.next_id = next_id;
    Ok(count)
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task(list: &TaskList, task_id: u64) -> Option<&Task> {
    list.tasks.iter().find(|t| t.id == task_id)
}

pub fn find_task_mut(list: &mut TaskList, task_id: u64) -> Option<&mut Task> {
    list.tasks.iter_mut().find(|t| t.id == task_id)
}

fn position(list: &TaskList, task_id: u64) -> Option<usize> {
    list.tasks.iter().position(|t| t.id == task_id)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_description(description: &str) -> Result<String, TaskError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyDescription);
    }
    Ok(trimmed.to_string())
}

/// Reject past deadlines; store accepted ones at millisecond precision
fn validate_deadline(
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, TaskError> {
    match deadline {
        Some(d) if d < now => Err(TaskError::DeadlineInPast),
        Some(d) => Ok(Some(d.trunc_subsecs(3))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()
    }

    fn sample_list() -> TaskList {
        let mut with_sub = Task::new(3, "Plan trip");
        with_sub.subtasks.push(Subtask {
            id: 100,
            text: "Book flights".into(),
            completed: false,
        });
        TaskList::from_tasks(vec![
            Task::new(1, "Buy milk"),
            Task::new(2, "Write report"),
            with_sub,
            Task::new(4, "Call mom"),
        ])
        .unwrap()
    }

    fn ids(list: &TaskList) -> Vec<u64> {
        list.tasks.iter().map(|t| t.id).collect()
    }

    // --- add ---

    #[test]
    fn test_add_task_goes_to_front() {
        let mut list = sample_list();
        let before = list.len();
        let id = add_task(&mut list, "Buy milk", None, now()).unwrap();
        assert_eq!(id, 5);
        assert_eq!(list.len(), before + 1);
        assert_eq!(list.tasks[0].id, 5);
        assert_eq!(list.tasks[0].description, "Buy milk");
        assert!(!list.tasks[0].completed);
        assert_eq!(list.tasks[0].source, Source::User);
        assert_eq!(list.next_id, 6);
    }

    #[test]
    fn test_add_task_ids_strictly_increase() {
        let mut list = TaskList::default();
        let mut last = 0;
        for i in 0..5 {
            let id = add_task(&mut list, &format!("task {}", i), None, now()).unwrap();
            assert!(id > last);
            last = id;
        }
        assert!(list.tasks.iter().all(|t| t.id < list.next_id));
    }

    #[test]
    fn test_add_task_rejects_empty_description() {
        let mut list = sample_list();
        let before = list.clone();
        assert_eq!(
            add_task(&mut list, "   ", None, now()),
            Err(TaskError::EmptyDescription)
        );
        assert_eq!(list, before);
    }

    #[test]
    fn test_add_task_rejects_past_deadline() {
        let mut list = sample_list();
        let before = list.clone();
        let past = now() - Duration::seconds(1);
        assert_eq!(
            add_task(&mut list, "Late", Some(past), now()),
            Err(TaskError::DeadlineInPast)
        );
        assert_eq!(list, before);
    }

    #[test]
    fn test_add_task_accepts_deadline_equal_to_now() {
        let mut list = TaskList::default();
        add_task(&mut list, "Right now", Some(now()), now()).unwrap();
        assert_eq!(list.tasks[0].deadline, Some(now()));
    }

    #[test]
    fn test_add_task_trims_description() {
        let mut list = TaskList::default();
        add_task(&mut list, "  Water plants \n", None, now()).unwrap();
        assert_eq!(list.tasks[0].description, "Water plants");
    }

    // --- edit ---

    #[test]
    fn test_edit_task_resets_notification_flags() {
        let mut list = sample_list();
        {
            let task = find_task_mut(&mut list, 2).unwrap();
            task.notified_soon = true;
            task.notified_overdue = true;
        }
        let deadline = now() + Duration::days(2);
        edit_task(&mut list, 2, "Write report v2", Some(deadline), false, now()).unwrap();
        let task = find_task(&list, 2).unwrap();
        assert_eq!(task.description, "Write report v2");
        assert_eq!(task.deadline, Some(deadline));
        assert!(!task.notified_soon);
        assert!(!task.notified_overdue);
    }

    #[test]
    fn test_edit_task_sets_completed_in_place() {
        let mut list = sample_list();
        edit_task(&mut list, 2, "Write report", None, true, now()).unwrap();
        assert!(find_task(&list, 2).unwrap().completed);
        assert_eq!(ids(&list), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_edit_task_validation() {
        let mut list = sample_list();
        let before = list.clone();
        assert_eq!(
            edit_task(&mut list, 2, "", None, false, now()),
            Err(TaskError::EmptyDescription)
        );
        assert_eq!(
            edit_task(
                &mut list,
                2,
                "ok",
                Some(now() - Duration::hours(1)),
                false,
                now()
            ),
            Err(TaskError::DeadlineInPast)
        );
        assert_eq!(
            edit_task(&mut list, 99, "ok", None, false, now()),
            Err(TaskError::NotFound(99))
        );
        assert_eq!(list, before);
    }

    // --- toggle / delete ---

    #[test]
    fn test_toggle_does_not_cascade_to_subtasks() {
        let mut list = sample_list();
        toggle_completed(&mut list, 3, true).unwrap();
        let task = find_task(&list, 3).unwrap();
        assert!(task.completed);
        assert!(!task.subtasks[0].completed);
    }

    #[test]
    fn test_delete_task_removes_subtasks_with_it() {
        let mut list = sample_list();
        let removed = delete_task(&mut list, 3).unwrap();
        assert_eq!(removed.subtasks.len(), 1);
        assert_eq!(ids(&list), vec![1, 2, 4]);
        assert_eq!(delete_task(&mut list, 3), Err(TaskError::NotFound(3)));
    }

    #[test]
    fn test_delete_does_not_reuse_ids() {
        let mut list = sample_list();
        delete_task(&mut list, 4).unwrap();
        let id = add_task(&mut list, "New", None, now()).unwrap();
        assert_eq!(id, 5);
    }

    #[test]
    fn test_set_all_completed() {
        let mut list = sample_list();
        toggle_completed(&mut list, 1, true).unwrap();
        let changed = set_all_completed(&mut list, &[1, 2, 3], true);
        assert_eq!(changed, 2);
        assert!(!find_task(&list, 4).unwrap().completed);
        let changed = set_all_completed(&mut list, &[1, 2, 3], false);
        assert_eq!(changed, 3);
    }

    // --- subtasks ---

    #[test]
    fn test_add_subtask() {
        let mut list = sample_list();
        let id = add_subtask(&mut list, 1, "Check fridge", now()).unwrap();
        assert_eq!(id, now().timestamp_millis());
        let task = find_task(&list, 1).unwrap();
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].text, "Check fridge");
    }

    #[test]
    fn test_add_subtask_ids_unique_within_parent() {
        let mut list = sample_list();
        let a = add_subtask(&mut list, 1, "a", now()).unwrap();
        let b = add_subtask(&mut list, 1, "b", now()).unwrap();
        let c = add_subtask(&mut list, 1, "c", now()).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_add_subtask_rejections() {
        let mut list = sample_list();
        assert_eq!(
            add_subtask(&mut list, 1, "  ", now()),
            Err(TaskError::EmptySubtask)
        );
        assert_eq!(
            add_subtask(&mut list, 42, "x", now()),
            Err(TaskError::NotFound(42))
        );

        toggle_completed(&mut list, 2, true).unwrap();
        assert_eq!(
            add_subtask(&mut list, 2, "x", now()),
            Err(TaskError::ParentCompleted(2))
        );

        find_task_mut(&mut list, 4).unwrap().deadline = Some(now() - Duration::hours(1));
        assert_eq!(
            add_subtask(&mut list, 4, "x", now()),
            Err(TaskError::ParentOverdue(4))
        );
        assert!(find_task(&list, 4).unwrap().subtasks.is_empty());
    }

    #[test]
    fn test_toggle_and_delete_subtask() {
        let mut list = sample_list();
        toggle_subtask(&mut list, 3, 100, true).unwrap();
        assert!(find_task(&list, 3).unwrap().subtasks[0].completed);
        assert!(!find_task(&list, 3).unwrap().completed);

        assert_eq!(
            toggle_subtask(&mut list, 3, 7, true),
            Err(TaskError::SubtaskNotFound {
                task_id: 3,
                subtask_id: 7
            })
        );

        let removed = delete_subtask(&mut list, 3, 100).unwrap();
        assert_eq!(removed.text, "Book flights");
        assert!(find_task(&list, 3).unwrap().subtasks.is_empty());
    }

    // --- reorder ---

    #[test]
    fn test_reorder_moves_before_target() {
        let mut list = sample_list();
        assert!(reorder(&mut list, 4, 2).unwrap());
        assert_eq!(ids(&list), vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_reorder_downward_uses_post_removal_index() {
        let mut list = sample_list();
        assert!(reorder(&mut list, 1, 4).unwrap());
        assert_eq!(ids(&list), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_reorder_same_id_is_noop() {
        let mut list = sample_list();
        assert!(!reorder(&mut list, 2, 2).unwrap());
        assert_eq!(ids(&list), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reorder_missing_target_keeps_task() {
        let mut list = sample_list();
        assert_eq!(reorder(&mut list, 2, 99), Err(TaskError::NotFound(99)));
        assert_eq!(ids(&list), vec![1, 2, 3, 4]);
        assert_eq!(reorder(&mut list, 99, 2), Err(TaskError::NotFound(99)));
        assert_eq!(ids(&list), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reorder_swap_back_restores_two_element_list() {
        let mut list = TaskList::from_tasks(vec![Task::new(1, "a"), Task::new(2, "b")]).unwrap();
        reorder(&mut list, 2, 1).unwrap();
        assert_eq!(ids(&list), vec![2, 1]);
        reorder(&mut list, 1, 2).unwrap();
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[test]
    fn test_reorder_preserves_id_multiset() {
        let mut list = sample_list();
        let pairs = [(1, 3), (4, 1), (2, 4), (3, 2), (1, 2), (4, 3)];
        for (a, b) in pairs {
            reorder(&mut list, a, b).unwrap();
            let mut sorted = ids(&list);
            sorted.sort();
            assert_eq!(sorted, vec![1, 2, 3, 4]);
        }
    }

    // --- seed ---

    #[test]
    fn test_apply_seed_into_empty_list_keeps_remote_ids() {
        let mut list = TaskList::default();
        let seeded: Vec<Task> = (1..=12)
            .map(|i| {
                let mut t = Task::new(i, format!("remote {}", i));
                t.source = Source::Api;
                t
            })
            .collect();
        assert_eq!(apply_seed(&mut list, seeded), Ok(12));
        assert_eq!(ids(&list), (1..=12).collect::<Vec<_>>());
        assert_eq!(list.next_id, 13);
    }

    #[test]
    fn test_apply_seed_after_user_tasks_renumbers() {
        let mut list = TaskList::default();
        add_task(&mut list, "mine", None, now()).unwrap();
        let seeded = vec![Task::new(1, "remote a"), Task::new(2, "remote b")];
        apply_seed(&mut list, seeded).unwrap();
        assert_eq!(ids(&list), vec![1, 2, 3]);
        assert_eq!(list.tasks[0].description, "mine");
        assert_eq!(list.tasks[1].source, Source::Api);
        assert_eq!(list.next_id, 4);
    }

    #[test]
    fn test_id_counter_exhaustion_is_an_error() {
        let mut list = TaskList::from_tasks(vec![Task::new(u64::MAX - 1, "edge")]).unwrap();
        assert_eq!(
            add_task(&mut list, "one too many", None, now()),
            Err(TaskError::IdsExhausted)
        );
        assert_eq!(list.len(), 1);

        let seeded = vec![Task::new(1, "remote")];
        assert_eq!(apply_seed(&mut list, seeded), Err(TaskError::IdsExhausted));
        assert_eq!(list.len(), 1);

        let mut empty = TaskList::default();
        let remote_max = vec![Task::new(u64::MAX, "remote")];
        assert_eq!(apply_seed(&mut empty, remote_max), Err(TaskError::IdsExhausted));
        assert!(empty.is_empty());
    }
}
