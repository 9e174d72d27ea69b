use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::filter::FilterMode;
use crate::tui::actions::Action;
use crate::tui::app::{App, Field, Mode, Row};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts everything; ? or Esc closes it
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // Cursor
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.cursor = app.rows.len().saturating_sub(1);
        }
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::PageUp => app.move_cursor(-10),

        // Filters
        KeyCode::Tab => app.set_filter(app.filter.next()),
        KeyCode::BackTab => app.set_filter(app.filter.prev()),
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            app.set_filter(FilterMode::ALL[idx]);
        }

        // Focus inputs
        KeyCode::Char('/') => app.mode = Mode::Search,
        KeyCode::Char('a') | KeyCode::Char('n') => {
            app.new_task.field = Field::Description;
            app.mode = Mode::NewTask;
        }
        KeyCode::Esc => {
            if !app.search.is_empty() {
                app.search.clear();
                app.refresh();
            }
        }

        // Row actions
        KeyCode::Char(' ') | KeyCode::Char('x') => toggle_cursor_row(app),
        KeyCode::Char('e') => {
            if let Some(row) = app.cursor_row() {
                app.begin_edit(row.task_id());
            }
        }
        KeyCode::Enter => match app.cursor_row() {
            Some(Row::Task { task_id }) => app.begin_edit(task_id),
            Some(Row::AddSubtask { task_id }) => app.begin_subtask(task_id),
            Some(Row::Subtask { .. }) => toggle_cursor_row(app),
            None => {}
        },
        KeyCode::Char('d') | KeyCode::Delete => delete_cursor_row(app),
        KeyCode::Char('s') => {
            if let Some(row) = app.cursor_row() {
                app.begin_subtask(row.task_id());
            }
        }
        KeyCode::Char('A') => {
            app.dispatch(Action::ToggleAll);
        }
        KeyCode::Char('m') => app.begin_move(),
        _ => {}
    }
}

pub(super) fn toggle_cursor_row(app: &mut App) {
    match app.cursor_row() {
        Some(Row::Task { task_id }) => {
            app.dispatch(Action::ToggleTask(task_id));
        }
        Some(Row::Subtask {
            task_id,
            subtask_id,
        }) => {
            app.dispatch(Action::ToggleSubtask {
                task_id,
                subtask_id,
            });
        }
        Some(Row::AddSubtask { .. }) | None => {}
    }
}

pub(super) fn delete_cursor_row(app: &mut App) {
    match app.cursor_row() {
        Some(Row::Task { task_id }) => confirm_delete_task(app, task_id),
        Some(Row::Subtask {
            task_id,
            subtask_id,
        }) => {
            app.dispatch(Action::DeleteSubtask {
                task_id,
                subtask_id,
            });
        }
        Some(Row::AddSubtask { .. }) | None => {}
    }
}

/// Task deletion always asks first
pub(super) fn confirm_delete_task(app: &mut App, task_id: u64) {
    let Some(task) = app.task(task_id) else {
        return;
    };
    let prompt = format!(
        "Delete \"{}\"?",
        crate::util::unicode::truncate_to_width(&task.description, 40)
    );
    app.begin_confirm(prompt, Action::DeleteTask(task_id));
}

#[cfg(test)]
mod tests {
    use super::super::tests::{press, type_str};
    use super::super::handle_key;
    use crate::model::{Subtask, Task};
    use crate::ops::filter::FilterMode;
    use crate::tui::app::{Mode, Row};
    use crate::tui::render::test_helpers::app_with_tasks;
    use crossterm::event::KeyCode;

    #[test]
    fn jk_moves_cursor_within_bounds() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(2, "b"), Task::new(1, "a")]);
        handle_key(&mut app, press(KeyCode::Char('k')));
        assert_eq!(app.cursor, 0);
        for _ in 0..10 {
            handle_key(&mut app, press(KeyCode::Char('j')));
        }
        assert_eq!(app.cursor, 3);
        handle_key(&mut app, press(KeyCode::Char('g')));
        assert_eq!(app.cursor, 0);
        handle_key(&mut app, press(KeyCode::Char('G')));
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn space_toggles_task_under_cursor() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "a")]);
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert!(app.tasks.tasks[0].completed);
        assert!(app.store.load().unwrap().tasks[0].completed);
    }

    #[test]
    fn space_on_subtask_toggles_subtask() {
        let mut t = Task::new(1, "a");
        t.subtasks.push(Subtask {
            id: 9,
            text: "s".into(),
            completed: false,
        });
        let (mut app, _tmp) = app_with_tasks(vec![t]);
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert!(app.tasks.tasks[0].subtasks[0].completed);
        assert!(!app.tasks.tasks[0].completed);
    }

    #[test]
    fn delete_asks_then_removes_on_y() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "a")]);
        handle_key(&mut app, press(KeyCode::Char('d')));
        assert_eq!(app.mode, Mode::Confirm);
        assert_eq!(app.tasks.len(), 1);
        handle_key(&mut app, press(KeyCode::Char('y')));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn delete_declined_keeps_task() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "a")]);
        handle_key(&mut app, press(KeyCode::Char('d')));
        handle_key(&mut app, press(KeyCode::Char('n')));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.tasks.len(), 1);
        assert!(app.confirm.is_none());
    }

    #[test]
    fn number_keys_and_tab_switch_filters() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        handle_key(&mut app, press(KeyCode::Char('4')));
        assert_eq!(app.filter, FilterMode::Overdue);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.filter, FilterMode::All);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.filter, FilterMode::Overdue);
    }

    #[test]
    fn esc_clears_search() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "milk"), Task::new(2, "eggs")]);
        handle_key(&mut app, press(KeyCode::Char('/')));
        type_str(&mut app, "milk");
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.rows[0], Row::Task { task_id: 1 });
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.search.is_empty());
        assert_eq!(app.rows.len(), 4);
    }

    #[test]
    fn help_toggles_and_swallows_keys() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "a")]);
        handle_key(&mut app, press(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.should_quit);
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(!app.show_help);
    }
}
