use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::actions::Action;
use crate::tui::app::{App, Mode};
use crate::tui::text_input::TextInput;

/// Shared line-editing keys. Returns true when the key changed the buffer.
pub(super) fn edit_text(input: &mut TextInput, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('w') if ctrl => input.delete_word_back(),
        KeyCode::Char('u') if ctrl => {
            input.clear();
        }
        KeyCode::Char('a') if ctrl => {
            input.home();
            return false;
        }
        KeyCode::Char('e') if ctrl => {
            input.end();
            return false;
        }
        KeyCode::Backspace if alt || ctrl => input.delete_word_back(),
        KeyCode::Char(c) if !ctrl => input.insert_char(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => {
            input.left();
            return false;
        }
        KeyCode::Right => {
            input.right();
            return false;
        }
        KeyCode::Home => {
            input.home();
            return false;
        }
        KeyCode::End => {
            input.end();
            return false;
        }
        _ => return false,
    }
    true
}

/// The text input that has focus in the current mode, if any
pub(super) fn focused_input(app: &mut App) -> Option<&mut TextInput> {
    match app.mode {
        Mode::Search => Some(&mut app.search),
        Mode::NewTask => Some(app.new_task.focused()),
        Mode::Subtask => Some(&mut app.subtask_input),
        Mode::Edit => app.edit.as_mut().map(|e| e.form.focused()),
        Mode::Navigate | Mode::Confirm | Mode::Move => None,
    }
}

/// Search filters live as the user types
pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.mode = Mode::Navigate,
        KeyCode::Esc => {
            app.search.clear();
            app.mode = Mode::Navigate;
            app.refresh();
        }
        _ => {
            if edit_text(&mut app.search, key) {
                app.cursor = 0;
                app.refresh();
            }
        }
    }
}

pub(super) fn handle_new_task(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.new_task.clear();
            app.mode = Mode::Navigate;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.new_task.field = app.new_task.field.toggle();
        }
        KeyCode::Enter => submit_new_task(app),
        _ => {
            edit_text(app.new_task.focused(), key);
        }
    }
}

/// Add the task from the new-task line. On failure the buffers stay so the
/// user can fix the input.
pub(super) fn submit_new_task(app: &mut App) {
    let action = Action::AddTask {
        description: app.new_task.description.value().to_string(),
        deadline: app.new_task.deadline.value().to_string(),
    };
    if app.dispatch(action) {
        app.new_task.clear();
        app.mode = Mode::Navigate;
        app.cursor = 0;
    }
}

pub(super) fn handle_subtask(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_subtask(),
        KeyCode::Enter => {
            let Some(task_id) = app.subtask_parent else {
                app.cancel_subtask();
                return;
            };
            let text = app.subtask_input.value().to_string();
            if app.dispatch(Action::AddSubtask { task_id, text }) {
                app.cancel_subtask();
            }
        }
        _ => {
            edit_text(&mut app.subtask_input, key);
        }
    }
}

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(edit) = app.edit.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Tab | KeyCode::BackTab => edit.form.field = edit.form.field.toggle(),
        KeyCode::Enter => {
            let action = Action::SaveEdit {
                task_id: edit.task_id,
                description: edit.form.description.value().to_string(),
                deadline: edit.form.deadline.value().to_string(),
            };
            if app.dispatch(action) {
                app.edit = None;
                app.mode = Mode::Navigate;
            }
        }
        _ => {
            edit_text(edit.form.focused(), key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::handle_key;
    use super::super::tests::{press, type_str};
    use super::*;
    use crate::model::Task;
    use crate::tui::app::{Field, Row};
    use crate::tui::popup::Severity;
    use crate::tui::render::test_helpers::app_with_tasks;

    #[test]
    fn add_task_from_new_task_line() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "old")]);
        handle_key(&mut app, press(KeyCode::Char('a')));
        assert_eq!(app.mode, Mode::NewTask);
        type_str(&mut app, "Buy milk");
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.tasks.tasks[0].description, "Buy milk");
        assert!(app.new_task.description.is_empty());
        assert_eq!(app.cursor_row(), Some(Row::Task { task_id: 2 }));
    }

    #[test]
    fn empty_description_keeps_form_open() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        handle_key(&mut app, press(KeyCode::Char('a')));
        type_str(&mut app, "   ");
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.mode, Mode::NewTask);
        assert!(app.tasks.is_empty());
        assert_eq!(app.popups.last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn tab_switches_to_deadline_field() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        handle_key(&mut app, press(KeyCode::Char('a')));
        type_str(&mut app, "Taxes");
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.new_task.field, Field::Deadline);
        type_str(&mut app, "2099-04-15");
        assert_eq!(app.new_task.deadline.value(), "2099-04-15");
        handle_key(&mut app, press(KeyCode::Enter));
        let task = &app.tasks.tasks[0];
        assert_eq!(task.description, "Taxes");
        assert!(task.deadline.is_some());
    }

    #[test]
    fn past_deadline_in_form_is_rejected() {
        let (mut app, _tmp) = app_with_tasks(vec![]);
        handle_key(&mut app, press(KeyCode::Char('a')));
        type_str(&mut app, "Late");
        handle_key(&mut app, press(KeyCode::Tab));
        type_str(&mut app, "2001-01-01 10:00");
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.tasks.is_empty());
        assert_eq!(app.new_task.description.value(), "Late");
    }

    #[test]
    fn inline_edit_save_and_cancel() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "Call bank")]);
        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.mode, Mode::Edit);
        type_str(&mut app, " today");
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.tasks.tasks[0].description, "Call bank");
        assert!(app.edit.is_none());

        handle_key(&mut app, press(KeyCode::Enter));
        type_str(&mut app, " today");
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.tasks.tasks[0].description, "Call bank today");
    }

    #[test]
    fn inline_edit_rejects_bad_deadline_and_stays_open() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "Call bank")]);
        handle_key(&mut app, press(KeyCode::Char('e')));
        handle_key(&mut app, press(KeyCode::Tab));
        type_str(&mut app, "soon");
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Edit);
        assert!(app.tasks.tasks[0].deadline.is_none());
    }

    #[test]
    fn subtask_entry() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "Plan trip")]);
        handle_key(&mut app, press(KeyCode::Char('s')));
        assert_eq!(app.mode, Mode::Subtask);
        type_str(&mut app, "book hotel");
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.tasks.tasks[0].subtasks[0].text, "book hotel");
    }

    #[test]
    fn search_filters_while_typing() {
        let (mut app, _tmp) = app_with_tasks(vec![Task::new(1, "milk"), Task::new(2, "eggs")]);
        handle_key(&mut app, press(KeyCode::Char('/')));
        type_str(&mut app, "EG");
        assert_eq!(app.rows[0], Row::Task { task_id: 2 });
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.search.is_empty());
        assert_eq!(app.rows.len(), 4);
    }

    #[test]
    fn ctrl_w_deletes_word() {
        let mut input = TextInput::with_value("buy oat milk");
        assert!(edit_text(
            &mut input,
            KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL)
        ));
        assert_eq!(input.value(), "buy oat ");
    }
}
