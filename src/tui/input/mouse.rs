use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::tui::actions::Action;
use crate::tui::app::{App, Hit, Mode, Row};

use super::edit::submit_new_task;
use super::navigate::{confirm_delete_task, toggle_cursor_row};

pub(super) fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    let pos = Position::new(mouse.column, mouse.row);

    if app.show_help {
        if matches!(mouse.kind, MouseEventKind::Down(_)) {
            app.show_help = false;
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown if app.mode == Mode::Navigate => app.move_cursor(3),
        MouseEventKind::ScrollUp if app.mode == Mode::Navigate => app.move_cursor(-3),
        MouseEventKind::Down(MouseButton::Left) => click(app, pos),
        MouseEventKind::Drag(MouseButton::Left) => drag_over(app, pos),
        MouseEventKind::Up(MouseButton::Left) => release(app, pos),
        _ => {}
    }
}

/// Topmost clickable region under `pos`
fn hit_at(app: &App, pos: Position) -> Option<Hit> {
    app.hits
        .iter()
        .rev()
        .find(|(rect, _)| rect.contains(pos))
        .map(|(_, hit)| *hit)
}

/// Index of the list row under `pos`, ignoring controls drawn on it
fn row_at(app: &App, pos: Position) -> Option<usize> {
    app.hits.iter().find_map(|(rect, hit)| match hit {
        Hit::Row(idx) if rect.contains(pos) => Some(*idx),
        _ => None,
    })
}

fn click(app: &mut App, pos: Position) {
    // A click ends modal input first
    match app.mode {
        Mode::Confirm => return,
        Mode::Move => {
            app.drag.release();
            app.mode = Mode::Navigate;
        }
        Mode::Edit => {
            if matches!(hit_at(app, pos), Some(Hit::Row(i)) if Some(i) == editing_row(app)) {
                return;
            }
            app.cancel_edit();
        }
        Mode::Subtask => app.cancel_subtask(),
        Mode::Navigate | Mode::Search | Mode::NewTask => {}
    }

    let Some(hit) = hit_at(app, pos) else {
        app.mode = Mode::Navigate;
        return;
    };
    if !matches!(hit, Hit::SearchBox | Hit::NewTaskField(_) | Hit::AddButton) {
        app.mode = Mode::Navigate;
    }

    match hit {
        Hit::Filter(mode) => app.set_filter(mode),
        Hit::SearchBox => app.mode = Mode::Search,
        Hit::NewTaskField(field) => {
            app.new_task.field = field;
            app.mode = Mode::NewTask;
        }
        Hit::AddButton => submit_new_task(app),
        Hit::SelectAll => {
            app.dispatch(Action::ToggleAll);
        }
        Hit::Checkbox(idx) => {
            app.cursor = idx;
            toggle_cursor_row(app);
        }
        Hit::EditTask(task_id) => app.begin_edit(task_id),
        Hit::DeleteTask(task_id) => confirm_delete_task(app, task_id),
        Hit::DeleteSubtask {
            task_id,
            subtask_id,
        } => {
            app.dispatch(Action::DeleteSubtask {
                task_id,
                subtask_id,
            });
        }
        Hit::Row(idx) => {
            app.cursor = idx;
            match app.rows.get(idx) {
                Some(Row::Task { task_id }) => app.drag.pick_up(*task_id),
                Some(Row::AddSubtask { task_id }) => app.begin_subtask(*task_id),
                _ => {}
            }
        }
    }
}

fn editing_row(app: &App) -> Option<usize> {
    let task_id = app.edit.as_ref()?.task_id;
    app.rows.iter().position(|r| *r == Row::Task { task_id })
}

fn drag_over(app: &mut App, pos: Position) {
    if !app.drag.is_active() {
        return;
    }
    match row_at(app, pos).and_then(|idx| app.rows.get(idx).copied()) {
        Some(Row::Task { task_id }) => app.drag.hover(task_id),
        _ => app.drag.leave(),
    }
}

fn release(app: &mut App, pos: Position) {
    if !app.drag.is_active() {
        return;
    }
    let target = match row_at(app, pos).and_then(|idx| app.rows.get(idx).copied()) {
        Some(Row::Task { task_id }) => Some(task_id),
        _ => None,
    };
    let drop = match target {
        Some(task_id) => app.drag.drop_on(task_id),
        None => {
            app.drag.release();
            None
        }
    };
    if let Some((moved, target)) = drop {
        app.dispatch(Action::Reorder { moved, target });
    }
}
