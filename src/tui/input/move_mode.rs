use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::actions::Action;
use crate::tui::app::{App, Mode, Row};

/// Keyboard drag: j/k step the drop target across task rows, Enter drops
/// the dragged task before the target, Esc releases without moving.
pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => step_target(app, 1),
        KeyCode::Char('k') | KeyCode::Up => step_target(app, -1),
        KeyCode::Enter => {
            let drop = app.drag.drop_here();
            app.mode = Mode::Navigate;
            if let Some((moved, target)) = drop {
                app.dispatch(Action::Reorder { moved, target });
                if let Some(pos) = app
                    .rows
                    .iter()
                    .position(|r| *r == Row::Task { task_id: moved })
                {
                    app.cursor = pos;
                }
            }
        }
        KeyCode::Esc => {
            app.drag.release();
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

/// Move the hover target to the next task row in `dir`, skipping the
/// dragged task itself
fn step_target(app: &mut App, dir: isize) {
    let Some(dragging) = app.drag.dragging() else {
        app.mode = Mode::Navigate;
        return;
    };
    let tasks: Vec<u64> = app
        .rows
        .iter()
        .filter_map(|r| match r {
            Row::Task { task_id } => Some(*task_id),
            _ => None,
        })
        .collect();
    let current = app.drag.target().unwrap_or(dragging);
    let Some(pos) = tasks.iter().position(|id| *id == current) else {
        return;
    };

    let mut next = pos as isize + dir;
    while next >= 0 && (next as usize) < tasks.len() {
        let id = tasks[next as usize];
        if id != dragging {
            app.drag.hover(id);
            if let Some(row) = app.rows.iter().position(|r| *r == Row::Task { task_id: id }) {
                app.cursor = row;
            }
            return;
        }
        next += dir;
    }
}
