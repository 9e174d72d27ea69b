mod confirm;
mod edit;
mod mouse;
mod move_mode;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use super::app::{App, Mode};

// Submodules reach each other's handlers through `use super::*;`
#[allow(unused_imports)]
use confirm::*;
#[allow(unused_imports)]
use edit::*;
#[allow(unused_imports)]
use mouse::*;
#[allow(unused_imports)]
use move_mode::*;
#[allow(unused_imports)]
use navigate::*;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    // Ctrl+C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Search => handle_search(app, key),
        Mode::NewTask => handle_new_task(app, key),
        Mode::Subtask => handle_subtask(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Confirm => handle_confirm(app, key),
        Mode::Move => handle_move(app, key),
    }
}

/// Handle a mouse event (click, drag-to-reorder, wheel)
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    handle_mouse_event(app, mouse);
}

/// Handle a bracketed paste. Inserted into whichever text input has focus.
pub fn handle_paste(app: &mut App, text: &str) {
    if let Some(input) = focused_input(app) {
        input.insert_str(text);
        if app.mode == Mode::Search {
            app.refresh();
        }
    }
}
