use chrono::{DateTime, TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::Store;
use crate::model::{Config, Task, TaskList};
use crate::tui::app::App;
use crate::tui::notify::Recorder;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// A fixed instant far enough ahead that deadlines around it are never
/// overdue against the real clock.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap()
}

pub fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 3, 1, 9, 30, 0).unwrap()
}

pub fn task_due(id: u64, description: &str, deadline: DateTime<Utc>) -> Task {
    let mut task = Task::new(id, description);
    task.deadline = Some(deadline);
    task
}

/// App over the given tasks with its store in a fresh temp dir. Nothing is
/// written until an action persists. Keep the TempDir alive for the test.
pub fn app_with_tasks(tasks: Vec<Task>) -> (App, TempDir) {
    let tmp = TempDir::new().unwrap();
    let store = Store::new(tmp.path());
    let app = App::new(
        store,
        Config::default(),
        TaskList::from_tasks(tasks).unwrap(),
        Box::new(Recorder::default()),
    );
    (app, tmp)
}
