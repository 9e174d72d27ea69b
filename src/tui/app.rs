use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use regex::Regex;
use tracing::{info, warn};

use crate::io::seed::{self, SeedError};
use crate::io::lock::StoreLock;
use crate::io::store::Store;
use crate::io::watcher::StoreWatcher;
use crate::model::{Config, Task, TaskList};
use crate::ops::deadline::{self, DeadlineKind};
use crate::ops::filter::{self, FilterMode};
use crate::ops::task_ops;

use super::drag::DragState;
use super::input;
use super::notify::{Notifier, TerminalNotifier};
use super::popup::{Popups, Severity};
use super::render;
use super::text_input::TextInput;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the search line
    Search,
    /// Typing into the new-task line
    NewTask,
    /// Typing a subtask under `App::subtask_parent`
    Subtask,
    /// Inline edit of a task row
    Edit,
    /// y/n prompt in the status row
    Confirm,
    /// Keyboard drag: j/k choose the drop target
    Move,
}

/// A row of the flattened task list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Task { task_id: u64 },
    Subtask { task_id: u64, subtask_id: i64 },
    /// The "+ add subtask" affordance under an open task
    AddSubtask { task_id: u64 },
}

impl Row {
    pub fn task_id(&self) -> u64 {
        match *self {
            Row::Task { task_id }
            | Row::Subtask { task_id, .. }
            | Row::AddSubtask { task_id } => task_id,
        }
    }
}

/// Which input of a task form has focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Description,
    Deadline,
}

impl Field {
    pub fn toggle(self) -> Field {
        match self {
            Field::Description => Field::Deadline,
            Field::Deadline => Field::Description,
        }
    }
}

/// Description + deadline inputs, used by the new-task line and inline edit
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub description: TextInput,
    pub deadline: TextInput,
    pub field: Field,
}

impl TaskForm {
    pub fn focused(&mut self) -> &mut TextInput {
        match self.field {
            Field::Description => &mut self.description,
            Field::Deadline => &mut self.deadline,
        }
    }

    pub fn clear(&mut self) {
        self.description.clear();
        self.deadline.clear();
        self.field = Field::Description;
    }
}

#[derive(Debug, Clone)]
pub struct EditState {
    pub task_id: u64,
    pub form: TaskForm,
}

/// Pending destructive action awaiting y/n
#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub prompt: String,
    pub action: super::actions::Action,
}

/// Clickable screen regions, recorded during render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Filter(FilterMode),
    SearchBox,
    NewTaskField(Field),
    AddButton,
    SelectAll,
    /// Any part of a list row not covered by a more specific control
    Row(usize),
    /// Checkbox of the row at this index
    Checkbox(usize),
    EditTask(u64),
    DeleteTask(u64),
    DeleteSubtask { task_id: u64, subtask_id: i64 },
}

/// Fixed-interval timer polled from the event loop. Fires on first poll.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Ticker {
            interval,
            last: None,
        }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Main application state
pub struct App {
    pub tasks: TaskList,
    pub store: Store,
    pub config: Config,
    pub theme: Theme,
    pub mode: Mode,
    pub filter: FilterMode,
    pub search: TextInput,
    /// Flattened visible rows, rebuilt by `refresh`
    pub rows: Vec<Row>,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub new_task: TaskForm,
    pub subtask_input: TextInput,
    pub subtask_parent: Option<u64>,
    pub edit: Option<EditState>,
    pub confirm: Option<ConfirmState>,
    pub drag: DragState,
    pub popups: Popups,
    pub notifier: Box<dyn Notifier>,
    pub show_help: bool,
    pub should_quit: bool,
    /// Pending seed fetch, if one was started
    pub seed_rx: Option<Receiver<Result<Vec<Task>, SeedError>>>,
    pub ticker: Ticker,
    /// Mouse targets from the last draw
    pub hits: Vec<(Rect, Hit)>,
    /// The collection as last read from or written to the store. A stored
    /// value that differs was written by another process.
    pub synced: Option<Vec<Task>>,
    pub watcher: Option<StoreWatcher>,
}

impl App {
    pub fn new(store: Store, config: Config, tasks: TaskList, notifier: Box<dyn Notifier>) -> Self {
        let theme = Theme::from_config(&config.ui);
        let popups = Popups::new(Duration::from_millis(config.ui.popup_timeout_ms));
        let ticker = Ticker::new(Duration::from_secs(config.deadlines.check_interval_secs));
        let mut app = App {
            tasks,
            store,
            config,
            theme,
            mode: Mode::Navigate,
            filter: FilterMode::All,
            search: TextInput::default(),
            rows: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            new_task: TaskForm::default(),
            subtask_input: TextInput::default(),
            subtask_parent: None,
            edit: None,
            confirm: None,
            drag: DragState::default(),
            popups,
            notifier,
            show_help: false,
            should_quit: false,
            seed_rx: None,
            ticker,
            hits: Vec::new(),
            synced: None,
            watcher: None,
        };
        app.refresh();
        app
    }

    // -----------------------------------------------------------------------
    // View model
    // -----------------------------------------------------------------------

    pub fn refresh(&mut self) {
        self.refresh_at(Utc::now());
    }

    /// Rebuild the row list from the model and filter state. The cursor
    /// follows the row it was on when that row is still visible.
    pub fn refresh_at(&mut self, now: DateTime<Utc>) {
        let selected = self.rows.get(self.cursor).copied();

        let mut rows = Vec::new();
        for task in filter::visible(&self.tasks.tasks, self.filter, self.search.value(), now) {
            rows.push(Row::Task { task_id: task.id });
            for sub in &task.subtasks {
                rows.push(Row::Subtask {
                    task_id: task.id,
                    subtask_id: sub.id,
                });
            }
            if !task.completed && !task.is_overdue(now) {
                rows.push(Row::AddSubtask { task_id: task.id });
            }
        }
        self.rows = rows;

        if let Some(pos) = selected.and_then(|sel| self.rows.iter().position(|r| *r == sel)) {
            self.cursor = pos;
        } else {
            self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
        }

        // A subtask input whose parent is gone or no longer open is dropped
        if self.mode == Mode::Subtask
            && let Some(parent) = self.subtask_parent
            && !self.rows.contains(&Row::AddSubtask { task_id: parent })
        {
            self.cancel_subtask();
        }
        if self.mode == Mode::Edit
            && let Some(edit) = &self.edit
            && task_ops::find_task(&self.tasks, edit.task_id).is_none()
        {
            self.edit = None;
            self.mode = Mode::Navigate;
        }
    }

    pub fn visible_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        filter::visible(&self.tasks.tasks, self.filter, self.search.value(), now)
    }

    pub fn all_visible_completed(&self, now: DateTime<Utc>) -> bool {
        filter::all_completed(&self.visible_tasks(now))
    }

    pub fn remaining(&self) -> usize {
        filter::remaining(&self.tasks.tasks)
    }

    pub fn task(&self, task_id: u64) -> Option<&Task> {
        task_ops::find_task(&self.tasks, task_id)
    }

    pub fn cursor_row(&self) -> Option<Row> {
        self.rows.get(self.cursor).copied()
    }

    /// Case-insensitive literal matcher for highlighting the search text
    pub fn search_regex(&self) -> Option<Regex> {
        let needle = self.search.value().trim();
        if needle.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){}", regex::escape(needle))).ok()
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
        self.refresh();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let max = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(max);
    }

    /// Keep the cursor inside a viewport of `height` rows
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + height {
            self.scroll_offset = self.cursor + 1 - height;
        }
        let max_offset = self.rows.len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    // -----------------------------------------------------------------------
    // Mode transitions
    // -----------------------------------------------------------------------

    pub fn begin_edit(&mut self, task_id: u64) {
        let Some(task) = self.task(task_id) else {
            return;
        };
        let form = TaskForm {
            description: TextInput::with_value(task.description.clone()),
            deadline: TextInput::with_value(deadline::deadline_input_value(task.deadline)),
            field: Field::Description,
        };
        self.edit = Some(EditState { task_id, form });
        self.mode = Mode::Edit;
        if let Some(pos) = self.rows.iter().position(|r| *r == Row::Task { task_id }) {
            self.cursor = pos;
        }
    }

    /// Discard edit buffers; the row re-renders from the model
    pub fn cancel_edit(&mut self) {
        self.edit = None;
        self.mode = Mode::Navigate;
        self.refresh();
    }

    pub fn begin_subtask(&mut self, task_id: u64) {
        let row = Row::AddSubtask { task_id };
        let Some(pos) = self.rows.iter().position(|r| *r == row) else {
            self.popups
                .show("Completed or overdue tasks can't take subtasks", Severity::Warning);
            return;
        };
        self.cursor = pos;
        self.subtask_parent = Some(task_id);
        self.subtask_input.clear();
        self.mode = Mode::Subtask;
    }

    pub fn cancel_subtask(&mut self) {
        self.subtask_parent = None;
        self.subtask_input.clear();
        self.mode = Mode::Navigate;
    }

    pub fn begin_confirm(&mut self, prompt: String, action: super::actions::Action) {
        self.confirm = Some(ConfirmState { prompt, action });
        self.mode = Mode::Confirm;
    }

    /// Start a keyboard drag of the task under the cursor
    pub fn begin_move(&mut self) {
        if let Some(Row::Task { task_id }) = self.cursor_row() {
            self.drag.pick_up(task_id);
            self.mode = Mode::Move;
        }
    }

    // -----------------------------------------------------------------------
    // Persistence and background work
    // -----------------------------------------------------------------------

    /// Lock the store ahead of a mutation and pick up anything another
    /// process wrote since our last read or write.
    ///
    /// `None` when the lock could not be taken; the failure is shown and the
    /// mutation then stays in memory only.
    pub fn lock_store(&mut self, now: DateTime<Utc>) -> Option<StoreLock> {
        match self.store.lock() {
            Ok(lock) => {
                self.reload_at(now);
                Some(lock)
            }
            Err(e) => {
                self.show_save_error(&e);
                None
            }
        }
    }

    /// Write the collection under a lock from [`App::lock_store`].
    /// Failures are logged and shown, never fatal.
    pub fn persist(&mut self, lock: Option<&StoreLock>) -> bool {
        let Some(lock) = lock else {
            return false;
        };
        match self.store.save_locked(lock, &self.tasks.tasks) {
            Ok(()) => {
                self.synced = Some(self.tasks.tasks.clone());
                true
            }
            Err(e) => {
                self.show_save_error(&e);
                false
            }
        }
    }

    fn show_save_error(&mut self, e: &dyn std::error::Error) {
        warn!(error = %e, "save failed");
        self.popups
            .show(format!("Could not save tasks: {}", e), Severity::Error);
    }

    /// Adopt the stored collection when another process changed it.
    /// Returns true when the model was replaced.
    pub fn reload_at(&mut self, now: DateTime<Utc>) -> bool {
        let Some(stored) = self.store.load() else {
            return false;
        };
        if self.synced.as_ref() == Some(&stored.tasks) {
            return false;
        }
        info!(count = stored.len(), "task store changed on disk, reloading");
        self.synced = Some(stored.tasks.clone());
        if stored == self.tasks {
            return false;
        }
        self.tasks = stored;
        self.refresh_at(now);
        self.popups
            .show("Tasks changed outside this window, reloaded", Severity::Info);
        true
    }

    /// Follow external writes to the store from here on
    pub fn watch_store(&mut self) {
        match StoreWatcher::start(&self.store.path()) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => warn!(error = %e, "could not watch task store"),
        }
    }

    pub fn start_seed(&mut self) {
        info!("no stored tasks, loading samples");
        self.seed_rx = Some(seed::spawn_seed(self.config.seed.clone()));
    }

    pub fn seed_pending(&self) -> bool {
        self.seed_rx.is_some()
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now(), Utc::now());
    }

    /// Expire popups, collect a finished seed fetch, run the deadline check
    /// when the ticker is due.
    pub fn tick_at(&mut self, now: Instant, wall: DateTime<Utc>) {
        self.popups.prune(now);
        if self.watcher.as_ref().is_some_and(|w| w.poll()) {
            self.reload_at(wall);
        }
        self.poll_seed(wall);
        if self.ticker.due(now) {
            self.check_deadlines_at(wall);
        }
    }

    fn poll_seed(&mut self, wall: DateTime<Utc>) {
        let Some(rx) = &self.seed_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.seed_rx = None;
                self.finish_seed(result, wall);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.seed_rx = None,
        }
    }

    pub fn finish_seed(&mut self, result: Result<Vec<Task>, SeedError>, wall: DateTime<Utc>) {
        match result {
            Ok(seeded) if seeded.is_empty() => {
                self.popups.show("No sample tasks available", Severity::Info);
            }
            Ok(seeded) => {
                let lock = self.lock_store(wall);
                self.apply_seed_locked(seeded, lock.as_ref(), wall);
            }
            Err(e) => {
                self.popups
                    .show(format!("Could not load sample tasks: {}", e), Severity::Error);
            }
        }
    }

    fn apply_seed_locked(&mut self, seeded: Vec<Task>, lock: Option<&StoreLock>, wall: DateTime<Utc>) {
        match task_ops::apply_seed(&mut self.tasks, seeded) {
            Ok(added) => {
                self.persist(lock);
                self.refresh_at(wall);
                self.popups
                    .show(format!("Loaded {} sample tasks", added), Severity::Success);
            }
            Err(e) => {
                self.popups
                    .show(format!("Could not load sample tasks: {}", e), Severity::Error);
            }
        }
    }

    pub fn check_deadlines_at(&mut self, wall: DateTime<Utc>) {
        let window = chrono::Duration::minutes(self.config.deadlines.soon_minutes);
        let lock = self.lock_store(wall);
        let events = deadline::check_deadlines(&mut self.tasks, wall, window);
        if events.is_empty() {
            return;
        }
        for event in &events {
            let severity = match event.kind {
                DeadlineKind::Soon => Severity::Warning,
                DeadlineKind::Overdue => Severity::Error,
            };
            let message = event.message();
            info!(task = event.task_id, kind = ?event.kind, "deadline notification");
            self.popups.show(message.clone(), severity);
            self.notifier.notify(event.title(), &message);
        }
        self.persist(lock.as_ref());
        self.refresh_at(wall);
    }
}

/// Restore filter, search and cursor from .state.json
pub fn restore_ui_state(app: &mut App) {
    use crate::io::state::read_ui_state;

    let Some(state) = read_ui_state(app.store.dir()) else {
        return;
    };
    app.filter = state.filter;
    app.search.set(state.search);
    app.refresh();
    app.cursor = state.cursor.min(app.rows.len().saturating_sub(1));
}

/// Save filter, search and cursor to .state.json
pub fn save_ui_state(app: &App) {
    use crate::io::state::{UiState, write_ui_state};

    let state = UiState {
        filter: app.filter,
        search: app.search.value().to_string(),
        cursor: app.cursor,
    };
    if let Err(e) = write_ui_state(app.store.dir(), &state) {
        warn!(error = %e, "could not save UI state");
    }
}

/// Run the TUI application
pub fn run(store: Store, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = store.load();
    let needs_seed = loaded.is_none() && config.seed.enabled;
    let mouse = config.ui.mouse;
    let notifier = Box::new(TerminalNotifier::stdout(config.ui.notifications));

    let synced = loaded.as_ref().map(|list| list.tasks.clone());
    let mut app = App::new(store, config, loaded.unwrap_or_default(), notifier);
    app.synced = synced;
    app.watch_store();
    restore_ui_state(&mut app);
    if needs_seed {
        app.start_seed();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
