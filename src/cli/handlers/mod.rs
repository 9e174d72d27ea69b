use std::io::{BufRead, Write};

use chrono::{Duration, Utc};
use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::seed;
use crate::io::lock::StoreLock;
use crate::io::store::Store;
use crate::model::{Config, TaskList};
use crate::ops::{deadline, filter, task_ops};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs: where the tasks live and the loaded config
pub struct Context {
    pub store: Store,
    pub config: Config,
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(command: Commands, ctx: &Context) -> CmdResult {
    match command {
        // Read commands
        Commands::List(args) => cmd_list(args, ctx),
        Commands::Due => cmd_due(ctx),

        // Write commands
        Commands::Add(args) => cmd_add(args, ctx),
        Commands::Edit(args) => cmd_edit(args, ctx),
        Commands::Done(args) => cmd_set_completed(args.id, true, ctx),
        Commands::Reopen(args) => cmd_set_completed(args.id, false, ctx),
        Commands::Delete(args) => cmd_delete(args, ctx),
        Commands::Sub(args) => cmd_sub(args, ctx),
        Commands::Mv(args) => cmd_mv(args, ctx),
        Commands::Seed => cmd_seed(ctx),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Missing or unreadable data is an empty list, same as the TUI
fn load(ctx: &Context) -> TaskList {
    ctx.store.load().unwrap_or_default()
}

/// Caller holds `lock` from before its `load`, so the write cannot drop
/// another process's change
fn save(ctx: &Context, lock: &StoreLock, list: &TaskList) -> CmdResult {
    ctx.store.save_locked(lock, &list.tasks)?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Ask on stderr, read one line from stdin. Anything but y/yes declines.
fn confirm(prompt: &str) -> std::io::Result<bool> {
    let mut err = std::io::stderr();
    write!(err, "{} [y/N] ", prompt)?;
    err.flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, ctx: &Context) -> CmdResult {
    let list = load(ctx);
    let now = Utc::now();
    let search = args.search.unwrap_or_default();
    let visible = filter::visible(&list.tasks, args.filter, &search, now);

    if ctx.json {
        return print_json(&ListJson {
            filter: args.filter,
            search: (!search.is_empty()).then_some(search),
            items_left: filter::remaining(&list.tasks),
            all_visible_completed: filter::all_completed(&visible),
            tasks: visible.iter().map(|t| task_to_json(t, now)).collect(),
        });
    }

    if visible.is_empty() {
        if list.is_empty() {
            println!("No tasks yet.");
        } else {
            println!("No tasks match the current filter.");
        }
    }
    for task in &visible {
        for line in format_task_tree(task, now) {
            println!("{}", line);
        }
    }
    println!("{}", format_items_left(filter::remaining(&list.tasks)));
    Ok(())
}

/// One deadline pass. Events are marked notified and persisted, so each
/// fires once across the CLI and the TUI.
fn cmd_due(ctx: &Context) -> CmdResult {
    let lock = ctx.store.lock()?;
    let mut list = load(ctx);
    let window = Duration::minutes(ctx.config.deadlines.soon_minutes);
    let events = deadline::check_deadlines(&mut list, Utc::now(), window);
    if !events.is_empty() {
        save(ctx, &lock, &list)?;
    }

    if ctx.json {
        let out: Vec<_> = events.iter().map(event_to_json).collect();
        return print_json(&out);
    }
    for event in &events {
        println!("{}", format_event(event));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, ctx: &Context) -> CmdResult {
    let lock = ctx.store.lock()?;
    let mut list = load(ctx);
    let now = Utc::now();
    let deadline = deadline::parse_deadline_input(args.deadline.as_deref().unwrap_or(""))?;
    let id = task_ops::add_task(&mut list, &args.text, deadline, now)?;
    save(ctx, &lock, &list)?;
    debug!(id, "added task");

    if ctx.json {
        if let Some(task) = task_ops::find_task(&list, id) {
            return print_json(&task_to_json(task, now));
        }
    }
    println!("{}", id);
    Ok(())
}

/// Fields not given on the command line keep their current values
fn cmd_edit(args: EditArgs, ctx: &Context) -> CmdResult {
    let lock = ctx.store.lock()?;
    let mut list = load(ctx);
    let now = Utc::now();
    let task = task_ops::find_task(&list, args.id).ok_or(task_ops::TaskError::NotFound(args.id))?;

    let description = args.text.unwrap_or_else(|| task.description.clone());
    let deadline = match (args.clear_deadline, args.deadline) {
        (true, _) => None,
        (false, Some(input)) => deadline::parse_deadline_input(&input)?,
        (false, None) => task.deadline,
    };
    let completed = task.completed;

    task_ops::edit_task(&mut list, args.id, &description, deadline, completed, now)?;
    save(ctx, &lock, &list)?;
    if ctx.json {
        if let Some(task) = task_ops::find_task(&list, args.id) {
            return print_json(&task_to_json(task, now));
        }
    }
    Ok(())
}

fn cmd_set_completed(id: u64, value: bool, ctx: &Context) -> CmdResult {
    let lock = ctx.store.lock()?;
    let mut list = load(ctx);
    task_ops::toggle_completed(&mut list, id, value)?;
    save(ctx, &lock, &list)
}

fn cmd_delete(args: DeleteArgs, ctx: &Context) -> CmdResult {
    if !args.yes {
        let list = load(ctx);
        let task =
            task_ops::find_task(&list, args.id).ok_or(task_ops::TaskError::NotFound(args.id))?;
        // Not locked while waiting on the user
        let prompt = format!("Delete \"{}\"?", task.description);
        if !confirm(&prompt)? {
            eprintln!("not deleted");
            return Ok(());
        }
    }

    let lock = ctx.store.lock()?;
    let mut list = load(ctx);
    let removed = task_ops::delete_task(&mut list, args.id)?;
    save(ctx, &lock, &list)?;
    debug!(id = removed.id, "deleted task");
    Ok(())
}

fn cmd_sub(args: SubCmd, ctx: &Context) -> CmdResult {
    let lock = ctx.store.lock()?;
    let mut list = load(ctx);
    match args.action {
        SubAction::Add { id, text } => {
            let sub_id = task_ops::add_subtask(&mut list, id, &text, Utc::now())?;
            save(ctx, &lock, &list)?;
            println!("{}", sub_id);
        }
        SubAction::Done { id, sub } => {
            task_ops::toggle_subtask(&mut list, id, sub, true)?;
            save(ctx, &lock, &list)?;
        }
        SubAction::Reopen { id, sub } => {
            task_ops::toggle_subtask(&mut list, id, sub, false)?;
            save(ctx, &lock, &list)?;
        }
        SubAction::Rm { id, sub } => {
            task_ops::delete_subtask(&mut list, id, sub)?;
            save(ctx, &lock, &list)?;
        }
    }
    Ok(())
}

fn cmd_mv(args: MvArgs, ctx: &Context) -> CmdResult {
    let lock = ctx.store.lock()?;
    let mut list = load(ctx);
    if task_ops::reorder(&mut list, args.id, args.before)? {
        save(ctx, &lock, &list)?;
    }
    Ok(())
}

/// Synchronous seed load. Only ever fills an empty store.
fn cmd_seed(ctx: &Context) -> CmdResult {
    if ctx.store.load().is_some() {
        return Err(SEED_NOT_EMPTY.into());
    }
    let tasks = seed::load_seed(&ctx.config.seed)?;

    // The fetch ran unlocked; check again before writing
    let lock = ctx.store.lock()?;
    if ctx.store.load().is_some() {
        return Err(SEED_NOT_EMPTY.into());
    }
    let mut list = TaskList::default();
    let count = task_ops::apply_seed(&mut list, tasks)?;
    save(ctx, &lock, &list)?;
    println!("Loaded {} sample tasks", count);
    Ok(())
}

const SEED_NOT_EMPTY: &str =
    "the task store already holds data; seed only loads into an empty store";
