use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::ops::filter::FilterMode;

#[derive(Parser)]
#[command(name = "planner", about = concat!("planner v", env!("CARGO_PKG_VERSION"), " - tasks with deadlines, in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the task store
    #[arg(long = "data-dir", env = "PLANNER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/planner/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks, optionally filtered
    List(ListArgs),
    /// Add a task to the top of the list
    Add(AddArgs),
    /// Change a task's text or deadline
    Edit(EditArgs),
    /// Mark a task complete
    Done(IdArg),
    /// Mark a task not complete
    Reopen(IdArg),
    /// Delete a task and its subtasks
    Delete(DeleteArgs),
    /// Subtask management
    Sub(SubCmd),
    /// Move a task before another task
    Mv(MvArgs),
    /// Load sample tasks into an empty store
    Seed,
    /// Run one deadline check and report tasks due soon or overdue
    Due,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter mode (all, active, completed, overdue)
    #[arg(long, default_value_t = FilterMode::All)]
    pub filter: FilterMode,
    /// Case-insensitive text to match in descriptions and subtasks
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task description
    pub text: String,
    /// Deadline: "YYYY-MM-DD HH:MM", "YYYY-MM-DD" or RFC 3339
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: u64,
    /// New description
    #[arg(long)]
    pub text: Option<String>,
    /// New deadline
    #[arg(long, conflicts_with = "clear_deadline")]
    pub deadline: Option<String>,
    /// Remove the deadline
    #[arg(long)]
    pub clear_deadline: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: u64,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task ID
    pub id: u64,
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Add a subtask
    Add {
        /// Parent task ID
        id: u64,
        /// Subtask text
        text: String,
    },
    /// Mark a subtask complete
    Done {
        /// Parent task ID
        id: u64,
        /// Subtask ID
        sub: i64,
    },
    /// Mark a subtask not complete
    Reopen {
        /// Parent task ID
        id: u64,
        /// Subtask ID
        sub: i64,
    },
    /// Remove a subtask
    Rm {
        /// Parent task ID
        id: u64,
        /// Subtask ID
        sub: i64,
    },
}

#[derive(Args)]
pub struct MvArgs {
    /// Task to move
    pub id: u64,
    /// Task to insert before
    #[arg(long)]
    pub before: u64,
}
