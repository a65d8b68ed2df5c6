use crate::model::Status;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "Terminal kanban task board")]
pub struct Cli {
    /// Path to the board file (defaults to the per-user data directory)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks grouped by status column
    List {
        /// Only show one column (todo, doing, or done)
        #[arg(long)]
        status: Option<Status>,
    },
    /// Add a new task to the board
    Add {
        /// Title of the task
        title: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Column to place the task in (todo, doing, or done)
        #[arg(long, default_value = "todo")]
        status: Status,
    },
    /// Launch the interactive board
    Tui,
}
