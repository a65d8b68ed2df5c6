use crate::board::Board;
use crate::model::{Status, Task, TaskDraft};
use crate::storage::locate_store;
use crate::ui;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn list(store: Option<PathBuf>, status: Option<Status>) -> Result<()> {
    let mut board = open_board(store)?;
    let columns = board.render()?;
    println!("Board: {}", board.location().path.display());
    for column in columns.columns() {
        if let Some(ref filter) = status {
            if &column.status != filter {
                continue;
            }
        }
        println!(
            "{} [{}] ({})",
            column.status.label(),
            column.status.id(),
            column.task_ids.len()
        );
        if column.task_ids.is_empty() {
            println!("  (empty)");
        }
        for id in &column.task_ids {
            if let Some(task) = board.tasks().get(*id) {
                print_task(task);
            }
        }
        println!();
    }
    Ok(())
}

pub fn add(
    store: Option<PathBuf>,
    title: String,
    description: Option<String>,
    status: Status,
) -> Result<()> {
    let mut board = open_board(store)?;
    let draft = TaskDraft {
        title,
        description: description.unwrap_or_default(),
        status,
    };
    let id = board
        .submit(&draft)
        .with_context(|| format!("adding task to column {}", draft.status))?;
    println!("Added task #{} to {}", id, draft.status);
    Ok(())
}

pub fn tui(store: Option<PathBuf>) -> Result<()> {
    let board = open_board(store)?;
    ui::run(board)
}

fn open_board(store: Option<PathBuf>) -> Result<Board> {
    let location = locate_store(store)?;
    Board::init(location)
}

fn print_task(task: &Task) {
    println!("  - #{} {}", task.id, task.title);
    if !task.description.is_empty() {
        println!("      {}", task.description);
    }
}
