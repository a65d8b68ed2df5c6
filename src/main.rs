mod board;
mod cli;
mod commands;
mod model;
mod seed;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::List { status } => commands::list(args.store, status),
        cli::Command::Add {
            title,
            description,
            status,
        } => commands::add(args.store, title, description, status),
        cli::Command::Tui => commands::tui(args.store),
    }
}
