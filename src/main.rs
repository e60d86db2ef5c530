//! # wh - Workhand schedule CLI
//!
//! Command-line front end for the Workhand schedule model. It loads the task
//! collection from a JSON file, applies one command, and writes the full
//! collection back.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a workphase and a child under it
//! wh add "Foundation" --start 2024-01-01 --end 2024-01-10
//! wh add "Excavation" --parent Foundation --start 2024-01-03 --end 2024-01-05
//!
//! # Outline and month timeline
//! wh list --tree
//! wh timeline --month 2024-01
//!
//! # Drag a bar two columns to the right
//! wh drag Excavation 96
//!
//! # Assistant tool call
//! wh tool updateTask '{"id": "excav", "updates": {"progress": 50}}'
//! ```
//!
//! Data is stored in `~/.workhand/workhand_v2_tasks.json` unless `--db` or
//! `WORKHAND_DB` points elsewhere.

use clap::Parser;

use workhand::config::Config;
use workhand::logging::{init_logging, LoggingConfig};
use workhand::store::{JsonFileStore, TaskStore};

pub mod cli;
pub mod cmd;

use cli::Cli;
use cmd::*;

fn main() {
    let cli = Cli::parse();
    let config = Config::resolve(
        cli.db.clone(),
        cli.day_width,
        LoggingConfig::from_args(cli.quiet, cli.verbose),
    );
    init_logging(&config.logging);

    match cli.command {
        // Commands that never touch the task file
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Tools => cmd_tools(),
        command => run_with_store(command, &config),
    }
}

fn run_with_store(command: Commands, config: &Config) {
    let store = JsonFileStore::new(&config.db_path);
    let mut db = store.load();
    tracing::debug!(path = %config.db_path.display(), tasks = db.len(), "Task file loaded");

    match command {
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Tools => cmd_tools(),

        Commands::Add {
            name, level, start, end, parent, agency, status, progress, delay_reason, desc, color,
        } => cmd_add(&mut db, &store, name, level, start, end, parent, agency, status,
                     progress, delay_reason, desc, color),

        Commands::List { filter, tree } => cmd_list(&db, filter, tree),

        Commands::View { id } => cmd_view(&db, id),

        Commands::Update {
            id, name, start, end, status, progress, delay_reason, agency, desc, color,
        } => cmd_update(&mut db, &store, id, name, start, end, status, progress,
                        delay_reason, agency, desc, color),

        Commands::Shift { id, days, mode } => cmd_shift(&mut db, &store, id, days, mode),

        Commands::Drag { id, pixels, mode } =>
            cmd_drag(&mut db, &store, config.day_width, id, pixels, mode),

        Commands::Reparent { id, parent } => cmd_reparent(&mut db, &store, id, parent),

        Commands::Detach { id } => cmd_detach(&mut db, &store, id),

        Commands::Toggle { id } => cmd_toggle(&mut db, &store, id),

        Commands::Delete { id } => cmd_delete(&mut db, &store, id),

        Commands::Timeline { month, shift, links, filter } =>
            cmd_timeline(&db, month, shift, links, filter),

        Commands::Tool { name, args } => cmd_tool(&mut db, &store, name, args),
    }
}
