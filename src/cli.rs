use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed project schedule CLI.
/// Storage defaults to ~/.workhand/workhand_v2_tasks.json, $WORKHAND_DB, or a path passed via --db.
#[derive(Parser)]
#[command(name = "wh", version, about = "Hierarchical project schedule and Gantt timeline")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Width of one day column in pixels, used by `drag`.
    #[arg(long, global = true)]
    pub day_width: Option<f64>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}
