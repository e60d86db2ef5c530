//! Command implementations for the CLI interface.
//!
//! Each handler loads nothing itself: it receives the collection loaded by
//! `main`, applies one operation through the schedule model, and persists
//! the full collection through the store when something changed.

use std::fmt::Display;

use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use workhand::assistant;
use workhand::db::{resolve_task_identifier, Database};
use workhand::fields::*;
use workhand::gesture::{DragController, DragMode};
use workhand::hierarchy::{ancestors, depth_of, has_children};
use workhand::store::TaskStore;
use workhand::task::{Task, TaskPatch};
use workhand::timeline::{
    add_days, bar_geometry, connectors, days_in_range, duration, is_overdue, month_label, month_range,
    shift_month,
};

use crate::cli::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Task name.
        name: String,
        /// Hierarchy level. Defaults to the level below the parent, or workphase.
        #[arg(long, value_enum)]
        level: Option<Level>,
        /// Start date: YYYY-MM-DD, "today", "tomorrow", or "in Nd". Defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// End date, same formats as --start. Defaults to five days after the start.
        #[arg(long)]
        end: Option<String>,
        /// Parent task ID or name.
        #[arg(long)]
        parent: Option<String>,
        /// Responsible agency.
        #[arg(long)]
        agency: Option<String>,
        /// Status: in-progress | done | delay.
        #[arg(long, value_enum, default_value_t = Status::InProgress)]
        status: Status,
        /// Progress percentage, 0-100.
        #[arg(long, default_value_t = 0)]
        progress: u8,
        /// Reason for the delay. Required with --status delay.
        #[arg(long)]
        delay_reason: Option<String>,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Bar colour.
        #[arg(long)]
        color: Option<String>,
    },

    /// List tasks in display order.
    List {
        /// Only show tasks whose name contains this text (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
        /// Indent rows by hierarchy depth.
        #[arg(long)]
        tree: bool,
    },

    /// View a single task by ID or name.
    View {
        /// Task ID or name to view
        id: String,
    },

    /// Update fields on a task.
    Update {
        /// Task ID or name to update
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        progress: Option<u8>,
        #[arg(long)]
        delay_reason: Option<String>,
        #[arg(long)]
        agency: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Shift a task's dates by whole days.
    Shift {
        /// Task ID or name.
        id: String,
        /// Signed day delta.
        #[arg(allow_hyphen_values = true)]
        days: i64,
        /// Which dates move.
        #[arg(long, value_enum, default_value_t = DragMode::Move)]
        mode: DragMode,
    },

    /// Replay a pointer drag of the given pixel displacement on a task bar.
    Drag {
        /// Task ID or name.
        id: String,
        /// Horizontal pointer displacement in pixels.
        #[arg(allow_hyphen_values = true)]
        pixels: f64,
        #[arg(long, value_enum, default_value_t = DragMode::Move)]
        mode: DragMode,
    },

    /// Move a task under a new parent.
    Reparent {
        /// Task ID or name to move.
        id: String,
        /// New parent ID or name.
        parent: String,
    },

    /// Make a task a root workphase.
    Detach {
        /// Task ID or name.
        id: String,
    },

    /// Expand or collapse a task's children.
    Toggle {
        /// Task ID or name.
        id: String,
    },

    /// Delete a task and all of its descendants.
    Delete {
        /// Task ID or name to delete
        id: String,
    },

    /// Show the Gantt window for one month.
    Timeline {
        /// Month to show, YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        /// Step this many months from --month (negative steps back).
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        shift: i32,
        /// Also list parent-to-child links between visible rows.
        #[arg(long)]
        links: bool,
        /// Only show tasks whose name contains this text (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
    },

    /// Invoke an assistant tool by name with JSON arguments.
    Tool {
        /// addTask | updateTask | deleteTask
        name: String,
        /// JSON object with the tool arguments.
        args: String,
    },

    /// Print the assistant tool declarations as JSON.
    Tools,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn exit_with(msg: impl Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn save(db: &Database, store: &dyn TaskStore) {
    if let Err(e) = store.persist(db) {
        exit_with(format!("Failed to save tasks: {e}"));
    }
}

fn resolve_id(db: &Database, identifier: &str) -> String {
    match resolve_task_identifier(identifier, db) {
        Ok(t) => t.id.clone(),
        Err(e) => exit_with(format!("Error resolving task: {e}")),
    }
}

/// Parse human-readable date input.
///
/// Supports "today", "tomorrow", "yesterday", "in 3d", "in 2w" and YYYY-MM-DD.
pub fn parse_date_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(add_days(today, 1)),
        "yesterday" => return Some(add_days(today, -1)),
        _ => {}
    }
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            return nd.trim().parse::<i64>().ok().map(|n| add_days(today, n));
        }
        if let Some(nw) = rest.strip_suffix('w') {
            return nw.trim().parse::<i64>().ok().and_then(|n| n.checked_mul(7)).map(|n| add_days(today, n));
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn date_arg(raw: &str, today: NaiveDate) -> NaiveDate {
    parse_date_input(raw, today).unwrap_or_else(|| exit_with(format!("Invalid date: {raw}")))
}

/// Add a new task to the collection.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    db: &mut Database,
    store: &dyn TaskStore,
    name: String,
    level: Option<Level>,
    start: Option<String>,
    end: Option<String>,
    parent: Option<String>,
    agency: Option<String>,
    status: Status,
    progress: u8,
    delay_reason: Option<String>,
    desc: Option<String>,
    color: Option<String>,
) {
    let today = Local::now().date_naive();
    let start = start.as_deref().map_or(today, |s| date_arg(s, today));
    let end = end
        .as_deref()
        .map_or(add_days(start, 5), |s| date_arg(s, today));

    let parent_task = parent.as_deref().map(|p| match resolve_task_identifier(p, db) {
        Ok(t) => t.clone(),
        Err(e) => exit_with(format!("Error resolving parent: {e}")),
    });

    let mut task = match &parent_task {
        Some(p) => Task::child_of(p, name, start, end),
        None => Task::new(name, Level::Workphase, start, end),
    };
    if let Some(level) = level {
        task.level = level;
    }
    task.agency = agency.unwrap_or_default();
    task.status = status;
    task.progress = progress;
    task.delay_reason = delay_reason;
    task.description = desc;
    task.color = color;

    let id = match db.add(task) {
        Ok(t) => t.id.clone(),
        Err(e) => exit_with(e),
    };
    save(db, store);
    println!("Added task {id}");
}

/// Print tasks in display order.
pub fn cmd_list(db: &Database, filter: Option<String>, tree: bool) {
    let visible = db.visible(filter.as_deref().unwrap_or(""));
    if visible.is_empty() {
        println!("No tasks.");
        return;
    }
    println!(
        "{:<10} {:<10} {:<12} {:>4} {:<10} {:<10} {:>4}  {}",
        "ID", "Level", "Status", "Prog", "Start", "End", "Days", "Name"
    );
    for t in visible {
        let indent = if tree { "  ".repeat(depth_of(&db.tasks, &t.id)) } else { String::new() };
        let marker = match (has_children(&db.tasks, &t.id), t.expanded()) {
            (false, _) => "  ",
            (true, true) => "▾ ",
            (true, false) => "▸ ",
        };
        println!(
            "{:<10} {:<10} {:<12} {:>3}% {:<10} {:<10} {:>4}  {}{}{}",
            t.id,
            t.level,
            t.status,
            t.progress,
            t.start_date,
            t.end_date,
            duration(t.start_date, t.end_date),
            indent,
            marker,
            t.name
        );
    }
}

/// Show all fields of one task and its ancestor chain.
pub fn cmd_view(db: &Database, id: String) {
    let task = match resolve_task_identifier(&id, db) {
        Ok(t) => t,
        Err(e) => exit_with(e),
    };
    let today = Local::now().date_naive();
    println!("ID:          {}", task.id);
    println!("Name:        {}", task.name);
    println!("Level:       {}", task.level);
    println!("Status:      {}", task.status);
    if let Some(reason) = &task.delay_reason {
        println!("Delay:       {}", reason);
    }
    println!("Progress:    {}%", task.progress);
    println!(
        "Dates:       {} .. {} ({} days)",
        task.start_date,
        task.end_date,
        duration(task.start_date, task.end_date)
    );
    println!("Overdue:     {}", if is_overdue(task, today) { "yes" } else { "no" });
    if !task.agency.is_empty() {
        println!("Agency:      {}", task.agency);
    }
    if let Some(desc) = &task.description {
        println!("Description: {}", desc);
    }
    let chain = ancestors(&db.tasks, &task.id);
    if !chain.is_empty() {
        let path: Vec<String> = chain.iter().rev().map(|t| format!("{} ({})", t.name, t.id)).collect();
        println!("Parents:     {}", path.join(" > "));
    }
}

/// Apply a partial field update.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    db: &mut Database,
    store: &dyn TaskStore,
    id: String,
    name: Option<String>,
    start: Option<String>,
    end: Option<String>,
    status: Option<Status>,
    progress: Option<u8>,
    delay_reason: Option<String>,
    agency: Option<String>,
    desc: Option<String>,
    color: Option<String>,
) {
    let today = Local::now().date_naive();
    let task_id = resolve_id(db, &id);
    let patch = TaskPatch {
        name,
        status,
        progress,
        start_date: start.as_deref().map(|s| date_arg(s, today)),
        end_date: end.as_deref().map(|s| date_arg(s, today)),
        delay_reason,
        agency,
        description: desc,
        color,
    };
    if patch.is_empty() {
        exit_with("Nothing to update.");
    }
    if let Err(e) = db.patch(&task_id, &patch) {
        exit_with(e);
    }
    save(db, store);
    println!("Updated task {task_id}");
}

/// Shift dates by a whole number of days.
pub fn cmd_shift(db: &mut Database, store: &dyn TaskStore, id: String, days: i64, mode: DragMode) {
    let task_id = resolve_id(db, &id);
    let Some(range) = db.get(&task_id).map(|t| t.range()) else {
        exit_with(format!("Task {task_id} not found."));
    };
    let next = match mode {
        DragMode::Move => range.moved(days),
        DragMode::ResizeStart => range.resized_start(days),
        DragMode::ResizeEnd => range.resized_end(days),
    };
    if let Err(e) = db.set_dates(&task_id, next) {
        exit_with(e);
    }
    save(db, store);
    println!("{task_id}: {} .. {}", next.start, next.end);
}

/// Run one drag gesture from pointer-down to pointer-up.
pub fn cmd_drag(db: &mut Database, store: &dyn TaskStore, day_width: f64, id: String, pixels: f64, mode: DragMode) {
    let task_id = resolve_id(db, &id);
    let Some(task) = db.get(&task_id).cloned() else {
        exit_with(format!("Task {task_id} not found."));
    };
    let mut gesture = DragController::new(day_width);
    gesture.begin(&task, mode, 0.0);
    gesture.pointer_moved(pixels);
    match gesture.end() {
        Some(commit) => {
            if let Err(e) = db.set_dates(&commit.task_id, commit.range) {
                exit_with(e);
            }
            save(db, store);
            println!("{}: {} .. {}", commit.task_id, commit.range.start, commit.range.end);
        }
        None => println!("{task_id}: unchanged"),
    }
}

pub fn cmd_reparent(db: &mut Database, store: &dyn TaskStore, id: String, parent: String) {
    let task_id = resolve_id(db, &id);
    let parent_id = resolve_id(db, &parent);
    if let Err(e) = db.reparent(&task_id, &parent_id) {
        exit_with(e);
    }
    save(db, store);
    if let Some(t) = db.get(&task_id) {
        println!("{} is now a {} under {}", t.name, t.level, parent_id);
    }
}

pub fn cmd_detach(db: &mut Database, store: &dyn TaskStore, id: String) {
    let task_id = resolve_id(db, &id);
    if let Err(e) = db.detach(&task_id) {
        exit_with(e);
    }
    save(db, store);
    println!("{task_id} is now a root workphase");
}

pub fn cmd_toggle(db: &mut Database, store: &dyn TaskStore, id: String) {
    let task_id = resolve_id(db, &id);
    let expanded = match db.toggle_expanded(&task_id) {
        Ok(v) => v,
        Err(e) => exit_with(e),
    };
    save(db, store);
    println!("{task_id} {}", if expanded { "expanded" } else { "collapsed" });
}

pub fn cmd_delete(db: &mut Database, store: &dyn TaskStore, id: String) {
    let task_id = resolve_id(db, &id);
    let removed = match db.delete_cascade(&task_id) {
        Ok(ids) => ids,
        Err(e) => exit_with(e),
    };
    save(db, store);
    println!("Deleted {} task(s).", removed.len());
}

/// Print the visible rows positioned inside one month window.
pub fn cmd_timeline(db: &Database, month: Option<String>, shift: i32, links: bool, filter: Option<String>) {
    let today = Local::now().date_naive();
    let anchor = match month {
        Some(m) => NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d")
            .unwrap_or_else(|_| exit_with(format!("Invalid month: {m} (expected YYYY-MM)"))),
        None => today,
    };
    let anchor = shift_month(anchor, shift);
    let window = month_range(anchor);
    let days = days_in_range(window.start, window.end);
    let visible = db.visible(filter.as_deref().unwrap_or(""));

    println!("{}", month_label(anchor));
    for t in &visible {
        // One character per day column.
        let geo = bar_geometry(t, window.start, 1.0);
        let bar: String = (0..days.len())
            .map(|col| {
                let col = col as f64;
                if col >= geo.left && col < geo.left + geo.width { '█' } else { '·' }
            })
            .collect();
        let flag = if is_overdue(t, today) { "!" } else { " " };
        println!("{bar} {flag} {:>4} {:>3}d  {}", geo.left, geo.width, t.name);
    }

    if links {
        for link in connectors(&visible, window.start) {
            println!(
                "{} (day {}) -> {} (day {})",
                visible[link.parent_row].name,
                link.parent_offset,
                visible[link.child_row].name,
                link.child_offset
            );
        }
    }
}

pub fn cmd_tool(db: &mut Database, store: &dyn TaskStore, name: String, args: String) {
    let args: serde_json::Value = match serde_json::from_str(&args) {
        Ok(v) => v,
        Err(e) => exit_with(format!("Invalid JSON arguments: {e}")),
    };
    let outcome = assistant::dispatch(db, &name, args);
    if outcome.is_success() {
        save(db, store);
    }
    println!("{outcome}");
}

pub fn cmd_tools() {
    match serde_json::to_string_pretty(&assistant::tool_declarations()) {
        Ok(s) => println!("{s}"),
        Err(e) => exit_with(e),
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_date_input() {
        let today = d("2024-01-31");
        assert_eq!(parse_date_input("today", today), Some(today));
        assert_eq!(parse_date_input("Tomorrow", today), Some(d("2024-02-01")));
        assert_eq!(parse_date_input("in 3d", today), Some(d("2024-02-03")));
        assert_eq!(parse_date_input("in 2w", today), Some(d("2024-02-14")));
        assert_eq!(parse_date_input("2024-03-05", today), Some(d("2024-03-05")));
        assert_eq!(parse_date_input("someday", today), None);
        assert_eq!(parse_date_input("in 2000000000000000000w", today), None);
        assert_eq!(parse_date_input("in 9223372036854775807d", today), Some(NaiveDate::MAX));
    }
}
