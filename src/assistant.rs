//! Operations exposed to a natural-language assistant.
//!
//! An external agent receives the current collection as context together
//! with three tool declarations (`addTask`, `updateTask`, `deleteTask`) and
//! invokes them by name with JSON arguments. Every invocation yields a
//! human-readable outcome; unknown tasks produce a "not found" outcome
//! rather than an error.

use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::db::Database;
use crate::fields::{Level, Status};
use crate::task::{Task, TaskPatch};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskArgs {
    pub name: String,
    pub level: Level,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub agency: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub progress: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskArgs {
    /// Task id, or a fragment of its name.
    pub id: String,
    pub updates: TaskPatch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTaskArgs {
    /// Task id, or a fragment of its name.
    pub id: String,
}

/// Result of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Added { name: String, level: Level, start: NaiveDate },
    Updated { name: String },
    Deleted { name: String, removed: usize },
    NotFound { action: &'static str },
    Rejected(String),
    UnknownTool(String),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ToolOutcome::Added { .. } | ToolOutcome::Updated { .. } | ToolOutcome::Deleted { .. }
        )
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutcome::Added { name, level, start } => write!(
                f,
                "Successfully added task \"{}\" ({}) starting on {}.",
                name, level, start
            ),
            ToolOutcome::Updated { name } => write!(f, "Successfully updated task \"{}\"", name),
            ToolOutcome::Deleted { name, removed } => write!(
                f,
                "Successfully deleted task \"{}\" and its children ({} removed).",
                name, removed
            ),
            ToolOutcome::NotFound { action } => {
                write!(f, "Error: Could not find that task to {}.", action)
            }
            ToolOutcome::Rejected(reason) => write!(f, "Error: {}", reason),
            ToolOutcome::UnknownTool(_) => f.write_str("Unknown function called."),
        }
    }
}

/// First task whose id equals `needle` or whose name contains it, ignoring case.
pub fn find_task<'a>(tasks: &'a [Task], needle: &str) -> Option<&'a Task> {
    let wanted = needle.to_lowercase();
    tasks
        .iter()
        .find(|t| t.id == needle || t.name.to_lowercase().contains(&wanted))
}

pub fn add_task(db: &mut Database, args: AddTaskArgs) -> ToolOutcome {
    let mut task = Task::new(args.name, args.level, args.start_date, args.end_date);
    task.parent_id = args.parent_id;
    task.agency = args.agency.unwrap_or_default();
    task.status = args.status.unwrap_or_default();
    task.progress = args.progress.unwrap_or(0);
    match db.add(task) {
        Ok(t) => ToolOutcome::Added {
            name: t.name.clone(),
            level: t.level,
            start: t.start_date,
        },
        Err(e) => {
            warn!("Assistant add rejected: {e}");
            ToolOutcome::Rejected(e.to_string())
        }
    }
}

pub fn update_task(db: &mut Database, args: UpdateTaskArgs) -> ToolOutcome {
    let Some(id) = find_task(&db.tasks, &args.id).map(|t| t.id.clone()) else {
        return ToolOutcome::NotFound { action: "update" };
    };
    match db.patch(&id, &args.updates) {
        Ok(t) => ToolOutcome::Updated { name: t.name.clone() },
        Err(e) => {
            warn!(task_id = %id, "Assistant update rejected: {e}");
            ToolOutcome::Rejected(e.to_string())
        }
    }
}

pub fn delete_task(db: &mut Database, args: DeleteTaskArgs) -> ToolOutcome {
    let Some((id, name)) = find_task(&db.tasks, &args.id).map(|t| (t.id.clone(), t.name.clone())) else {
        return ToolOutcome::NotFound { action: "delete" };
    };
    match db.delete_cascade(&id) {
        Ok(removed) => ToolOutcome::Deleted {
            name,
            removed: removed.len(),
        },
        Err(e) => ToolOutcome::Rejected(e.to_string()),
    }
}

/// Decode JSON arguments and run the named tool.
pub fn dispatch(db: &mut Database, name: &str, args: Value) -> ToolOutcome {
    info!(tool = name, "Assistant tool invoked");
    let outcome = match name {
        "addTask" => serde_json::from_value(args).map(|a| add_task(db, a)),
        "updateTask" => serde_json::from_value(args).map(|a| update_task(db, a)),
        "deleteTask" => serde_json::from_value(args).map(|a| delete_task(db, a)),
        other => return ToolOutcome::UnknownTool(other.to_string()),
    };
    outcome.unwrap_or_else(|e| ToolOutcome::Rejected(format!("invalid arguments for {name}: {e}")))
}

/// Function declarations advertised to the assistant.
pub fn tool_declarations() -> Value {
    let levels: Vec<&str> = Level::ALL.iter().map(|l| l.as_str()).collect();
    let statuses = [Status::InProgress.as_str(), Status::Done.as_str(), Status::Delay.as_str()];
    json!([
        {
            "name": "addTask",
            "parameters": {
                "type": "OBJECT",
                "description": "Adds a new task to the construction schedule. MANDATORY: Name, Level, StartDate, EndDate.",
                "properties": {
                    "name": { "type": "STRING", "description": "The name of the task." },
                    "level": { "type": "STRING", "enum": levels, "description": "The hierarchy level." },
                    "startDate": { "type": "STRING", "description": "ISO date string YYYY-MM-DD." },
                    "endDate": { "type": "STRING", "description": "ISO date string YYYY-MM-DD." },
                    "agency": { "type": "STRING", "description": "Responsible agency." },
                    "status": { "type": "STRING", "enum": statuses, "description": "Current status." },
                    "parentId": { "type": "STRING", "description": "ID of the parent task if applicable." },
                    "progress": { "type": "NUMBER", "description": "0-100 percentage." }
                },
                "required": ["name", "level", "startDate", "endDate"]
            }
        },
        {
            "name": "updateTask",
            "parameters": {
                "type": "OBJECT",
                "description": "Updates an existing task.",
                "properties": {
                    "id": { "type": "STRING", "description": "The ID or name of the task to update." },
                    "updates": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "status": { "type": "STRING", "enum": statuses },
                            "progress": { "type": "NUMBER" },
                            "startDate": { "type": "STRING" },
                            "endDate": { "type": "STRING" },
                            "delayReason": { "type": "STRING" },
                            "agency": { "type": "STRING" },
                            "description": { "type": "STRING" }
                        }
                    }
                },
                "required": ["id", "updates"]
            }
        },
        {
            "name": "deleteTask",
            "parameters": {
                "type": "OBJECT",
                "description": "Deletes a task and its children.",
                "properties": {
                    "id": { "type": "STRING", "description": "The ID or name of the task to delete." }
                },
                "required": ["id"]
            }
        }
    ])
}
