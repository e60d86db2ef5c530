//! The caller-owned task collection and its mutation paths.
//!
//! `Database` wraps the ordered task list. Each mutation computes the next
//! collection from the current one and installs it only when every check
//! passes, so readers never observe a half-applied edit and a rejected
//! edit leaves the collection exactly as it was.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScheduleError};
use crate::hierarchy;
use crate::task::{validate_task, DateRange, Task, TaskPatch};

/// In-memory task collection, serialised as a flat array of task records.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Database {
    pub tasks: Vec<Task>,
}

impl Database {
    pub fn new(tasks: Vec<Task>) -> Self {
        Database { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Create an index mapping task IDs to their positions in the tasks vector.
    pub fn index(&self) -> HashMap<&str, usize> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn require(&self, id: &str) -> Result<&Task> {
        self.get(id).ok_or_else(|| ScheduleError::TaskNotFound(id.to_string()))
    }

    /// Install a computed successor collection.
    fn install(&mut self, next: Vec<Task>) {
        self.tasks = next;
    }

    /// Append a new task after normalising and validating it.
    pub fn add(&mut self, task: Task) -> Result<&Task> {
        let task = task.normalised();
        validate_task(&task)?;
        if self.get(&task.id).is_some() {
            return Err(ScheduleError::DuplicateId(task.id));
        }
        if let Some(pid) = task.parent_id.as_deref() {
            self.require(pid)?;
        }
        info!(task_id = %task.id, name = %task.name, level = %task.level, "Task added");
        let mut next = self.tasks.clone();
        next.push(task);
        self.install(next);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Replace the stored task with the same id.
    ///
    /// Parent and level must match the stored task; structural moves go
    /// through [`Database::reparent`] and [`Database::detach`].
    pub fn replace(&mut self, task: Task) -> Result<()> {
        let task = task.normalised();
        validate_task(&task)?;
        let pos = self
            .index()
            .get(task.id.as_str())
            .copied()
            .ok_or_else(|| ScheduleError::TaskNotFound(task.id.clone()))?;
        let stored = &self.tasks[pos];
        if stored.parent_id != task.parent_id || stored.level != task.level {
            return Err(ScheduleError::Validation(format!(
                "parent and level of task {} can only change through reparent or detach",
                task.id
            )));
        }
        debug!(task_id = %task.id, "Task replaced");
        let mut next = self.tasks.clone();
        next[pos] = task;
        self.install(next);
        Ok(())
    }

    /// Apply a partial update and return the stored result.
    pub fn patch(&mut self, id: &str, patch: &TaskPatch) -> Result<&Task> {
        let updated = self.require(id)?.patched(patch);
        self.replace(updated)?;
        self.require(id)
    }

    /// Store new dates for a task, typically at the end of a drag gesture.
    pub fn set_dates(&mut self, id: &str, range: DateRange) -> Result<()> {
        let updated = self.require(id)?.clone().with_range(range);
        self.replace(updated)
    }

    /// Flip the sidebar expansion flag. Absent counts as expanded.
    pub fn toggle_expanded(&mut self, id: &str) -> Result<bool> {
        let mut updated = self.require(id)?.clone();
        let expanded = !updated.expanded();
        updated.is_expanded = Some(expanded);
        let pos = self.index()[id];
        let mut next = self.tasks.clone();
        next[pos] = updated;
        self.install(next);
        Ok(expanded)
    }

    /// Move a task under a new parent. See [`hierarchy::reparent`].
    pub fn reparent(&mut self, id: &str, new_parent_id: &str) -> Result<()> {
        let next = hierarchy::reparent(&self.tasks, id, new_parent_id)?;
        self.install(next);
        Ok(())
    }

    /// Turn a task into a root. See [`hierarchy::detach`].
    pub fn detach(&mut self, id: &str) -> Result<()> {
        let next = hierarchy::detach(&self.tasks, id)?;
        self.install(next);
        Ok(())
    }

    /// Delete a task together with all of its descendants. Returns the removed ids.
    pub fn delete_cascade(&mut self, id: &str) -> Result<HashSet<String>> {
        self.require(id)?;
        let ids = hierarchy::cascade_delete(&self.tasks, id);
        self.remove_ids(&ids);
        info!(task_id = id, removed = ids.len(), "Task deleted with descendants");
        Ok(ids)
    }

    /// Remove tasks by IDs and clear parent references pointing to removed tasks.
    pub fn remove_ids(&mut self, ids: &HashSet<String>) {
        let next = self
            .tasks
            .iter()
            .filter(|t| !ids.contains(&t.id))
            .cloned()
            .map(|mut t| {
                if t.parent_id.as_ref().is_some_and(|p| ids.contains(p)) {
                    t.parent_id = None;
                }
                t
            })
            .collect();
        self.install(next);
    }

    /// Display order for the sidebar and timeline, filtered by name.
    pub fn visible(&self, query: &str) -> Vec<&Task> {
        if query.is_empty() {
            hierarchy::flatten(&self.tasks, |_| true)
        } else {
            hierarchy::flatten(&self.tasks, hierarchy::name_filter(query))
        }
    }
}

/// Resolve a task identifier (either ID or name) to a task.
/// Names match case-insensitively and must be unambiguous.
pub fn resolve_task_identifier<'a>(identifier: &str, db: &'a Database) -> Result<&'a Task> {
    if let Some(task) = db.get(identifier) {
        return Ok(task);
    }

    let wanted = identifier.to_lowercase();
    let matches: Vec<&Task> = db
        .tasks
        .iter()
        .filter(|task| task.name.to_lowercase() == wanted)
        .collect();

    match matches.len() {
        0 => Err(ScheduleError::TaskNotFound(identifier.to_string())),
        1 => Ok(matches[0]),
        _ => {
            let mut msg = format!("multiple tasks are named '{}':", identifier);
            for task in matches {
                msg.push_str(&format!("\n  {}: {} ({})", task.id, task.name, task.level));
            }
            msg.push_str("\nPlease use the specific ID instead.");
            Err(ScheduleError::Validation(msg))
        }
    }
}
