//! Task data structure and related functionality.
//!
//! This module defines the `Task` record that is the single entity of the
//! schedule model, the `TaskPatch` partial update used by edits and the
//! assistant, and the validation rules a task must satisfy before it is
//! accepted into a collection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ScheduleError};
use crate::fields::*;

/// A scheduled work item.
///
/// Tasks form a forest through the weak `parent_id` reference
/// (Workphase > Mainwork > In-work > Subwork). Membership is always
/// computed by scanning the collection; a task never stores its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}

/// Inclusive calendar range of a task bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }
}

/// Partial field update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

/// Generate a short opaque task identifier.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(9);
    id
}

impl Task {
    /// Create a task with a fresh id and the defaults a new task receives.
    pub fn new(name: impl Into<String>, level: Level, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Task {
            id: generate_id(),
            name: name.into(),
            level,
            parent_id: None,
            start_date,
            end_date,
            progress: 0,
            agency: String::new(),
            status: Status::InProgress,
            delay_reason: None,
            description: None,
            color: None,
            dependencies: None,
            is_expanded: Some(true),
        }
    }

    /// Create a subtask of `parent`, one level deeper than it.
    pub fn child_of(parent: &Task, name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let mut task = Task::new(name, parent.level.next(), start_date, end_date);
        task.parent_id = Some(parent.id.clone());
        task
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Absent counts as expanded.
    pub fn expanded(&self) -> bool {
        self.is_expanded != Some(false)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.start_date = range.start;
        self.end_date = range.end;
        self
    }

    /// Apply a partial update and return the resulting task.
    pub fn patched(&self, patch: &TaskPatch) -> Task {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(progress) = patch.progress {
            next.progress = progress;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        if let Some(reason) = &patch.delay_reason {
            next.delay_reason = Some(reason.clone());
        }
        if let Some(agency) = &patch.agency {
            next.agency = agency.clone();
        }
        if let Some(description) = &patch.description {
            next.description = Some(description.clone());
        }
        if let Some(color) = &patch.color {
            next.color = Some(color.clone());
        }
        next
    }

    /// Done forces full progress; a delay reason only survives on delayed tasks.
    pub fn normalised(mut self) -> Task {
        if self.status == Status::Done {
            self.progress = 100;
        }
        if self.status != Status::Delay {
            self.delay_reason = None;
        }
        self
    }
}

/// Check the required-field rules an edit must satisfy before it is stored.
pub fn validate_task(task: &Task) -> Result<()> {
    if task.id.trim().is_empty() {
        return Err(ScheduleError::Validation("task id cannot be empty".into()));
    }
    if task.name.trim().is_empty() {
        return Err(ScheduleError::Validation(format!("task {} has an empty name", task.id)));
    }
    if task.progress > 100 {
        return Err(ScheduleError::Validation(format!(
            "task {} has progress {} (must be between 0 and 100)",
            task.id, task.progress
        )));
    }
    if task.status == Status::Delay
        && task.delay_reason.as_deref().map_or(true, |r| r.trim().is_empty())
    {
        return Err(ScheduleError::Validation(format!(
            "task {} is delayed but no delay reason was given",
            task.id
        )));
    }
    if task.end_date < task.start_date {
        return Err(ScheduleError::Validation(format!(
            "task {} ends ({}) before it starts ({})",
            task.id, task.end_date, task.start_date
        )));
    }
    Ok(())
}
