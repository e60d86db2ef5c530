use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task id already in use: {0}")]
    DuplicateId(String),

    #[error("Task {0} cannot be its own parent")]
    SelfParent(String),

    #[error("Cannot drag a parent into its own child hierarchy ({task} -> {target})")]
    CyclicReparent { task: String, target: String },

    #[error("Invalid task: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScheduleError {
    /// Whether the error is a structural rejection of a hierarchy edit.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ScheduleError::SelfParent(_) | ScheduleError::CyclicReparent { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
