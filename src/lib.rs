//! # Workhand
//!
//! Schedule model for a hierarchical project plan rendered as a sidebar
//! outline and a Gantt timeline.
//!
//! ## Key Features
//!
//! - **Four-level hierarchy**: Workphase → Mainwork → In-work → Subwork, kept
//!   acyclic on every reparent and deleted with cascade
//! - **Display order**: depth-first flattening that honours collapsed rows and
//!   a name filter
//! - **Timeline arithmetic**: day offsets, inclusive durations, month windows
//!   and pointer-to-day translation for drag and resize
//! - **Assistant operations**: add / update / delete by id or name fragment,
//!   with JSON tool declarations
//!
//! The collection is owned by the caller. Every mutation computes the next
//! collection from the current one, so a rejected edit never changes state.
//!
//! **Hierarchy Example**:
//! - **Workphase**: "Foundation"
//!   - **Mainwork**: "Excavation"
//!     - **In-work**: "Site survey"
//!       - **Subwork**: "Stake corners"

pub mod assistant;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod gesture;
pub mod hierarchy;
pub mod logging;
pub mod store;
pub mod task;
pub mod timeline;

pub use db::Database;
pub use error::{Result, ScheduleError};
pub use fields::{Level, Status};
pub use task::{DateRange, Task, TaskPatch};
