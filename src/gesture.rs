//! Drag gesture state machine for moving and resizing task bars.
//!
//! A gesture starts on a bar (or one of its edge handles), receives absolute
//! pointer positions while the pointer moves, and finishes on release:
//!
//! ```text
//! Idle -> Dragging { mode, origin_x, origin range } -> Idle
//! ```
//!
//! Every sample is computed from the dates captured at gesture start plus the
//! total displacement from the origin, so rounding never accumulates.

use clap::ValueEnum;
use tracing::{debug, trace};

use crate::task::{DateRange, Task};
use crate::timeline::pixel_delta_to_days;

/// What part of the bar the gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// Snapshot captured when a gesture begins.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub task_id: String,
    pub mode: DragMode,
    pub origin_x: f64,
    pub origin: DateRange,
    /// Latest dates produced by a pointer sample, if any.
    pub preview: Option<DateRange>,
}

impl DragSession {
    /// Dates for a pointer at `pointer_x`, or `None` when a move has not left its column.
    pub fn sample(&self, pointer_x: f64, column_width: f64) -> Option<DateRange> {
        let delta = pixel_delta_to_days(pointer_x - self.origin_x, column_width);
        match self.mode {
            DragMode::Move if delta == 0 => None,
            DragMode::Move => Some(self.origin.moved(delta)),
            DragMode::ResizeStart => Some(self.origin.resized_start(delta)),
            DragMode::ResizeEnd => Some(self.origin.resized_end(delta)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Final result handed to the update path when a gesture ends.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub task_id: String,
    pub range: DateRange,
}

/// Single-pointer drag controller.
#[derive(Debug, Clone)]
pub struct DragController {
    state: GestureState,
    column_width: f64,
}

impl DragController {
    pub fn new(column_width: f64) -> Self {
        DragController {
            state: GestureState::Idle,
            column_width,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Start a gesture on `task`. Ignored while another gesture is active.
    pub fn begin(&mut self, task: &Task, mode: DragMode, pointer_x: f64) -> bool {
        if self.is_dragging() {
            return false;
        }
        debug!(task_id = %task.id, ?mode, "Drag started");
        self.state = GestureState::Dragging(DragSession {
            task_id: task.id.clone(),
            mode,
            origin_x: pointer_x,
            origin: task.range(),
            preview: None,
        });
        true
    }

    /// Feed an absolute pointer position. Returns the dates to display, if they changed.
    ///
    /// A move that returns to its starting column drops the pending preview,
    /// so releasing there commits nothing, and yields the original dates.
    pub fn pointer_moved(&mut self, pointer_x: f64) -> Option<DateRange> {
        let column_width = self.column_width;
        let GestureState::Dragging(session) = &mut self.state else {
            return None;
        };
        let Some(range) = session.sample(pointer_x, column_width) else {
            return session.preview.take().map(|_| session.origin);
        };
        trace!(task_id = %session.task_id, start = %range.start, end = %range.end, "Drag sample");
        session.preview = Some(range);
        Some(range)
    }

    /// Finish the gesture. Yields a commit only when some sample produced dates.
    pub fn end(&mut self) -> Option<DragCommit> {
        match std::mem::take(&mut self.state) {
            GestureState::Idle => None,
            GestureState::Dragging(session) => {
                debug!(task_id = %session.task_id, committed = session.preview.is_some(), "Drag finished");
                session.preview.map(|range| DragCommit {
                    task_id: session.task_id,
                    range,
                })
            }
        }
    }

    /// Drop the gesture without committing anything.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Level;
    use crate::timeline::DAY_WIDTH;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bar() -> Task {
        Task::new("Pour slab", Level::InWork, d("2024-01-10"), d("2024-01-12")).with_id("t")
    }

    #[test]
    fn test_move_uses_total_displacement() {
        let mut ctl = DragController::new(DAY_WIDTH);
        assert!(ctl.begin(&bar(), DragMode::Move, 100.0));
        assert_eq!(ctl.pointer_moved(110.0), None);
        let r = ctl.pointer_moved(100.0 + 2.0 * DAY_WIDTH).unwrap();
        assert_eq!(r, DateRange::new(d("2024-01-12"), d("2024-01-14")));
        let r = ctl.pointer_moved(100.0 - DAY_WIDTH).unwrap();
        assert_eq!(r, DateRange::new(d("2024-01-09"), d("2024-01-11")));
        let commit = ctl.end().unwrap();
        assert_eq!(commit.task_id, "t");
        assert_eq!(commit.range, DateRange::new(d("2024-01-09"), d("2024-01-11")));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_move_without_leaving_column_commits_nothing() {
        let mut ctl = DragController::new(DAY_WIDTH);
        ctl.begin(&bar(), DragMode::Move, 0.0);
        assert_eq!(ctl.pointer_moved(5.0), None);
        assert_eq!(ctl.end(), None);
    }

    #[test]
    fn test_move_back_to_origin_commits_nothing() {
        let mut ctl = DragController::new(DAY_WIDTH);
        ctl.begin(&bar(), DragMode::Move, 0.0);
        assert!(ctl.pointer_moved(2.0 * DAY_WIDTH).is_some());
        assert_eq!(ctl.pointer_moved(0.0), Some(bar().range()));
        assert_eq!(ctl.pointer_moved(4.0), None);
        assert_eq!(ctl.end(), None);
    }

    #[test]
    fn test_move_away_and_back_then_away_again() {
        let mut ctl = DragController::new(DAY_WIDTH);
        ctl.begin(&bar(), DragMode::Move, 0.0);
        ctl.pointer_moved(2.0 * DAY_WIDTH);
        ctl.pointer_moved(0.0);
        ctl.pointer_moved(-DAY_WIDTH);
        let commit = ctl.end().unwrap();
        assert_eq!(commit.range, DateRange::new(d("2024-01-09"), d("2024-01-11")));
    }

    #[test]
    fn test_resize_applies_zero_delta() {
        let mut ctl = DragController::new(DAY_WIDTH);
        ctl.begin(&bar(), DragMode::ResizeEnd, 0.0);
        let r = ctl.pointer_moved(3.0).unwrap();
        assert_eq!(r, bar().range());
        let r = ctl.pointer_moved(-10.0 * DAY_WIDTH).unwrap();
        assert_eq!(r, DateRange::new(d("2024-01-10"), d("2024-01-10")));
    }

    #[test]
    fn test_resize_start_clamps_to_end() {
        let mut ctl = DragController::new(DAY_WIDTH);
        ctl.begin(&bar(), DragMode::ResizeStart, 0.0);
        let r = ctl.pointer_moved(5.0 * DAY_WIDTH).unwrap();
        assert_eq!(r, DateRange::new(d("2024-01-12"), d("2024-01-12")));
    }

    #[test]
    fn test_second_begin_is_ignored() {
        let mut ctl = DragController::new(DAY_WIDTH);
        assert!(ctl.begin(&bar(), DragMode::Move, 0.0));
        let other = bar().with_id("other");
        assert!(!ctl.begin(&other, DragMode::ResizeEnd, 0.0));
        match ctl.state() {
            GestureState::Dragging(s) => assert_eq!(s.task_id, "t"),
            GestureState::Idle => panic!("expected an active gesture"),
        }
        ctl.cancel();
        assert_eq!(ctl.pointer_moved(500.0), None);
        assert_eq!(ctl.end(), None);
    }
}
