//! Enumerations and field types for schedule tasks.
//!
//! This module defines the closed four-value hierarchy level enumeration and
//! the task status values, together with the total functions that map a
//! level to its depth and to the level one step deeper.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Hierarchical task levels, ordered from the broadest phase to the finest work item.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    #[default]
    #[serde(rename = "Workphase")]
    Workphase,
    #[serde(rename = "Mainwork")]
    Mainwork,
    #[serde(rename = "In-work", alias = "InWork")]
    #[value(name = "in-work")]
    InWork,
    #[serde(rename = "Subwork")]
    Subwork,
}

impl Level {
    /// All levels in hierarchy order.
    pub const ALL: [Level; 4] = [Level::Workphase, Level::Mainwork, Level::InWork, Level::Subwork];

    /// Depth of the level in the hierarchy, 0 for Workphase through 3 for Subwork.
    pub fn depth(self) -> usize {
        match self {
            Level::Workphase => 0,
            Level::Mainwork => 1,
            Level::InWork => 2,
            Level::Subwork => 3,
        }
    }

    /// The level a child of this level receives. Subwork is the floor.
    pub fn next(self) -> Level {
        match self {
            Level::Workphase => Level::Mainwork,
            Level::Mainwork => Level::InWork,
            Level::InWork => Level::Subwork,
            Level::Subwork => Level::Subwork,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Workphase => "Workphase",
            Level::Mainwork => "Mainwork",
            Level::InWork => "In-work",
            Level::Subwork => "Subwork",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task completion status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
    #[serde(rename = "Delay")]
    Delay,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::InProgress => "In Progress",
            Status::Done => "Done",
            Status::Delay => "Delay",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_level_clamps_at_subwork() {
        assert_eq!(Level::Workphase.next(), Level::Mainwork);
        assert_eq!(Level::Mainwork.next(), Level::InWork);
        assert_eq!(Level::InWork.next(), Level::Subwork);
        assert_eq!(Level::Subwork.next(), Level::Subwork);
    }

    #[test]
    fn test_depth_follows_order() {
        for (i, level) in Level::ALL.iter().enumerate() {
            assert_eq!(level.depth(), i);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Level::InWork).unwrap(), "\"In-work\"");
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"In Progress\"");
        let status: Status = serde_json::from_str("\"Delay\"").unwrap();
        assert_eq!(status, Status::Delay);
        let level: Level = serde_json::from_str("\"Subwork\"").unwrap();
        assert_eq!(level, Level::Subwork);
    }
}
