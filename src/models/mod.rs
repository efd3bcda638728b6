//! Data models for hubdeck.
//!
//! This module defines the core data structures:
//! - `Task` - Work items with a priority and a workflow status
//! - `TaskFilter` - Presentation predicates over tasks
//! - `ViewMode` - List or board presentation
//! - `Theme` - Stored appearance preference
//!
//! GitHub resource shapes live in [`github`].

pub mod github;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {} (expected high, medium, low)", s)),
        }
    }
}

/// Task status in the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Progress,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Progress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Progress => "progress",
            TaskStatus::Done => "done",
        }
    }

    /// Column heading used by the board view.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::Progress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "progress" | "in-progress" | "in_progress" => Ok(TaskStatus::Progress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(format!("Unknown status: {} (expected todo, progress, done)", s)),
        }
    }
}

/// A task tracked by the task manager.
///
/// `completed` is derived from `status` and is only ever written through
/// [`Task::set_status`], so the two always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Time-derived identifier
    pub id: String,

    /// Free-text description
    pub text: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    completed: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new `todo` task with the given ID and text.
    pub fn new(id: String, text: String, priority: Priority) -> Self {
        let now = Utc::now();
        Self {
            id,
            text,
            priority,
            status: TaskStatus::Todo,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Set the status and the completion flag together.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed = status == TaskStatus::Done;
    }

    /// Flip between `done` and `todo`.
    pub fn toggle(&mut self) {
        if self.completed {
            self.set_status(TaskStatus::Todo);
        } else {
            self.set_status(TaskStatus::Done);
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Re-derive `completed` after deserializing data that may disagree.
    pub(crate) fn normalize(&mut self) {
        self.completed = self.status == TaskStatus::Done;
    }
}

/// Predicate used to narrow the rendered task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    High,
    Medium,
    Low,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => !task.completed(),
            TaskFilter::Completed => task.completed(),
            TaskFilter::High => task.priority == Priority::High,
            TaskFilter::Medium => task.priority == Priority::Medium,
            TaskFilter::Low => task.priority == Priority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Pending => "pending",
            TaskFilter::Completed => "completed",
            TaskFilter::High => "high",
            TaskFilter::Medium => "medium",
            TaskFilter::Low => "low",
        }
    }
}

impl std::str::FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "pending" => Ok(TaskFilter::Pending),
            "completed" | "done" => Ok(TaskFilter::Completed),
            "high" => Ok(TaskFilter::High),
            "medium" => Ok(TaskFilter::Medium),
            "low" => Ok(TaskFilter::Low),
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// Task presentation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Board,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(ViewMode::List),
            "board" | "kanban" => Ok(ViewMode::Board),
            _ => Err(format!("Unknown view: {} (expected list, board)", s)),
        }
    }
}

/// Stored appearance preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme: {} (expected light, dark)", s)),
        }
    }
}
