//! Task list and board view models.

use crate::models::{Priority, Task, TaskFilter, TaskStatus, ViewMode};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: String,
    pub text: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            priority: task.priority,
            status: task.status,
            completed: task.completed(),
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub title: &'static str,
    pub tasks: Vec<TaskRow>,
}

/// Totals over the whole task set, independent of the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum TaskLayout {
    List { tasks: Vec<TaskRow> },
    Board { columns: Vec<BoardColumn> },
}

/// Full rendering of the task manager.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub filter: TaskFilter,
    pub counts: TaskCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub layout: TaskLayout,
}

/// Render `tasks` in `mode`, keeping only those matching `filter`.
pub fn render(
    tasks: &[Task],
    filter: TaskFilter,
    mode: ViewMode,
    last_sync: Option<DateTime<Utc>>,
) -> TaskView {
    let completed = tasks.iter().filter(|t| t.completed()).count();
    let counts = TaskCounts {
        total: tasks.len(),
        completed,
        pending: tasks.len() - completed,
    };

    let visible = tasks.iter().filter(|t| filter.matches(t));
    let layout = match mode {
        ViewMode::List => TaskLayout::List {
            tasks: visible.map(TaskRow::from).collect(),
        },
        ViewMode::Board => {
            let visible: Vec<&Task> = visible.collect();
            TaskLayout::Board {
                columns: TaskStatus::ALL
                    .iter()
                    .map(|status| BoardColumn {
                        status: *status,
                        title: status.label(),
                        tasks: visible
                            .iter()
                            .filter(|t| t.status == *status)
                            .map(|t| TaskRow::from(*t))
                            .collect(),
                    })
                    .collect(),
            }
        }
    };

    TaskView {
        filter,
        counts,
        last_sync,
        layout,
    }
}

fn checkbox(row: &TaskRow) -> &'static str {
    if row.completed { "[x]" } else { "[ ]" }
}

impl TaskView {
    /// Rows in display order regardless of layout.
    pub fn rows(&self) -> Vec<&TaskRow> {
        match &self.layout {
            TaskLayout::List { tasks } => tasks.iter().collect(),
            TaskLayout::Board { columns } => columns.iter().flat_map(|c| c.tasks.iter()).collect(),
        }
    }

    pub fn to_human(&self) -> String {
        let mut lines = Vec::new();
        match &self.layout {
            TaskLayout::List { tasks } => {
                if tasks.is_empty() {
                    lines.push("No tasks.".to_string());
                }
                for row in tasks {
                    lines.push(format!(
                        "{} {}  {} [{}] ({})",
                        checkbox(row),
                        row.id,
                        row.text,
                        row.priority,
                        row.status
                    ));
                }
            }
            TaskLayout::Board { columns } => {
                for column in columns {
                    lines.push(format!("== {} ({}) ==", column.title, column.tasks.len()));
                    for row in &column.tasks {
                        lines.push(format!("  {}  {} [{}]", row.id, row.text, row.priority));
                    }
                }
            }
        }
        lines.push(format!(
            "{} total, {} completed, {} pending (filter: {})",
            self.counts.total,
            self.counts.completed,
            self.counts.pending,
            self.filter.as_str()
        ));
        if let Some(at) = self.last_sync {
            lines.push(format!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks() -> Vec<Task> {
        let mut a = Task::new("1".into(), "Write docs".into(), Priority::High);
        a.set_status(TaskStatus::Progress);
        let mut b = Task::new("2".into(), "Ship".into(), Priority::Low);
        b.set_status(TaskStatus::Done);
        let c = Task::new("3".into(), "Plan".into(), Priority::Low);
        vec![a, b, c]
    }

    #[test]
    fn test_list_view_respects_filter() {
        let view = render(&tasks(), TaskFilter::Low, ViewMode::List, None);
        let ids: Vec<_> = view.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(view.counts.total, 3);
        assert_eq!(view.counts.completed, 1);
        assert_eq!(view.counts.pending, 2);
    }

    #[test]
    fn test_board_groups_by_status() {
        let view = render(&tasks(), TaskFilter::All, ViewMode::Board, None);
        let TaskLayout::Board { columns } = &view.layout else {
            panic!("expected board layout");
        };
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].status, TaskStatus::Todo);
        assert_eq!(columns[0].tasks[0].id, "3");
        assert_eq!(columns[1].tasks[0].id, "1");
        assert_eq!(columns[2].tasks[0].id, "2");
    }

    #[test]
    fn test_board_json_shape() {
        let view = render(&tasks(), TaskFilter::Pending, ViewMode::Board, None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "board");
        assert_eq!(json["filter"], "pending");
        assert_eq!(json["columns"][2]["tasks"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_human_output() {
        let view = render(&tasks(), TaskFilter::All, ViewMode::List, None);
        let text = view.to_human();
        assert!(text.contains("[x] 2  Ship [low] (done)"));
        assert!(text.contains("3 total, 1 completed, 2 pending"));

        let empty = render(&[], TaskFilter::All, ViewMode::List, None);
        assert!(empty.to_human().starts_with("No tasks."));
    }
}
