//! Task manager controller.
//!
//! [`TaskState`] holds the ordered task list (newest first) plus the current
//! filter and view. [`TaskManager`] applies operations to it. Every mutation
//! writes the full list back to the item store as a single JSON array and
//! returns a full re-render; there is no partial update path.

pub mod sync;
pub mod view;

pub use sync::{SimulatedSync, SyncBackend};
pub use view::{TaskCounts, TaskLayout, TaskRow, TaskView};

use crate::models::{Priority, Task, TaskFilter, TaskStatus, ViewMode};
use crate::notify::Notifier;
use crate::storage::{self, ItemStore, LAST_SYNC_KEY, TASKS_KEY};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Confirms everything (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// In-memory task manager state.
#[derive(Debug, Clone, Default)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub filter: TaskFilter,
    pub view: ViewMode,
    pub last_sync: Option<DateTime<Utc>>,
}

impl TaskState {
    /// Load tasks and the last-sync timestamp. A missing key is an empty list.
    pub fn load(store: &dyn ItemStore) -> Result<Self> {
        let mut tasks: Vec<Task> = match store.get_item(TASKS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        for task in &mut tasks {
            task.normalize();
        }
        let last_sync = store
            .get_item(LAST_SYNC_KEY)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Ok(Self {
            tasks,
            last_sync,
            ..Default::default()
        })
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn render(&self) -> TaskView {
        view::render(&self.tasks, self.filter, self.view, self.last_sync)
    }
}

/// A record detached for editing; applied with [`TaskManager::commit_edit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub id: String,
    pub text: String,
    pub priority: Priority,
    pub status: TaskStatus,
}

/// Result of a mutating operation.
#[derive(Debug, Clone, Serialize)]
pub struct Changed {
    pub task: Task,
    pub view: TaskView,
}

/// Result of a sync.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub backend: &'static str,
    pub synced_at: DateTime<Utc>,
    pub task_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TaskManager {
    default_priority: Priority,
}

impl TaskManager {
    pub fn new(default_priority: Priority) -> Self {
        Self { default_priority }
    }

    /// Persist `tasks` as the full set and only then adopt it, so a failed
    /// write leaves `state` at its previous contents.
    fn commit(
        &self,
        state: &mut TaskState,
        store: &mut dyn ItemStore,
        tasks: Vec<Task>,
    ) -> Result<TaskView> {
        store.set_item(TASKS_KEY, &serde_json::to_string(&tasks)?)?;
        state.tasks = tasks;
        Ok(state.render())
    }

    /// Insert a new `todo` task at the head of the list.
    pub fn add(
        &self,
        state: &mut TaskState,
        store: &mut dyn ItemStore,
        notes: &mut Notifier,
        text: &str,
        priority: Option<Priority>,
    ) -> Result<Changed> {
        let text = text.trim();
        if text.is_empty() {
            notes.error("Please enter a task description");
            return Err(Error::InvalidInput("task text must not be empty".to_string()));
        }

        let task = Task::new(
            storage::generate_id(text),
            text.to_string(),
            priority.unwrap_or(self.default_priority),
        );
        let mut tasks = state.tasks.clone();
        tasks.insert(0, task.clone());
        let view = self.commit(state, store, tasks)?;
        tracing::debug!(id = %task.id, "task added");
        notes.success("Task added");
        Ok(Changed { task, view })
    }

    /// Flip completion and status together.
    pub fn toggle(
        &self,
        state: &mut TaskState,
        store: &mut dyn ItemStore,
        id: &str,
    ) -> Result<Changed> {
        let mut tasks = state.tasks.clone();
        let task = find_mut(&mut tasks, id)?;
        task.toggle();
        let task = task.clone();
        let view = self.commit(state, store, tasks)?;
        Ok(Changed { task, view })
    }

    /// Detach one record for editing.
    pub fn begin_edit(&self, state: &TaskState, id: &str) -> Result<TaskDraft> {
        let task = state
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("task {}", id)))?;
        Ok(TaskDraft {
            id: task.id.clone(),
            text: task.text.clone(),
            priority: task.priority,
            status: task.status,
        })
    }

    /// Apply an edited draft to the record it was taken from.
    pub fn commit_edit(
        &self,
        state: &mut TaskState,
        store: &mut dyn ItemStore,
        notes: &mut Notifier,
        draft: TaskDraft,
    ) -> Result<Changed> {
        let text = draft.text.trim();
        if text.is_empty() {
            notes.error("Please enter a task description");
            return Err(Error::InvalidInput("task text must not be empty".to_string()));
        }

        let mut tasks = state.tasks.clone();
        let task = find_mut(&mut tasks, &draft.id)?;
        task.text = text.to_string();
        task.priority = draft.priority;
        task.set_status(draft.status);
        task.touch();
        let task = task.clone();
        let view = self.commit(state, store, tasks)?;
        notes.success("Task updated");
        Ok(Changed { task, view })
    }

    /// Remove one task after confirmation. Returns `None` when declined.
    pub fn delete(
        &self,
        state: &mut TaskState,
        store: &mut dyn ItemStore,
        notes: &mut Notifier,
        id: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<Changed>> {
        let index = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("task {}", id)))?;

        let prompt = format!("Delete task \"{}\"?", state.tasks[index].text);
        if !confirm.confirm(&prompt) {
            return Ok(None);
        }

        let mut tasks = state.tasks.clone();
        let task = tasks.remove(index);
        let view = self.commit(state, store, tasks)?;
        notes.success("Task deleted");
        Ok(Some(Changed { task, view }))
    }

    pub fn set_filter(&self, state: &mut TaskState, filter: TaskFilter) -> TaskView {
        state.filter = filter;
        state.render()
    }

    pub fn set_view(&self, state: &mut TaskState, mode: ViewMode) -> TaskView {
        state.view = mode;
        state.render()
    }

    /// Hand the task set to `backend` and record the sync time.
    pub fn sync(
        &self,
        state: &mut TaskState,
        store: &mut dyn ItemStore,
        notes: &mut Notifier,
        backend: &dyn SyncBackend,
    ) -> Result<SyncReport> {
        notes.info("Syncing tasks...");
        if let Err(e) = backend.sync(&state.tasks) {
            notes.error("Sync failed");
            return Err(e);
        }

        let now = Utc::now();
        store.set_item(LAST_SYNC_KEY, &now.to_rfc3339())?;
        state.last_sync = Some(now);
        notes.success("Tasks synced");
        Ok(SyncReport {
            backend: backend.name(),
            synced_at: now,
            task_count: state.tasks.len(),
        })
    }
}

fn find_mut<'a>(tasks: &'a mut [Task], id: &str) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::NotFound(format!("task {}", id)))
}
