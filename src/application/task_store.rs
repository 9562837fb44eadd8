use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult};
use crate::domain::{Filter, Task, TaskId, TaskMeta};
use crate::ports::SnapshotStorage;

/// Fixed key the task collection is persisted under.
pub const STORAGE_KEY: &str = "tasks";

const SNAPSHOT_VERSION: u32 = 1;

/// Persisted envelope; older installs stored a bare task array, which
/// `parse_snapshot` still accepts.
#[derive(Debug, Deserialize)]
struct Snapshot {
    version: u32,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    tasks: &'a [Task],
}

/// Aggregate statistics over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed_count: usize,
    pub completion_percentage: u32,
    pub overdue_count: usize,
}

/// Owns the task collection and the current view state.
///
/// Tasks are kept in insertion order; new tasks are appended and the
/// insertion order is the canonical display order. Every mutation
/// writes the whole collection back through the storage collaborator;
/// write failures are logged and the in-memory state stays
/// authoritative for the rest of the session.
pub struct TaskStore {
    storage: Arc<dyn SnapshotStorage>,
    tasks: Vec<Task>,
    filter: Filter,
    search: String,
}

impl TaskStore {
    /// Reconstruct the store from whatever the storage collaborator
    /// holds. Missing or unreadable data starts an empty collection;
    /// this never fails.
    pub async fn load(storage: Arc<dyn SnapshotStorage>) -> Self {
        let tasks = match storage.load(STORAGE_KEY).await {
            Ok(Some(blob)) => match parse_snapshot(&blob) {
                Ok(tasks) => sanitize(tasks),
                Err(e) => {
                    tracing::warn!("Discarding unreadable task data: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read persisted tasks: {e}");
                Vec::new()
            }
        };

        Self {
            storage,
            tasks,
            filter: Filter::All,
            search: String::new(),
        }
    }

    /// The full collection in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Append a new task. Blank text is a no-op returning `None`.
    pub async fn add(&mut self, text: &str, meta: TaskMeta) -> Option<Task> {
        let task = Task::new(text, meta)?;
        self.tasks.push(task.clone());
        self.persist().await;
        Some(task)
    }

    /// Flip completion for `id`; unknown ids are ignored.
    pub async fn toggle_completed(&mut self, id: TaskId) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task.completed = !task.completed;
        task.completed_at = if task.completed {
            Some(Utc::now())
        } else {
            None
        };
        self.persist().await;
    }

    /// Replace the text of `id` with the trimmed value. Blank text or
    /// an unknown id is a no-op; every other field is left untouched.
    pub async fn edit(&mut self, id: TaskId, new_text: &str) {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return;
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task.text = new_text.to_string();
        self.persist().await;
    }

    /// Full-record replace by id, for when several metadata fields
    /// change together. The stored `id` and `created_at` survive
    /// regardless of what the input carries, and the completion
    /// timestamp is kept consistent with the completion flag.
    pub async fn update(&mut self, incoming: Task) {
        let text = incoming.text.trim().to_string();
        if text.is_empty() {
            return;
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == incoming.id) else {
            return;
        };
        let id = task.id;
        let created_at = task.created_at;
        *task = incoming;
        task.id = id;
        task.created_at = created_at;
        task.text = text;
        if !task.completed {
            task.completed_at = None;
        } else if task.completed_at.is_none() {
            task.completed_at = Some(Utc::now());
        }
        self.persist().await;
    }

    /// Remove `id`; unknown ids are ignored.
    pub async fn delete(&mut self, id: TaskId) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() != before {
            self.persist().await;
        }
    }

    /// Remove every completed task.
    pub async fn clear_completed(&mut self) {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        if self.tasks.len() != before {
            self.persist().await;
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Tasks passing the current search and filter, recomputed from
    /// the live collection on every call. Search and selector compose
    /// by logical AND.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let query = self.search.trim();
        self.tasks
            .iter()
            .filter(|t| query.is_empty() || t.matches_search(query))
            .filter(|t| self.filter.matches(t))
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        let total = self.tasks.len();
        let completed_count = self.tasks.iter().filter(|t| t.completed).count();
        let completion_percentage = if total == 0 {
            0
        } else {
            ((completed_count as f64 / total as f64) * 100.0).round() as u32
        };
        let overdue_count = self.tasks.iter().filter(|t| t.is_overdue()).count();

        TaskStats {
            total,
            completed_count,
            completion_percentage,
            overdue_count,
        }
    }

    /// Serialize the full collection in the persisted envelope form.
    pub fn export_snapshot(&self) -> AppResult<String> {
        serde_json::to_string_pretty(&SnapshotRef {
            version: SNAPSHOT_VERSION,
            tasks: &self.tasks,
        })
        .map_err(|e| AppError::DataFormat(e.to_string()))
    }

    /// Replace the whole collection with the parsed snapshot. Input
    /// that does not parse to the task shape leaves the current
    /// collection untouched and reports `AppError::DataFormat`.
    pub async fn import_snapshot(&mut self, blob: &str) -> AppResult<()> {
        let tasks = parse_snapshot(blob)?;
        self.tasks = sanitize(tasks);
        self.persist().await;
        Ok(())
    }

    async fn persist(&self) {
        let blob = match serde_json::to_string(&SnapshotRef {
            version: SNAPSHOT_VERSION,
            tasks: &self.tasks,
        }) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("Failed to serialize tasks: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.save(STORAGE_KEY, &blob).await {
            tracing::warn!("Failed to persist tasks: {e}");
        }
    }
}

fn parse_snapshot(blob: &str) -> AppResult<Vec<Task>> {
    if let Ok(snapshot) = serde_json::from_str::<Snapshot>(blob) {
        if snapshot.version > SNAPSHOT_VERSION {
            tracing::warn!(
                version = snapshot.version,
                "Task data written by a newer version"
            );
        }
        return Ok(snapshot.tasks);
    }
    serde_json::from_str::<Vec<Task>>(blob).map_err(|e| AppError::DataFormat(e.to_string()))
}

/// Drop records that would violate collection invariants: blank text,
/// a completion flag inconsistent with its timestamp, or a duplicate
/// id. Surviving text is stored trimmed.
fn sanitize(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(tasks.len());
    for mut task in tasks {
        task.text = task.text.trim().to_string();
        if task.text.is_empty() {
            tracing::warn!(id = %task.id, "Dropping task with empty text");
        } else if task.completed != task.completed_at.is_some() {
            tracing::warn!(id = %task.id, "Dropping task with inconsistent completion state");
        } else if !seen.insert(task.id) {
            tracing::warn!(id = %task.id, "Dropping task with duplicate id");
        } else {
            kept.push(task);
        }
    }
    kept
}
