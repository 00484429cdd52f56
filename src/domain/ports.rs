//! Ports to external collaborators.
//!
//! The engine reads task snapshots and emits field-level update commands;
//! it never owns task storage. These traits define that seam following the
//! repository pattern: hosts supply their own adapters, and the crate ships
//! an in-memory adapter for tests and embedding
//! (`infrastructure::memory_store`).

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::models::{Assignee, TaskPriority, TaskSnapshot, TeamMember};

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Update rejected: {0}")]
    UpdateRejected(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A single field-level change to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldUpdate {
    AddAssignee { assignee: Assignee },
    SetPriority { priority: TaskPriority },
    AddTag { tag: String },
    SetDueDate { due_date: NaiveDate },
}

/// An update command emitted toward the external task store.
///
/// There is no transactional guarantee beyond per-call success/failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub task_id: Uuid,
    pub updates: Vec<FieldUpdate>,
}

impl TaskUpdate {
    pub fn single(task_id: Uuid, update: FieldUpdate) -> Self {
        Self {
            task_id,
            updates: vec![update],
        }
    }
}

/// Read access to task snapshots, history, and team membership.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Get the current snapshot of a task.
    async fn get_task(&self, id: Uuid) -> Result<Option<TaskSnapshot>, StoreError>;

    /// All open (not completed) tasks for a team.
    async fn open_tasks(&self, team_id: Uuid) -> Result<Vec<TaskSnapshot>, StoreError>;

    /// Completed tasks for a team, most recent first.
    async fn completed_tasks(&self, team_id: Uuid) -> Result<Vec<TaskSnapshot>, StoreError>;

    /// Members of a team, in the store's stable order.
    async fn team_members(&self, team_id: Uuid) -> Result<Vec<TeamMember>, StoreError>;
}

/// Write sink accepting field-level update commands.
#[async_trait]
pub trait MutationSink: Send + Sync {
    /// Apply an update command. Success means the store accepted the
    /// command, not that any downstream effect completed.
    async fn apply(&self, update: TaskUpdate) -> Result<(), StoreError>;
}
