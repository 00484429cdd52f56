//! In-memory task store adapter.
//!
//! Implements the `TaskStore` and `MutationSink` ports over process-local
//! state. Real deployments supply their own adapters over whatever storage
//! the host uses; this one backs the test suites and lightweight embedding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{TaskSnapshot, TeamMember};
use crate::domain::ports::{FieldUpdate, MutationSink, StoreError, TaskStore, TaskUpdate};

/// Process-local store of tasks and team membership.
#[derive(Default)]
pub struct InMemoryStore {
    tasks: RwLock<HashMap<Uuid, (Uuid, TaskSnapshot)>>,
    members: RwLock<HashMap<Uuid, Vec<TeamMember>>>,
    reject_updates: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task under a team.
    pub fn add_task(&self, team_id: Uuid, task: TaskSnapshot) {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        tasks.insert(task.id, (team_id, task));
    }

    /// Add a member to a team. Member order is stable.
    pub fn add_member(&self, team_id: Uuid, member: TeamMember) {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        members.entry(team_id).or_default().push(member);
    }

    /// Make every subsequent `apply` call fail, for failure-path tests.
    pub fn set_reject_updates(&self, reject: bool) {
        self.reject_updates.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn get_task(&self, id: Uuid) -> Result<Option<TaskSnapshot>, StoreError> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks.get(&id).map(|(_, t)| t.clone()))
    }

    async fn open_tasks(&self, team_id: Uuid) -> Result<Vec<TaskSnapshot>, StoreError> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks
            .values()
            .filter(|(team, t)| *team == team_id && !t.completed)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn completed_tasks(&self, team_id: Uuid) -> Result<Vec<TaskSnapshot>, StoreError> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        let mut done: Vec<TaskSnapshot> = tasks
            .values()
            .filter(|(team, t)| *team == team_id && t.completed)
            .map(|(_, t)| t.clone())
            .collect();
        // Most recent first.
        done.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(done)
    }

    async fn team_members(&self, team_id: Uuid) -> Result<Vec<TeamMember>, StoreError> {
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        Ok(members.get(&team_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl MutationSink for InMemoryStore {
    async fn apply(&self, update: TaskUpdate) -> Result<(), StoreError> {
        if self.reject_updates.load(Ordering::SeqCst) {
            return Err(StoreError::UpdateRejected("store rejects updates".into()));
        }

        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let (_, task) = tasks
            .get_mut(&update.task_id)
            .ok_or(StoreError::TaskNotFound(update.task_id))?;

        for field in update.updates {
            match field {
                FieldUpdate::AddAssignee { assignee } => {
                    if !task.assignees.iter().any(|a| a.id == assignee.id) {
                        task.assignees.push(assignee);
                    }
                }
                FieldUpdate::SetPriority { priority } => task.priority = priority,
                FieldUpdate::AddTag { tag } => {
                    if !task.tags.contains(&tag) {
                        task.tags.push(tag);
                    }
                }
                FieldUpdate::SetDueDate { due_date } => task.due_date = Some(due_date),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskPriority;

    #[tokio::test]
    async fn test_apply_updates_snapshot() {
        let store = InMemoryStore::new();
        let team_id = Uuid::new_v4();
        let task = TaskSnapshot::new("t");
        let task_id = task.id;
        store.add_task(team_id, task);

        store
            .apply(TaskUpdate::single(
                task_id,
                FieldUpdate::SetPriority {
                    priority: TaskPriority::Urgent,
                },
            ))
            .await
            .unwrap();

        let stored = store.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(stored.priority, TaskPriority::Urgent);
    }

    #[tokio::test]
    async fn test_apply_unknown_task_fails() {
        let store = InMemoryStore::new();
        let result = store
            .apply(TaskUpdate::single(
                Uuid::new_v4(),
                FieldUpdate::AddTag { tag: "x".into() },
            ))
            .await;
        assert!(matches!(result, Err(StoreError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_reject_updates_toggle() {
        let store = InMemoryStore::new();
        let team_id = Uuid::new_v4();
        let task = TaskSnapshot::new("t");
        let task_id = task.id;
        store.add_task(team_id, task);

        store.set_reject_updates(true);
        let result = store
            .apply(TaskUpdate::single(
                task_id,
                FieldUpdate::AddTag { tag: "x".into() },
            ))
            .await;
        assert!(matches!(result, Err(StoreError::UpdateRejected(_))));
    }
}
