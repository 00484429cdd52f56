//! Action execution.
//!
//! Applies a rule's (or accepted suggestion's) actions against a task by
//! emitting field-level update commands through the `MutationSink`. This is
//! a best-effort fan-out, not a transaction: each action runs independently,
//! one failure never stops later actions, and there is no rollback.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::models::{ActionReport, Assignee, AutomationAction};
use crate::domain::ports::{FieldUpdate, MutationSink, TaskStore, TaskUpdate};

/// Executes automation actions against the external task store.
pub struct ActionExecutor {
    store: Arc<dyn TaskStore>,
    sink: Arc<dyn MutationSink>,
}

impl ActionExecutor {
    pub fn new(store: Arc<dyn TaskStore>, sink: Arc<dyn MutationSink>) -> Self {
        Self { store, sink }
    }

    /// Apply each action independently and report per-action outcomes.
    ///
    /// `team_id` scopes the candidate-user set for `AssignUser`. Delegated
    /// action kinds (watcher, notification, subtask, milestone, comment,
    /// duplicate) only record dispatch; their remote result is the external
    /// store's concern.
    pub async fn execute(
        &self,
        task_id: Uuid,
        team_id: Uuid,
        actions: &[AutomationAction],
    ) -> Vec<ActionReport> {
        let mut reports = Vec::with_capacity(actions.len());

        for action in actions {
            let report = self.execute_one(task_id, team_id, action).await;
            if !report.success {
                tracing::warn!(
                    task_id = %task_id,
                    action = action.kind(),
                    error = report.error.as_deref().unwrap_or(""),
                    "action failed"
                );
            }
            reports.push(report);
        }

        reports
    }

    async fn execute_one(
        &self,
        task_id: Uuid,
        team_id: Uuid,
        action: &AutomationAction,
    ) -> ActionReport {
        match action {
            AutomationAction::AssignUser { user_id } => {
                self.assign_user(task_id, team_id, user_id, action).await
            }
            AutomationAction::SetPriority { priority } => {
                self.apply_update(
                    task_id,
                    FieldUpdate::SetPriority {
                        priority: *priority,
                    },
                    action,
                )
                .await
            }
            AutomationAction::AddTag { tag } => {
                self.apply_update(task_id, FieldUpdate::AddTag { tag: tag.clone() }, action)
                    .await
            }
            AutomationAction::SetDueDate { due_date } => {
                self.apply_update(
                    task_id,
                    FieldUpdate::SetDueDate {
                        due_date: *due_date,
                    },
                    action,
                )
                .await
            }
            // Delegated to the external task store; only dispatch is recorded.
            _ => {
                tracing::debug!(
                    task_id = %task_id,
                    action = action.kind(),
                    "delegated action dispatched"
                );
                ActionReport::ok(action.clone())
            }
        }
    }

    /// Assign a user, resolving the id against the team's member list.
    ///
    /// Re-assigning an already-assigned user is a no-op success: trigger
    /// delivery is at-least-once, so duplicate application must be safe.
    async fn assign_user(
        &self,
        task_id: Uuid,
        team_id: Uuid,
        user_id: &str,
        action: &AutomationAction,
    ) -> ActionReport {
        let members = match self.store.team_members(team_id).await {
            Ok(m) => m,
            Err(e) => return ActionReport::failed(action.clone(), e.to_string()),
        };

        let Some(member) = members.iter().find(|m| m.id == user_id) else {
            return ActionReport::failed(
                action.clone(),
                format!("user {user_id} not found in team {team_id}"),
            );
        };

        match self.store.get_task(task_id).await {
            Ok(Some(task)) if task.is_assigned_to(user_id) => {
                tracing::debug!(task_id = %task_id, user_id, "user already assigned, skipping");
                return ActionReport::ok(action.clone());
            }
            Ok(_) => {}
            Err(e) => return ActionReport::failed(action.clone(), e.to_string()),
        }

        self.apply_update(
            task_id,
            FieldUpdate::AddAssignee {
                assignee: Assignee::new(member.id.clone(), member.name.clone()),
            },
            action,
        )
        .await
    }

    async fn apply_update(
        &self,
        task_id: Uuid,
        update: FieldUpdate,
        action: &AutomationAction,
    ) -> ActionReport {
        match self.sink.apply(TaskUpdate::single(task_id, update)).await {
            Ok(()) => ActionReport::ok(action.clone()),
            Err(e) => ActionReport::failed(action.clone(), e.to_string()),
        }
    }
}
