//! Smart suggestion generation and lifecycle.
//!
//! Composes workload analysis, keyword heuristics, and completion
//! prediction into ranked, user-facing suggestions. A suggestion is a
//! proposal: it never mutates the task itself. Accepting one routes its
//! stored action through the `ActionExecutor`.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{
    AssignmentStrategy, AutomationAction, ExecutionReport, SmartSuggestion, SuggestionKind,
    TaskPriority, TaskSnapshot, TeamMember, WorkloadAnalysis,
};
use crate::services::action_executor::ActionExecutor;
use crate::services::assignment;
use crate::services::prediction::CompletionPredictor;
use crate::services::workload::WorkloadAnalyzer;

/// Generates suggestions and owns their accept/dismiss lifecycle.
pub struct SuggestionService {
    workload: WorkloadAnalyzer,
    predictor: CompletionPredictor,
    urgent_keywords: Vec<String>,
    executor: Arc<ActionExecutor>,
    suggestions: RwLock<Vec<SmartSuggestion>>,
}

impl SuggestionService {
    pub fn new(
        workload: WorkloadAnalyzer,
        predictor: CompletionPredictor,
        urgent_keywords: Vec<String>,
        executor: Arc<ActionExecutor>,
    ) -> Self {
        Self {
            workload,
            predictor,
            urgent_keywords: urgent_keywords.iter().map(|k| k.to_lowercase()).collect(),
            executor,
            suggestions: RwLock::new(Vec::new()),
        }
    }

    /// Generate at most one suggestion per category for a task and record
    /// them for later accept/dismiss.
    pub async fn generate(
        &self,
        task: &TaskSnapshot,
        open_tasks: &[TaskSnapshot],
        history: &[TaskSnapshot],
        members: &[TeamMember],
        today: NaiveDate,
    ) -> Vec<SmartSuggestion> {
        let mut generated = Vec::new();

        if let Some(s) = self.suggest_assignee(task, open_tasks, members, today) {
            generated.push(s);
        }
        if let Some(s) = self.suggest_priority(task) {
            generated.push(s);
        }
        if let Some(s) = self.suggest_due_date(task, history) {
            generated.push(s);
        }

        if !generated.is_empty() {
            tracing::info!(
                task_id = %task.id,
                count = generated.len(),
                "suggestions generated"
            );
            let mut store = self.suggestions.write().await;
            store.extend(generated.clone());
        }

        generated
    }

    /// Auto-assign the least-busy member when the task has no assignees.
    fn suggest_assignee(
        &self,
        task: &TaskSnapshot,
        open_tasks: &[TaskSnapshot],
        members: &[TeamMember],
        today: NaiveDate,
    ) -> Option<SmartSuggestion> {
        if !task.assignees.is_empty() || members.is_empty() {
            return None;
        }

        let analyses: Vec<WorkloadAnalysis> = self.workload.analyze(open_tasks, members, today);
        let user_id =
            assignment::select(AssignmentStrategy::LeastBusy, &analyses, &[], task.priority)?;
        let analysis = analyses.iter().find(|a| a.user_id == user_id)?;

        Some(build_suggestion(
            SuggestionKind::AutoAssign,
            task.id,
            format!("Assign to {}", analysis.user_name),
            "Task has no assignees".into(),
            75,
            format!(
                "{} has the lightest load ({} active tasks, {}% utilization)",
                analysis.user_name, analysis.active_tasks, analysis.utilization_percentage
            ),
            AutomationAction::AssignUser {
                user_id: user_id.clone(),
            },
        ))
    }

    /// Escalate to urgent when the title or description carries an urgent
    /// keyword and the task is not already urgent.
    fn suggest_priority(&self, task: &TaskSnapshot) -> Option<SmartSuggestion> {
        if task.priority == TaskPriority::Urgent {
            return None;
        }

        let haystack = format!(
            "{} {}",
            task.title.to_lowercase(),
            task.description.as_deref().unwrap_or("").to_lowercase()
        );
        let keyword = self
            .urgent_keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))?;

        Some(build_suggestion(
            SuggestionKind::Priority,
            task.id,
            "Escalate priority to urgent".into(),
            format!("Task text mentions \"{keyword}\""),
            85,
            format!(
                "Current priority is {} but the wording suggests urgency",
                task.priority.as_str()
            ),
            AutomationAction::SetPriority {
                priority: TaskPriority::Urgent,
            },
        ))
    }

    /// Derive a due date from the historical average for tasks of the same
    /// priority. Only offered when the task has none.
    fn suggest_due_date(
        &self,
        task: &TaskSnapshot,
        history: &[TaskSnapshot],
    ) -> Option<SmartSuggestion> {
        if task.due_date.is_some() {
            return None;
        }

        let prediction = self.predictor.predict(task, history);
        let due = prediction.predicted_completion_date;
        let confidence = (50 + 5 * prediction.similar_tasks).min(90);

        Some(build_suggestion(
            SuggestionKind::DueDate,
            task.id,
            format!("Set due date to {due}"),
            "Task has no due date".into(),
            confidence,
            format!(
                "Based on {} completed {}-priority tasks",
                prediction.similar_tasks,
                task.priority.as_str()
            ),
            AutomationAction::SetDueDate { due_date: due },
        ))
    }

    /// List recorded suggestions for a task.
    pub async fn list_for_task(&self, task_id: Uuid) -> Vec<SmartSuggestion> {
        self.suggestions
            .read()
            .await
            .iter()
            .filter(|s| s.task_id == task_id)
            .cloned()
            .collect()
    }

    /// Accept a suggestion: execute its stored action and mark it applied.
    ///
    /// Accepting twice is an error, not a double execution.
    pub async fn accept(&self, suggestion_id: Uuid, team_id: Uuid) -> EngineResult<ExecutionReport> {
        let (task_id, action) = {
            let mut store = self.suggestions.write().await;
            let suggestion = store
                .iter_mut()
                .find(|s| s.id == suggestion_id)
                .ok_or(EngineError::SuggestionNotFound(suggestion_id))?;
            if suggestion.applied {
                return Err(EngineError::SuggestionAlreadyApplied(suggestion_id));
            }
            suggestion.applied = true;
            (suggestion.task_id, suggestion.suggested_action.clone())
        };

        let actions = self
            .executor
            .execute(task_id, team_id, std::slice::from_ref(&action))
            .await;

        Ok(ExecutionReport {
            rule_id: None,
            source: format!("suggestion:{suggestion_id}"),
            task_id,
            actions,
            executed_at: Utc::now(),
        })
    }

    /// Dismiss a suggestion without executing it.
    pub async fn dismiss(&self, suggestion_id: Uuid) -> EngineResult<()> {
        let mut store = self.suggestions.write().await;
        let suggestion = store
            .iter_mut()
            .find(|s| s.id == suggestion_id)
            .ok_or(EngineError::SuggestionNotFound(suggestion_id))?;
        suggestion.dismissed = true;
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn build_suggestion(
    kind: SuggestionKind,
    task_id: Uuid,
    title: String,
    description: String,
    confidence: u32,
    reasoning: String,
    suggested_action: AutomationAction,
) -> SmartSuggestion {
    SmartSuggestion {
        id: Uuid::new_v4(),
        kind,
        task_id,
        title,
        description,
        confidence,
        reasoning,
        suggested_action,
        created_at: Utc::now(),
        applied: false,
        dismissed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Assignee, EngineConfig};
    use crate::domain::ports::TaskStore;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> (Arc<InMemoryStore>, SuggestionService, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let team_id = Uuid::new_v4();
        let executor = Arc::new(ActionExecutor::new(store.clone(), store.clone()));
        let config = EngineConfig::default();
        let service = SuggestionService::new(
            WorkloadAnalyzer::new(config.workload),
            CompletionPredictor::new(config.prediction),
            config.urgent_keywords,
            executor,
        );
        (store, service, team_id)
    }

    fn members() -> Vec<TeamMember> {
        vec![TeamMember::new("u1", "Alice"), TeamMember::new("u2", "Bob")]
    }

    #[tokio::test]
    async fn test_unassigned_task_gets_assign_suggestion() {
        let (_, service, _) = service();
        let busy = TaskSnapshot::new("busy").with_assignee(Assignee::new("u1", "Alice"));
        let task = TaskSnapshot::new("new task").with_due_date(date(2026, 2, 1));

        let suggestions = service
            .generate(&task, &[busy], &[], &members(), date(2026, 1, 1))
            .await;

        let assign = suggestions
            .iter()
            .find(|s| s.kind == SuggestionKind::AutoAssign)
            .expect("assign suggestion");
        // Bob has no active tasks.
        assert_eq!(
            assign.suggested_action,
            AutomationAction::AssignUser {
                user_id: "u2".into()
            }
        );
    }

    #[tokio::test]
    async fn test_urgent_keyword_triggers_priority_suggestion() {
        let (_, service, _) = service();
        let task = TaskSnapshot::new("fix login ASAP")
            .with_assignee(Assignee::new("u1", "Alice"))
            .with_due_date(date(2026, 2, 1));

        let suggestions = service
            .generate(&task, &[], &[], &members(), date(2026, 1, 1))
            .await;

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Priority);
        assert_eq!(
            suggestions[0].suggested_action,
            AutomationAction::SetPriority {
                priority: TaskPriority::Urgent
            }
        );
    }

    #[tokio::test]
    async fn test_already_urgent_task_not_escalated() {
        let (_, service, _) = service();
        let task = TaskSnapshot::new("critical outage")
            .with_priority(TaskPriority::Urgent)
            .with_assignee(Assignee::new("u1", "Alice"))
            .with_due_date(date(2026, 2, 1));

        let suggestions = service
            .generate(&task, &[], &[], &members(), date(2026, 1, 1))
            .await;
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_due_date_suggested_from_history() {
        let (_, service, _) = service();
        let task = TaskSnapshot::new("plain work").with_assignee(Assignee::new("u1", "Alice"));

        let suggestions = service
            .generate(&task, &[], &[], &members(), date(2026, 1, 1))
            .await;

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::DueDate);
        assert!(matches!(
            suggestions[0].suggested_action,
            AutomationAction::SetDueDate { .. }
        ));
    }

    #[tokio::test]
    async fn test_at_most_one_per_category() {
        let (_, service, _) = service();
        // No assignees, urgent wording, no due date: all three categories.
        let task = TaskSnapshot::new("urgent: fix the blocker");

        let suggestions = service
            .generate(&task, &[], &[], &members(), date(2026, 1, 1))
            .await;
        assert_eq!(suggestions.len(), 3);

        let kinds: Vec<SuggestionKind> = suggestions.iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&SuggestionKind::AutoAssign));
        assert!(kinds.contains(&SuggestionKind::Priority));
        assert!(kinds.contains(&SuggestionKind::DueDate));
    }

    #[tokio::test]
    async fn test_accept_executes_and_marks_applied() {
        let (store, service, team_id) = service();
        store.add_member(team_id, TeamMember::new("u1", "Alice"));
        let task = TaskSnapshot::new("needs owner").with_due_date(date(2026, 2, 1));
        let task_id = task.id;
        store.add_task(team_id, task.clone());

        let suggestions = service
            .generate(
                &task,
                &[],
                &[],
                &[TeamMember::new("u1", "Alice")],
                date(2026, 1, 1),
            )
            .await;
        let suggestion_id = suggestions[0].id;

        let report = service.accept(suggestion_id, team_id).await.unwrap();
        assert!(report.fully_succeeded());
        assert_eq!(report.source, format!("suggestion:{suggestion_id}"));

        let stored = store.get_task(task_id).await.unwrap().unwrap();
        assert!(stored.is_assigned_to("u1"));

        // Second accept is an error, not a double execution.
        let again = service.accept(suggestion_id, team_id).await;
        assert!(matches!(
            again,
            Err(EngineError::SuggestionAlreadyApplied(_))
        ));
    }

    #[tokio::test]
    async fn test_dismiss_marks_without_executing() {
        let (store, service, team_id) = service();
        let task = TaskSnapshot::new("needs owner").with_due_date(date(2026, 2, 1));
        let task_id = task.id;
        store.add_task(team_id, task.clone());

        let suggestions = service
            .generate(
                &task,
                &[],
                &[],
                &[TeamMember::new("u1", "Alice")],
                date(2026, 1, 1),
            )
            .await;
        service.dismiss(suggestions[0].id).await.unwrap();

        let recorded = service.list_for_task(task_id).await;
        assert!(recorded[0].dismissed);
        assert!(!recorded[0].applied);

        let stored = store.get_task(task_id).await.unwrap().unwrap();
        assert!(stored.assignees.is_empty());
    }
}
