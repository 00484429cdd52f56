//! Engine facade.
//!
//! `AutomationEngine` wires the individual services to the host's store and
//! sink and exposes the full API surface: rule CRUD and dispatch,
//! recurrence preview/materialization, and the on-demand analytics calls.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{
    AssignmentStrategy, AutomationRule, EngineConfig, ExecutionReport, RecurringConfigDraft,
    RecurringTaskConfig, RuleDraft, RulePatch, SmartSuggestion, TaskInstance, TaskPrediction,
    TriggerEvent, WorkloadAnalysis,
};
use crate::domain::ports::{MutationSink, TaskStore};
use crate::services::action_executor::ActionExecutor;
use crate::services::assignment;
use crate::services::prediction::CompletionPredictor;
use crate::services::recurrence::{self, RecurrenceService};
use crate::services::rule_engine::RuleEngine;
use crate::services::suggestions::SuggestionService;
use crate::services::workload::WorkloadAnalyzer;

/// Facade over the automation engine's services.
pub struct AutomationEngine {
    store: Arc<dyn TaskStore>,
    rules: RuleEngine,
    recurrence: RecurrenceService,
    workload: WorkloadAnalyzer,
    predictor: CompletionPredictor,
    suggestions: SuggestionService,
}

impl AutomationEngine {
    pub fn new(
        store: Arc<dyn TaskStore>,
        sink: Arc<dyn MutationSink>,
        config: EngineConfig,
    ) -> Self {
        let executor = Arc::new(ActionExecutor::new(store.clone(), sink));
        let workload = WorkloadAnalyzer::new(config.workload.clone());
        let predictor = CompletionPredictor::new(config.prediction.clone());
        let suggestions = SuggestionService::new(
            workload.clone(),
            predictor.clone(),
            config.urgent_keywords.clone(),
            executor.clone(),
        );

        Self {
            store,
            rules: RuleEngine::new(executor),
            recurrence: RecurrenceService::new(),
            workload,
            predictor,
            suggestions,
        }
    }

    // -- Rules ----------------------------------------------------------

    pub async fn create_rule(&self, draft: RuleDraft) -> EngineResult<AutomationRule> {
        self.rules.create_rule(draft).await
    }

    pub async fn update_rule(&self, rule_id: Uuid, patch: RulePatch) -> EngineResult<AutomationRule> {
        self.rules.update_rule(rule_id, patch).await
    }

    pub async fn delete_rule(&self, rule_id: Uuid) -> EngineResult<()> {
        self.rules.delete_rule(rule_id).await
    }

    pub async fn get_rule(&self, rule_id: Uuid) -> EngineResult<AutomationRule> {
        self.rules.get_rule(rule_id).await
    }

    pub async fn list_rules(&self, team_id: Uuid) -> Vec<AutomationRule> {
        self.rules.list_rules(team_id).await
    }

    /// Dispatch a trigger event against one team's rule set.
    pub async fn dispatch_trigger(&self, team_id: Uuid, event: &TriggerEvent) -> Vec<ExecutionReport> {
        self.rules.dispatch(team_id, event).await
    }

    // -- Recurrence -----------------------------------------------------

    pub async fn create_recurring_config(
        &self,
        draft: RecurringConfigDraft,
    ) -> EngineResult<RecurringTaskConfig> {
        self.recurrence.create_config(draft).await
    }

    /// Enable or disable a recurring configuration.
    pub async fn set_recurring_enabled(&self, config_id: Uuid, enabled: bool) -> EngineResult<()> {
        self.recurrence.set_enabled(config_id, enabled).await
    }

    /// Dry-run preview of upcoming occurrences. Never advances counters.
    pub fn preview_occurrences(
        &self,
        config: &RecurringTaskConfig,
        from: NaiveDate,
        count: usize,
    ) -> Vec<NaiveDate> {
        recurrence::preview_occurrences(config, from, count)
    }

    /// Materialize the next due occurrence for a configuration, copying the
    /// template's assignees when `auto_assign` is set.
    pub async fn materialize_next_occurrence(
        &self,
        config_id: Uuid,
    ) -> EngineResult<Option<TaskInstance>> {
        let today = Utc::now().date_naive();
        let config = self.recurrence.get_config(config_id).await?;

        let Some(mut instance) = self.recurrence.materialize_next(config_id, today).await? else {
            return Ok(None);
        };

        if config.auto_assign {
            let template = self
                .store
                .get_task(config.template_task_id)
                .await
                .map_err(|e| EngineError::Store(e.to_string()))?
                .ok_or(EngineError::TaskNotFound(config.template_task_id))?;
            instance.assignee_ids = template.assignees.iter().map(|a| a.id.clone()).collect();
        }

        Ok(Some(instance))
    }

    // -- Analytics ------------------------------------------------------

    /// Per-member workload for a team, computed from current open tasks.
    pub async fn analyze_workload(&self, team_id: Uuid) -> EngineResult<Vec<WorkloadAnalysis>> {
        let open = self
            .store
            .open_tasks(team_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;
        let members = self
            .store
            .team_members(team_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;
        Ok(self.workload.analyze(&open, &members, Utc::now().date_naive()))
    }

    /// Pick an assignee for a task by strategy. `None` when the strategy
    /// finds no candidate.
    pub async fn select_assignee(
        &self,
        team_id: Uuid,
        task_id: Uuid,
        strategy: AssignmentStrategy,
    ) -> EngineResult<Option<String>> {
        let task = self.get_task(task_id).await?;
        let candidates = self.analyze_workload(team_id).await?;
        let history = self
            .store
            .completed_tasks(team_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;
        Ok(assignment::select(strategy, &candidates, &history, task.priority))
    }

    /// Predict completion for a task from the team's completed history.
    pub async fn predict_completion(
        &self,
        team_id: Uuid,
        task_id: Uuid,
    ) -> EngineResult<TaskPrediction> {
        let task = self.get_task(task_id).await?;
        let history = self
            .store
            .completed_tasks(team_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;
        Ok(self.predictor.predict(&task, &history))
    }

    /// Generate and record suggestions for a task.
    pub async fn generate_suggestions(
        &self,
        team_id: Uuid,
        task_id: Uuid,
    ) -> EngineResult<Vec<SmartSuggestion>> {
        let task = self.get_task(task_id).await?;
        let open = self
            .store
            .open_tasks(team_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;
        let history = self
            .store
            .completed_tasks(team_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;
        let members = self
            .store
            .team_members(team_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;

        Ok(self
            .suggestions
            .generate(&task, &open, &history, &members, Utc::now().date_naive())
            .await)
    }

    /// Recorded suggestions for a task, applied and dismissed ones included.
    pub async fn list_suggestions(&self, task_id: Uuid) -> Vec<SmartSuggestion> {
        self.suggestions.list_for_task(task_id).await
    }

    /// Accept a recorded suggestion, executing its action.
    pub async fn accept_suggestion(
        &self,
        team_id: Uuid,
        suggestion_id: Uuid,
    ) -> EngineResult<ExecutionReport> {
        self.suggestions.accept(suggestion_id, team_id).await
    }

    /// Dismiss a recorded suggestion.
    pub async fn dismiss_suggestion(&self, suggestion_id: Uuid) -> EngineResult<()> {
        self.suggestions.dismiss(suggestion_id).await
    }

    async fn get_task(&self, task_id: Uuid) -> EngineResult<crate::domain::models::TaskSnapshot> {
        self.store
            .get_task(task_id)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?
            .ok_or(EngineError::TaskNotFound(task_id))
    }
}
