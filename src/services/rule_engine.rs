//! Rule engine: storage and dispatch of automation rules.
//!
//! The engine owns the rule set (enable/disable, counters) and orchestrates
//! matching and action execution for one incoming trigger event. Rules are
//! evaluated sequentially in stored order; action execution is awaited
//! inline so state changes made by earlier rules are visible to the store
//! before the next rule runs.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{
    AutomationRule, ExecutionReport, RuleDraft, RulePatch, TriggerEvent,
};
use crate::services::action_executor::ActionExecutor;
use crate::services::condition;

/// Owns the rule set and dispatches trigger events against it.
pub struct RuleEngine {
    rules: RwLock<Vec<AutomationRule>>,
    executor: Arc<ActionExecutor>,
}

impl RuleEngine {
    pub fn new(executor: Arc<ActionExecutor>) -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
            executor,
        }
    }

    /// Load rules wholesale (e.g. from the host's persistence at startup).
    pub async fn load_rules(&self, rules: Vec<AutomationRule>) {
        let mut store = self.rules.write().await;
        *store = rules;
    }

    /// Create a rule from a draft. Counters start at zero.
    pub async fn create_rule(&self, draft: RuleDraft) -> EngineResult<AutomationRule> {
        if draft.name.trim().is_empty() {
            return Err(EngineError::Validation("rule name cannot be empty".into()));
        }
        if draft.actions.is_empty() {
            return Err(EngineError::Validation(
                "rule must have at least one action".into(),
            ));
        }
        if draft.conditions.iter().any(|c| c.value.trim().is_empty()) {
            return Err(EngineError::Validation(
                "rule conditions contain an empty value".into(),
            ));
        }

        let rule = AutomationRule {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            enabled: true,
            trigger: draft.trigger,
            conditions: draft.conditions,
            actions: draft.actions,
            team_id: draft.team_id,
            apply_to_new_tasks: draft.apply_to_new_tasks,
            apply_to_existing_tasks: draft.apply_to_existing_tasks,
            created_by: draft.created_by,
            created_at: Utc::now(),
            trigger_count: 0,
            last_triggered_at: None,
        };

        tracing::info!(rule_id = %rule.id, rule_name = %rule.name, trigger = rule.trigger.as_str(), "rule created");

        let mut store = self.rules.write().await;
        store.push(rule.clone());
        Ok(rule)
    }

    /// Update a rule. Conditions/actions are replaced wholesale when the
    /// patch carries them; there is no partial patching of either list.
    pub async fn update_rule(&self, rule_id: Uuid, patch: RulePatch) -> EngineResult<AutomationRule> {
        if let Some(actions) = &patch.actions {
            if actions.is_empty() {
                return Err(EngineError::Validation(
                    "rule must have at least one action".into(),
                ));
            }
        }

        let mut store = self.rules.write().await;
        let rule = store
            .iter_mut()
            .find(|r| r.id == rule_id)
            .ok_or(EngineError::RuleNotFound(rule_id))?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(EngineError::Validation("rule name cannot be empty".into()));
            }
            rule.name = name;
        }
        if let Some(description) = patch.description {
            rule.description = Some(description);
        }
        if let Some(enabled) = patch.enabled {
            rule.enabled = enabled;
        }
        if let Some(trigger) = patch.trigger {
            rule.trigger = trigger;
        }
        if let Some(conditions) = patch.conditions {
            rule.conditions = conditions;
        }
        if let Some(actions) = patch.actions {
            rule.actions = actions;
        }

        Ok(rule.clone())
    }

    /// Delete a rule by id.
    pub async fn delete_rule(&self, rule_id: Uuid) -> EngineResult<()> {
        let mut store = self.rules.write().await;
        let before = store.len();
        store.retain(|r| r.id != rule_id);
        if store.len() == before {
            return Err(EngineError::RuleNotFound(rule_id));
        }
        Ok(())
    }

    /// Get a rule by id.
    pub async fn get_rule(&self, rule_id: Uuid) -> EngineResult<AutomationRule> {
        let store = self.rules.read().await;
        store
            .iter()
            .find(|r| r.id == rule_id)
            .cloned()
            .ok_or(EngineError::RuleNotFound(rule_id))
    }

    /// Snapshot of one team's rules, in stored order.
    pub async fn list_rules(&self, team_id: Uuid) -> Vec<AutomationRule> {
        self.rules
            .read()
            .await
            .iter()
            .filter(|r| r.team_id == team_id)
            .cloned()
            .collect()
    }

    /// Dispatch a trigger event against one team's rule set.
    ///
    /// For each enabled rule whose trigger matches: conditions are ANDed
    /// with short-circuit on the first false; if all pass, the rule's
    /// actions run through the `ActionExecutor`. A rule whose actions
    /// partially fail still counts as fired (`trigger_count` bumped once
    /// per dispatch) and never blocks evaluation of subsequent rules.
    pub async fn dispatch(&self, team_id: Uuid, event: &TriggerEvent) -> Vec<ExecutionReport> {
        let now = Utc::now();
        let mut reports = Vec::new();

        // Phase 1: match under the read lock, collect candidates.
        let candidates: Vec<AutomationRule> = {
            let rules = self.rules.read().await;
            rules
                .iter()
                .filter(|rule| {
                    rule.enabled
                        && rule.team_id == team_id
                        && rule.trigger == event.kind
                        && rule
                            .conditions
                            .iter()
                            .all(|c| condition::evaluate(&event.task, c))
                })
                .cloned()
                .collect()
        };

        // Phase 2: execute sequentially, in stored order, outside the lock.
        let mut fired_ids = Vec::new();
        for rule in candidates {
            let actions = self
                .executor
                .execute(event.task.id, team_id, &rule.actions)
                .await;

            tracing::info!(
                rule_id = %rule.id,
                rule_name = %rule.name,
                trigger = event.kind.as_str(),
                task_id = %event.task.id,
                failed_actions = actions.iter().filter(|a| !a.success).count(),
                "rule fired"
            );

            fired_ids.push(rule.id);
            reports.push(ExecutionReport {
                rule_id: Some(rule.id),
                source: rule.name,
                task_id: event.task.id,
                actions,
                executed_at: now,
            });
        }

        // Phase 3: bump counters for fired rules.
        if !fired_ids.is_empty() {
            let mut rules = self.rules.write().await;
            for rule in rules.iter_mut() {
                if fired_ids.contains(&rule.id) {
                    rule.trigger_count += 1;
                    rule.last_triggered_at = Some(now);
                }
            }
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        AutomationAction, AutomationCondition, ConditionField, ConditionOperator, TaskPriority,
        TaskSnapshot, TeamMember, TriggerKind,
    };
    use crate::domain::ports::TaskStore;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn engine_with_store() -> (Arc<InMemoryStore>, RuleEngine, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let team_id = Uuid::new_v4();
        store.add_member(team_id, TeamMember::new("u1", "Alice"));
        let executor = Arc::new(ActionExecutor::new(store.clone(), store.clone()));
        (store, RuleEngine::new(executor), team_id)
    }

    fn draft(team_id: Uuid, trigger: TriggerKind, actions: Vec<AutomationAction>) -> RuleDraft {
        RuleDraft {
            name: "test rule".into(),
            description: None,
            trigger,
            conditions: vec![],
            actions,
            team_id,
            apply_to_new_tasks: true,
            apply_to_existing_tasks: false,
            created_by: "tester".into(),
        }
    }

    #[tokio::test]
    async fn test_create_rule_counters_start_at_zero() {
        let (_, engine, team_id) = engine_with_store();
        let rule = engine
            .create_rule(draft(
                team_id,
                TriggerKind::TaskCreated,
                vec![AutomationAction::AddTag { tag: "new".into() }],
            ))
            .await
            .unwrap();
        assert_eq!(rule.trigger_count, 0);
        assert!(rule.last_triggered_at.is_none());
        assert!(rule.enabled);
    }

    #[tokio::test]
    async fn test_create_rule_requires_actions() {
        let (_, engine, team_id) = engine_with_store();
        let result = engine
            .create_rule(draft(team_id, TriggerKind::TaskCreated, vec![]))
            .await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_dispatch_fires_matching_rule_and_bumps_counter() {
        let (store, engine, team_id) = engine_with_store();
        let rule = engine
            .create_rule(draft(
                team_id,
                TriggerKind::TaskCreated,
                vec![AutomationAction::SetPriority {
                    priority: TaskPriority::High,
                }],
            ))
            .await
            .unwrap();

        let task = TaskSnapshot::new("incoming");
        let task_id = task.id;
        store.add_task(team_id, task.clone());

        let reports = engine
            .dispatch(team_id, &TriggerEvent::new(TriggerKind::TaskCreated, task))
            .await;
        assert_eq!(reports.len(), 1);
        assert!(reports[0].fully_succeeded());

        let updated = engine.get_rule(rule.id).await.unwrap();
        assert_eq!(updated.trigger_count, 1);
        assert!(updated.last_triggered_at.is_some());

        let stored = store.get_task(task_id).await.unwrap().unwrap();
        assert_eq!(stored.priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn test_disabled_rule_never_fires() {
        let (_, engine, team_id) = engine_with_store();
        let rule = engine
            .create_rule(draft(
                team_id,
                TriggerKind::TaskCreated,
                vec![AutomationAction::AddTag { tag: "x".into() }],
            ))
            .await
            .unwrap();
        engine
            .update_rule(
                rule.id,
                RulePatch {
                    enabled: Some(false),
                    ..RulePatch::default()
                },
            )
            .await
            .unwrap();

        let reports = engine
            .dispatch(
                team_id,
                &TriggerEvent::new(TriggerKind::TaskCreated, TaskSnapshot::new("t")),
            )
            .await;
        assert!(reports.is_empty());

        let unchanged = engine.get_rule(rule.id).await.unwrap();
        assert_eq!(unchanged.trigger_count, 0);
    }

    #[tokio::test]
    async fn test_failing_conditions_skip_rule_but_not_others() {
        let (_, engine, team_id) = engine_with_store();

        let mut never = draft(
            team_id,
            TriggerKind::TaskCreated,
            vec![AutomationAction::AddTag { tag: "a".into() }],
        );
        never.name = "never matches".into();
        never.conditions = vec![AutomationCondition::new(
            ConditionField::Priority,
            ConditionOperator::Equals,
            "urgent",
        )];
        engine.create_rule(never).await.unwrap();

        let mut always = draft(
            team_id,
            TriggerKind::TaskCreated,
            vec![AutomationAction::AddTag { tag: "b".into() }],
        );
        always.name = "always matches".into();
        let always = engine.create_rule(always).await.unwrap();

        let reports = engine
            .dispatch(
                team_id,
                &TriggerEvent::new(
                    TriggerKind::TaskCreated,
                    TaskSnapshot::new("t").with_priority(TaskPriority::Low),
                ),
            )
            .await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].rule_id, Some(always.id));
    }

    #[tokio::test]
    async fn test_dispatch_scoped_to_team() {
        let (_, engine, team_id) = engine_with_store();
        let other_team = Uuid::new_v4();
        engine
            .create_rule(draft(
                other_team,
                TriggerKind::TaskCreated,
                vec![AutomationAction::AddTag { tag: "x".into() }],
            ))
            .await
            .unwrap();

        let reports = engine
            .dispatch(
                team_id,
                &TriggerEvent::new(TriggerKind::TaskCreated, TaskSnapshot::new("t")),
            )
            .await;
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_still_counts_as_fired() {
        let (store, engine, team_id) = engine_with_store();
        let rule = engine
            .create_rule(draft(
                team_id,
                TriggerKind::TaskCreated,
                vec![
                    AutomationAction::AssignUser {
                        user_id: "ghost".into(),
                    },
                    AutomationAction::AddTag { tag: "ok".into() },
                ],
            ))
            .await
            .unwrap();

        let task = TaskSnapshot::new("t");
        store.add_task(team_id, task.clone());
        let reports = engine
            .dispatch(team_id, &TriggerEvent::new(TriggerKind::TaskCreated, task))
            .await;

        assert_eq!(reports.len(), 1);
        assert!(!reports[0].fully_succeeded());
        assert!(reports[0].actions[1].success);

        let updated = engine.get_rule(rule.id).await.unwrap();
        assert_eq!(updated.trigger_count, 1);
    }

    #[tokio::test]
    async fn test_delete_rule() {
        let (_, engine, team_id) = engine_with_store();
        let rule = engine
            .create_rule(draft(
                team_id,
                TriggerKind::TaskCompleted,
                vec![AutomationAction::DuplicateTask],
            ))
            .await
            .unwrap();

        engine.delete_rule(rule.id).await.unwrap();
        assert!(matches!(
            engine.get_rule(rule.id).await,
            Err(EngineError::RuleNotFound(_))
        ));
        assert!(matches!(
            engine.delete_rule(rule.id).await,
            Err(EngineError::RuleNotFound(_))
        ));
    }
}
