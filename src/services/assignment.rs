//! Assignment selection strategies.
//!
//! Given per-candidate workload figures and completed-task history, picks
//! an assignee according to a strategy. `PreviousSimilar` can legitimately
//! find nobody; callers must handle the `None` case rather than assuming a
//! default assignee.

use std::collections::HashMap;

use crate::domain::models::{AssignmentStrategy, TaskPriority, TaskSnapshot, WorkloadAnalysis};

/// How many recent historical tasks the round-robin window covers.
const ROUND_ROBIN_WINDOW: usize = 10;

/// Pick a candidate assignee.
///
/// `history` is expected most-recent-first, matching `TaskStore::
/// completed_tasks`. Ties break by candidate list order, then by user id,
/// so selection is deterministic for a given input.
pub fn select(
    strategy: AssignmentStrategy,
    candidates: &[WorkloadAnalysis],
    history: &[TaskSnapshot],
    priority: TaskPriority,
) -> Option<String> {
    match strategy {
        // WorkloadBalance is an alias of LeastBusy in this design.
        AssignmentStrategy::LeastBusy | AssignmentStrategy::WorkloadBalance => {
            least_busy(candidates)
        }
        AssignmentStrategy::RoundRobin => round_robin(candidates, history),
        AssignmentStrategy::PreviousSimilar => previous_similar(history, priority),
    }
}

/// Minimum active-task count; first-encountered wins on ties.
fn least_busy(candidates: &[WorkloadAnalysis]) -> Option<String> {
    candidates
        .iter()
        .min_by_key(|c| c.active_tasks)
        .map(|c| c.user_id.clone())
}

/// Minimum assignment count among the most recent historical tasks.
fn round_robin(candidates: &[WorkloadAnalysis], history: &[TaskSnapshot]) -> Option<String> {
    let mut recent_counts: HashMap<&str, u32> = HashMap::new();
    for task in history.iter().take(ROUND_ROBIN_WINDOW) {
        for assignee in &task.assignees {
            *recent_counts.entry(assignee.id.as_str()).or_insert(0) += 1;
        }
    }

    candidates
        .iter()
        .min_by_key(|c| recent_counts.get(c.user_id.as_str()).copied().unwrap_or(0))
        .map(|c| c.user_id.clone())
}

/// Among completed tasks sharing the new task's priority, the assignee with
/// the highest occurrence count. `None` when no historical match exists.
fn previous_similar(history: &[TaskSnapshot], priority: TaskPriority) -> Option<String> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for task in history.iter().filter(|t| t.completed && t.priority == priority) {
        for assignee in &task.assignees {
            *counts.entry(assignee.id.as_str()).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        // Tie-break by user id for determinism; HashMap order is arbitrary.
        .max_by(|(id_a, n_a), (id_b, n_b)| n_a.cmp(n_b).then(id_b.cmp(id_a)))
        .map(|(id, _)| id.to_string())
}
