//! Workload analysis.
//!
//! Aggregates open tasks per assignee into utilization, overload, and
//! spare-capacity figures. The per-task hour estimate is a fixed heuristic
//! from `WorkloadConfig`, not a measured value. Results are recomputed on
//! every call and never cached.

use chrono::{Duration, NaiveDate};

use crate::domain::models::{TaskSnapshot, TeamMember, WorkloadAnalysis, WorkloadConfig};

/// Computes per-member workload figures.
#[derive(Debug, Clone)]
pub struct WorkloadAnalyzer {
    config: WorkloadConfig,
}

impl Default for WorkloadAnalyzer {
    fn default() -> Self {
        Self::new(WorkloadConfig::default())
    }
}

impl WorkloadAnalyzer {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config }
    }

    /// One analysis entry per member, in member order.
    ///
    /// Due-soon counts assigned open tasks due within the configured window
    /// (inclusive of `today`); overdue counts those strictly in the past.
    pub fn analyze(
        &self,
        open_tasks: &[TaskSnapshot],
        members: &[TeamMember],
        today: NaiveDate,
    ) -> Vec<WorkloadAnalysis> {
        members
            .iter()
            .map(|member| self.analyze_member(open_tasks, member, today))
            .collect()
    }

    fn analyze_member(
        &self,
        open_tasks: &[TaskSnapshot],
        member: &TeamMember,
        today: NaiveDate,
    ) -> WorkloadAnalysis {
        let assigned: Vec<&TaskSnapshot> = open_tasks
            .iter()
            .filter(|t| !t.completed && t.is_assigned_to(&member.id))
            .collect();

        let active_tasks = u32::try_from(assigned.len()).unwrap_or(u32::MAX);
        let soon_cutoff = today + Duration::days(self.config.due_soon_days);

        let due_soon = assigned
            .iter()
            .filter(|t| {
                t.due_date
                    .is_some_and(|due| due >= today && due <= soon_cutoff)
            })
            .count();
        let overdue = assigned
            .iter()
            .filter(|t| t.due_date.is_some_and(|due| due < today))
            .count();

        let total_estimated_hours = active_tasks * self.config.hours_per_task;
        let utilization_percentage = if self.config.week_hours == 0 {
            0
        } else {
            (f64::from(total_estimated_hours) / f64::from(self.config.week_hours) * 100.0).round()
                as u32
        };

        let overloaded = utilization_percentage > 100;
        let can_take_more = utilization_percentage < self.config.capacity_threshold;
        let suggested_capacity = if can_take_more && self.config.hours_per_task > 0 {
            self.config
                .week_hours
                .saturating_sub(total_estimated_hours)
                / self.config.hours_per_task
        } else {
            0
        };

        WorkloadAnalysis {
            user_id: member.id.clone(),
            user_name: member.name.clone(),
            active_tasks,
            total_estimated_hours,
            utilization_percentage,
            overloaded,
            due_soon: u32::try_from(due_soon).unwrap_or(u32::MAX),
            overdue: u32::try_from(overdue).unwrap_or(u32::MAX),
            can_take_more,
            suggested_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Assignee;

    fn member() -> TeamMember {
        TeamMember::new("u1", "Alice")
    }

    fn assigned_task() -> TaskSnapshot {
        TaskSnapshot::new("t").with_assignee(Assignee::new("u1", "Alice"))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_six_tasks_is_overloaded() {
        let analyzer = WorkloadAnalyzer::default();
        let tasks: Vec<TaskSnapshot> = (0..6).map(|_| assigned_task()).collect();

        let analysis = analyzer.analyze(&tasks, &[member()], date(2026, 1, 1));
        let a = &analysis[0];
        assert_eq!(a.active_tasks, 6);
        assert_eq!(a.total_estimated_hours, 48);
        assert_eq!(a.utilization_percentage, 120);
        assert!(a.overloaded);
        assert!(!a.can_take_more);
        assert_eq!(a.suggested_capacity, 0);
    }

    #[test]
    fn test_light_load_has_capacity() {
        let analyzer = WorkloadAnalyzer::default();
        let tasks = vec![assigned_task(), assigned_task()];

        let a = &analyzer.analyze(&tasks, &[member()], date(2026, 1, 1))[0];
        assert_eq!(a.active_tasks, 2);
        assert_eq!(a.utilization_percentage, 40);
        assert!(!a.overloaded);
        assert!(a.can_take_more);
        // (40 - 16) / 8
        assert_eq!(a.suggested_capacity, 3);
    }

    #[test]
    fn test_due_soon_and_overdue_windows() {
        let analyzer = WorkloadAnalyzer::default();
        let today = date(2026, 1, 10);
        let tasks = vec![
            assigned_task().with_due_date(date(2026, 1, 9)),  // overdue
            assigned_task().with_due_date(date(2026, 1, 10)), // due today: soon
            assigned_task().with_due_date(date(2026, 1, 17)), // window edge: soon
            assigned_task().with_due_date(date(2026, 1, 18)), // past window
            assigned_task(),                                  // no due date
        ];

        let a = &analyzer.analyze(&tasks, &[member()], today)[0];
        assert_eq!(a.overdue, 1);
        assert_eq!(a.due_soon, 2);
        assert_eq!(a.active_tasks, 5);
    }

    #[test]
    fn test_unassigned_and_completed_tasks_ignored() {
        let analyzer = WorkloadAnalyzer::default();
        let mut done = assigned_task();
        done.completed = true;
        let tasks = vec![TaskSnapshot::new("unassigned"), done];

        let a = &analyzer.analyze(&tasks, &[member()], date(2026, 1, 1))[0];
        assert_eq!(a.active_tasks, 0);
        assert_eq!(a.utilization_percentage, 0);
        assert_eq!(a.suggested_capacity, 5);
    }
}
