//! Recurrence computation and materialization.
//!
//! `next_occurrence` is the pure calendar function at the heart of the
//! recurrence engine: given a configuration and a reference date it returns
//! the next occurrence date, or `None` once an end condition is satisfied.
//! Exhaustion is an expected terminal state, not an error.
//!
//! `RecurrenceService` owns the stored configurations and performs the
//! side-effecting materialization step (driven by an external scheduling
//! tick), which is the only place `total_occurrences` advances.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{
    EndCondition, RecurrencePattern, RecurringConfigDraft, RecurringTaskConfig, TaskInstance,
};

/// Last day of the month containing `year`/`month`.
fn last_day_of_month(year: i32, month: u32) -> u32 {
    // The day before the first of the following month.
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map_or(28, |d| (d - Duration::days(1)).day())
}

/// Add `months` calendar months to `date`, clamping the day to the target
/// month's length instead of rolling into the following month.
///
/// Jan 31 + 1 month is Feb 28 (or Feb 29 in a leap year), never Mar 2-3.
pub fn add_months_clamped(date: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = date.year() * 12 + i32::try_from(date.month0()).unwrap_or(0)
        + i32::try_from(months).unwrap_or(i32::MAX);
    let year = zero_based.div_euclid(12);
    let month = u32::try_from(zero_based.rem_euclid(12)).unwrap_or(0) + 1;
    let day = date.day().min(last_day_of_month(year, month));
    // Valid by construction: day is clamped to the month length.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Advance from `date` to the next date (strictly after `date`) whose
/// weekday has the given Sunday-based index (0 = Sunday .. 6 = Saturday).
///
/// When `date` already falls on the target weekday, the result is the
/// target weekday `interval` weeks out.
fn next_weekday(date: NaiveDate, target: u8, interval: u32) -> NaiveDate {
    let current = date.weekday().num_days_from_sunday();
    let target = u32::from(target % 7);
    if current == target {
        date + Duration::weeks(i64::from(interval))
    } else {
        let ahead = (target + 7 - current) % 7;
        date + Duration::days(i64::from(ahead))
    }
}

/// Compute the next occurrence date for a configuration, from a reference
/// date. Pure and deterministic: identical inputs yield identical output.
///
/// Returns `None` when an end condition is already satisfied, or when the
/// computed candidate would fall past an `OnDate` boundary. The boundary
/// check applies to the result, not just the starting point.
pub fn next_occurrence(config: &RecurringTaskConfig, from: NaiveDate) -> Option<NaiveDate> {
    match config.end_condition {
        EndCondition::AfterOccurrences { occurrences } if config.total_occurrences >= occurrences => {
            return None;
        }
        EndCondition::OnDate { end_date } if from > end_date => return None,
        _ => {}
    }

    let interval = config.interval.max(1);
    let candidate = match config.pattern {
        RecurrencePattern::Daily => from + Duration::days(i64::from(interval)),
        RecurrencePattern::Weekly => weekly_candidate(config, from, interval),
        // Biweekly is weekly with a doubled effective interval.
        RecurrencePattern::Biweekly => weekly_candidate(config, from, interval * 2),
        RecurrencePattern::Monthly => {
            let mut date = add_months_clamped(from, interval);
            if let Some(dom) = config.day_of_month {
                let day = dom.min(last_day_of_month(date.year(), date.month()));
                date = NaiveDate::from_ymd_opt(date.year(), date.month(), day).unwrap_or(date);
            }
            date
        }
        RecurrencePattern::Quarterly => add_months_clamped(from, 3 * interval),
        RecurrencePattern::Yearly => add_months_clamped(from, 12 * interval),
    };

    match config.end_condition {
        EndCondition::OnDate { end_date } if candidate > end_date => None,
        _ => Some(candidate),
    }
}

/// Weekly candidate. When `days_of_week` is non-empty only its first entry
/// is honored: the next occurrence lands on that weekday, `interval` weeks
/// out if `from` is already on it, otherwise on its next calendar
/// occurrence. Multiple configured days are not round-robined.
fn weekly_candidate(config: &RecurringTaskConfig, from: NaiveDate, interval: u32) -> NaiveDate {
    match config.days_of_week.first() {
        Some(&target) => next_weekday(from, target, interval),
        None => from + Duration::weeks(i64::from(interval)),
    }
}

/// Generate a preview of the next `count` occurrences from `from`.
///
/// A dry run: repeated application of `next_occurrence`, never touching
/// `total_occurrences`. The occurrence counter is simulated locally so
/// `AfterOccurrences` end conditions truncate the preview correctly.
pub fn preview_occurrences(
    config: &RecurringTaskConfig,
    from: NaiveDate,
    count: usize,
) -> Vec<NaiveDate> {
    let mut simulated = config.clone();
    let mut cursor = from;
    let mut dates = Vec::with_capacity(count);

    for _ in 0..count {
        match next_occurrence(&simulated, cursor) {
            Some(date) => {
                dates.push(date);
                simulated.total_occurrences += 1;
                cursor = date;
            }
            None => break,
        }
    }

    dates
}

/// Owns recurring configurations and materializes task instances.
pub struct RecurrenceService {
    configs: RwLock<Vec<RecurringTaskConfig>>,
}

impl Default for RecurrenceService {
    fn default() -> Self {
        Self::new()
    }
}

impl RecurrenceService {
    pub fn new() -> Self {
        Self {
            configs: RwLock::new(Vec::new()),
        }
    }

    /// Create a configuration from a draft.
    pub async fn create_config(
        &self,
        draft: RecurringConfigDraft,
    ) -> EngineResult<RecurringTaskConfig> {
        if draft.interval == 0 {
            return Err(EngineError::Validation("interval must be >= 1".into()));
        }
        if draft.days_of_week.iter().any(|&d| d > 6) {
            return Err(EngineError::Validation(
                "days_of_week entries must be 0-6".into(),
            ));
        }
        if let Some(dom) = draft.day_of_month {
            if !(1..=31).contains(&dom) {
                return Err(EngineError::Validation("day_of_month must be 1-31".into()));
            }
        }

        let config = RecurringTaskConfig {
            id: Uuid::new_v4(),
            template_task_id: draft.template_task_id,
            enabled: true,
            pattern: draft.pattern,
            interval: draft.interval,
            days_of_week: draft.days_of_week,
            day_of_month: draft.day_of_month,
            start_date: draft.start_date,
            end_condition: draft.end_condition,
            create_in_advance_days: draft.create_in_advance_days,
            auto_assign: draft.auto_assign,
            created_by: draft.created_by,
            created_at: Utc::now(),
            total_occurrences: 0,
            next_occurrence_date: None,
        };

        tracing::info!(
            config_id = %config.id,
            pattern = config.pattern.as_str(),
            interval = config.interval,
            "recurring config created"
        );

        let mut store = self.configs.write().await;
        store.push(config.clone());
        Ok(config)
    }

    /// Get a configuration by id.
    pub async fn get_config(&self, config_id: Uuid) -> EngineResult<RecurringTaskConfig> {
        let store = self.configs.read().await;
        store
            .iter()
            .find(|c| c.id == config_id)
            .cloned()
            .ok_or(EngineError::ConfigNotFound(config_id))
    }

    /// Enable or disable a configuration.
    pub async fn set_enabled(&self, config_id: Uuid, enabled: bool) -> EngineResult<()> {
        let mut store = self.configs.write().await;
        let config = store
            .iter_mut()
            .find(|c| c.id == config_id)
            .ok_or(EngineError::ConfigNotFound(config_id))?;
        config.enabled = enabled;
        Ok(())
    }

    /// Materialize the next occurrence of a configuration, advancing its
    /// counters. Called by the host's scheduling tick.
    ///
    /// Returns `Ok(None)` without mutating anything when the series is
    /// exhausted, disabled, or the next occurrence is further out than
    /// `create_in_advance_days` allows.
    pub async fn materialize_next(
        &self,
        config_id: Uuid,
        today: NaiveDate,
    ) -> EngineResult<Option<TaskInstance>> {
        let mut store = self.configs.write().await;
        let config = store
            .iter_mut()
            .find(|c| c.id == config_id)
            .ok_or(EngineError::ConfigNotFound(config_id))?;

        if !config.enabled {
            return Ok(None);
        }

        let reference = config.next_occurrence_date.unwrap_or(config.start_date);
        let Some(occurrence) = next_occurrence(config, reference) else {
            tracing::debug!(config_id = %config.id, "recurrence series exhausted");
            return Ok(None);
        };

        let horizon = today + Duration::days(i64::from(config.create_in_advance_days));
        if occurrence > horizon {
            return Ok(None);
        }

        config.total_occurrences += 1;
        config.next_occurrence_date = Some(occurrence);

        let instance = TaskInstance {
            id: Uuid::new_v4(),
            config_id: config.id,
            template_task_id: config.template_task_id,
            occurrence_date: occurrence,
            sequence: config.total_occurrences,
            assignee_ids: Vec::new(),
            created_at: Utc::now(),
        };

        tracing::info!(
            config_id = %config.id,
            occurrence = %occurrence,
            sequence = instance.sequence,
            "occurrence materialized"
        );

        Ok(Some(instance))
    }
}
