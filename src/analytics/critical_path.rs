use chrono::{Days, NaiveDate};

use crate::models::{Activity, ActivityStatus, CriticalPathActivity, CriticalPathAnalysis, Priority};

/// Duration assumed for activities without a planned duration, in days.
pub const DEFAULT_DURATION_DAYS: u32 = 1;

/// An activity is critical when it has critical priority or is running late.
pub fn is_critical(activity: &Activity) -> bool {
    activity.priority == Priority::Critical || activity.status == ActivityStatus::Delayed
}

/// Build the schedule entry for one activity.
///
/// The early start is the actual start, else the planned start, else
/// `today`. Late dates equal the early ones and float is zero, since
/// activities carry no dependency information to run a backward pass over.
pub fn schedule_entry(activity: &Activity, today: NaiveDate) -> CriticalPathActivity {
    let early_start = activity
        .actual_start_date
        .or(activity.planned_start_date)
        .unwrap_or(today);
    let duration = activity.planned_duration.unwrap_or(DEFAULT_DURATION_DAYS);
    let early_finish = early_start
        .checked_add_days(Days::new(u64::from(duration)))
        .unwrap_or(NaiveDate::MAX);

    CriticalPathActivity {
        id: activity.id,
        name: activity.name.clone(),
        early_start,
        early_finish,
        late_start: early_start,
        late_finish: early_finish,
        total_float: 0,
        is_critical: is_critical(activity),
        duration,
    }
}

/// Flag critical activities and summarise the schedule.
///
/// `total_duration` is the longest single activity span in days (zero for an
/// empty list); `critical_path_length` counts flagged activities.
pub fn analyze_critical_path(activities: &[Activity], today: NaiveDate) -> CriticalPathAnalysis {
    let entries: Vec<CriticalPathActivity> = activities
        .iter()
        .map(|a| schedule_entry(a, today))
        .collect();

    let critical_path: Vec<CriticalPathActivity> =
        entries.iter().filter(|e| e.is_critical).cloned().collect();

    let total_duration = entries
        .iter()
        .map(|e| (e.early_finish - e.early_start).num_days())
        .max()
        .unwrap_or(0);

    tracing::debug!(
        activities = entries.len(),
        critical = critical_path.len(),
        total_duration,
        "Critical path analysed"
    );

    CriticalPathAnalysis {
        critical_path_length: critical_path.len(),
        activities: entries,
        critical_path,
        total_duration,
    }
}
