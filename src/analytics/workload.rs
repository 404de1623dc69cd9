use std::collections::BTreeMap;

use crate::models::{Activity, ActivityStatus, WorkloadEntry};

use super::{completion_fraction, cost, is_critical, round_to};

/// Label for activities without a responsible person.
pub const UNASSIGNED: &str = "Sem responsável";

/// Group activities by responsible person, heaviest workload first.
///
/// Ties on activity count are broken by name so the order is stable.
pub fn workload_by_responsible(activities: &[Activity]) -> Vec<WorkloadEntry> {
    let mut groups: BTreeMap<&str, Vec<&Activity>> = BTreeMap::new();
    for activity in activities {
        let key = activity
            .responsible
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNASSIGNED);
        groups.entry(key).or_default().push(activity);
    }

    let mut entries: Vec<WorkloadEntry> = groups
        .into_iter()
        .map(|(responsible, group)| {
            let count = |status: ActivityStatus| group.iter().filter(|a| a.status == status).count();
            let completion_sum: f64 = group
                .iter()
                .map(|a| completion_fraction(a.completion_percentage) * 100.0)
                .sum();
            WorkloadEntry {
                responsible: responsible.to_string(),
                activity_count: group.len(),
                completed_count: count(ActivityStatus::Completed),
                delayed_count: count(ActivityStatus::Delayed),
                critical_count: group.iter().filter(|a| is_critical(a)).count(),
                average_completion: round_to(completion_sum / group.len() as f64, 1),
                planned_cost: group.iter().map(|a| cost(a.planned_cost)).sum(),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.activity_count
            .cmp(&a.activity_count)
            .then_with(|| a.responsible.cmp(&b.responsible))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::activity;
    use crate::models::Priority;

    fn owned(name: &str, responsible: Option<&str>) -> Activity {
        Activity {
            responsible: responsible.map(String::from),
            ..activity(name)
        }
    }

    #[test]
    fn groups_and_orders_by_load() {
        let mut late = owned("late", Some("Ana"));
        late.status = ActivityStatus::Delayed;
        late.completion_percentage = 20.0;
        let mut urgent = owned("urgent", Some("Ana"));
        urgent.priority = Priority::Critical;
        urgent.completion_percentage = 60.0;
        let activities = vec![
            owned("solo", Some("Bruno")),
            late,
            urgent,
            owned("floating", None),
            owned("blank", Some("  ")),
        ];

        let workload = workload_by_responsible(&activities);
        assert_eq!(workload.len(), 3);

        assert_eq!(workload[0].responsible, "Ana");
        assert_eq!(workload[0].activity_count, 2);
        assert_eq!(workload[0].delayed_count, 1);
        assert_eq!(workload[0].critical_count, 2);
        assert_eq!(workload[0].average_completion, 40.0);

        assert_eq!(workload[1].responsible, UNASSIGNED);
        assert_eq!(workload[1].activity_count, 2);
        assert_eq!(workload[2].responsible, "Bruno");
    }

    #[test]
    fn empty_input_has_no_entries() {
        assert!(workload_by_responsible(&[]).is_empty());
    }
}
