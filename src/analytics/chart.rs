use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{
    Activity, Aggregation, ChartPoint, ChartSeries, ChartSpec, GroupField, MetricField,
};

use super::{completion_fraction, cost, quarter_of, round_to};

/// Label for activities with no value in the grouping field.
pub const UNSET_LABEL: &str = "unset";

/// Chart configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("The count metric can only be combined with the count aggregation")]
    CountMetricNeedsCount,

    #[error("Chart title must not be blank")]
    BlankTitle,
}

impl ChartSpec {
    /// Reject field/aggregation combinations before any data is read.
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.y_field == MetricField::Count && self.aggregation != Aggregation::Count {
            return Err(ChartError::CountMetricNeedsCount);
        }
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(ChartError::BlankTitle);
        }
        Ok(())
    }
}

fn group_label(activity: &Activity, field: GroupField) -> String {
    let text = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNSET_LABEL)
            .to_string()
    };

    match field {
        GroupField::Status => activity.status.as_str().to_string(),
        GroupField::Priority => activity.priority.as_str().to_string(),
        GroupField::Discipline => text(&activity.discipline),
        GroupField::Responsible => text(&activity.responsible),
        GroupField::Quarter => activity
            .planned_start_date
            .map(|d| format!("Q{}", quarter_of(d)))
            .unwrap_or_else(|| UNSET_LABEL.to_string()),
        GroupField::IsMilestone if activity.is_milestone => "milestone".to_string(),
        GroupField::IsMilestone => "activity".to_string(),
    }
}

fn metric_value(activity: &Activity, field: MetricField) -> f64 {
    match field {
        MetricField::PlannedCost => cost(activity.planned_cost),
        MetricField::ActualCost => cost(activity.actual_cost),
        MetricField::CompletionPercentage => {
            completion_fraction(activity.completion_percentage) * 100.0
        }
        MetricField::PlannedDuration => f64::from(activity.planned_duration.unwrap_or(0)),
        MetricField::Count => 1.0,
    }
}

fn aggregate(values: &[f64], aggregation: Aggregation) -> f64 {
    match aggregation {
        Aggregation::Sum => values.iter().sum(),
        Aggregation::Avg => values.iter().sum::<f64>() / values.len() as f64,
        Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregation::Count => values.len() as f64,
    }
}

/// Evaluate a chart spec over a set of activities.
///
/// Groups are never empty, so every aggregation is well defined. Points are
/// ordered by label.
pub fn build_chart(activities: &[Activity], spec: &ChartSpec) -> Result<ChartSeries, ChartError> {
    spec.validate()?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for activity in activities {
        groups
            .entry(group_label(activity, spec.x_field))
            .or_default()
            .push(metric_value(activity, spec.y_field));
    }

    let points = groups
        .into_iter()
        .map(|(label, values)| ChartPoint {
            label,
            value: round_to(aggregate(&values, spec.aggregation), 1),
        })
        .collect();

    Ok(ChartSeries {
        title: spec.title.clone(),
        x_field: spec.x_field,
        y_field: spec.y_field,
        aggregation: spec.aggregation,
        points,
    })
}
