use serde::{Deserialize, Serialize};

/// A user-defined chart or KPI over a project's activities.
///
/// Field names form a closed set: unknown names fail deserialization, and
/// combinations that make no sense are rejected by [`ChartSpec::validate`]
/// before anything is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Optional display title, echoed back in the result.
    #[serde(default)]
    pub title: Option<String>,
    /// Field the activities are grouped by (the x axis).
    pub x_field: GroupField,
    /// Field that is aggregated within each group (the y axis).
    pub y_field: MetricField,
    pub aggregation: Aggregation,
}

/// Activity fields usable as a grouping key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Status,
    Priority,
    Discipline,
    Responsible,
    Quarter,
    IsMilestone,
}

/// Numeric activity fields usable as a metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    PlannedCost,
    ActualCost,
    CompletionPercentage,
    PlannedDuration,
    /// Each activity counts as one.
    Count,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

/// One labelled value of a computed chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// A computed chart: the spec it came from plus its points, ordered by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub title: Option<String>,
    pub x_field: GroupField,
    pub y_field: MetricField,
    pub aggregation: Aggregation,
    pub points: Vec<ChartPoint>,
}
