use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled unit of work inside a project.
///
/// Activities are the raw input of every analytics pass: the earned-value
/// KPIs, the critical path flags, the quarterly roadmap and the reports are
/// all recomputed from the current list on each request.
///
/// Costs are in the project currency. `completion_percentage` ranges over
/// `0..=100`. `planned_duration` is in days; `None` is treated as one day by
/// the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub status: ActivityStatus,
    pub priority: Priority,
    #[serde(default)]
    pub planned_cost: f64,
    #[serde(default)]
    pub actual_cost: f64,
    #[serde(default)]
    pub completion_percentage: f64,
    pub planned_start_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub planned_duration: Option<u32>,
    #[serde(default)]
    pub is_milestone: bool,
    pub responsible: Option<String>,
    pub discipline: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Execution status of an activity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Delayed,
    Cancelled,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "delayed" => Some(Self::Delayed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Label used in generated reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Não iniciada",
            Self::InProgress => "Em andamento",
            Self::Completed => "Concluída",
            Self::Delayed => "Atrasada",
            Self::Cancelled => "Cancelada",
        }
    }
}

/// Priority assigned to an activity. `Critical` activities are always on the critical path.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Baixa",
            Self::Medium => "Média",
            Self::High => "Alta",
            Self::Critical => "Crítica",
        }
    }
}

/// Input for creating a new activity. Only `name` is required; everything
/// else falls back to the defaults the analytics expect (zero cost, zero
/// completion, `not_started`, `medium`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateActivityInput {
    pub name: String,
    pub status: Option<ActivityStatus>,
    pub priority: Option<Priority>,
    pub planned_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub completion_percentage: Option<f64>,
    pub planned_start_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub planned_duration: Option<u32>,
    #[serde(default)]
    pub is_milestone: bool,
    pub responsible: Option<String>,
    pub discipline: Option<String>,
}

/// Input for updating an activity. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateActivityInput {
    pub name: Option<String>,
    pub status: Option<ActivityStatus>,
    pub priority: Option<Priority>,
    pub planned_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub completion_percentage: Option<f64>,
    pub planned_start_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub planned_duration: Option<u32>,
    pub is_milestone: Option<bool>,
    pub responsible: Option<String>,
    pub discipline: Option<String>,
}

impl CreateActivityInput {
    /// Check the numeric ranges before the activity reaches the store.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Activity name must not be empty".to_string());
        }
        validate_amounts(
            self.planned_cost,
            self.actual_cost,
            self.completion_percentage,
        )
    }
}

impl UpdateActivityInput {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("Activity name must not be empty".to_string());
        }
        validate_amounts(
            self.planned_cost,
            self.actual_cost,
            self.completion_percentage,
        )
    }
}

fn validate_amounts(
    planned_cost: Option<f64>,
    actual_cost: Option<f64>,
    completion_percentage: Option<f64>,
) -> Result<(), String> {
    for (field, value) in [("planned_cost", planned_cost), ("actual_cost", actual_cost)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("Invalid {}: must be a non-negative number", field));
            }
        }
    }
    if let Some(p) = completion_percentage {
        if !(0.0..=100.0).contains(&p) {
            return Err("Invalid completion_percentage: must be between 0 and 100".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_name() {
        let input = CreateActivityInput {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_completion() {
        let input = CreateActivityInput {
            name: "Fundação".to_string(),
            completion_percentage: Some(120.0),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert!(err.contains("completion_percentage"));
    }

    #[test]
    fn rejects_negative_cost_on_update() {
        let input = UpdateActivityInput {
            actual_cost: Some(-1.0),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert!(err.contains("actual_cost"));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ActivityStatus::NotStarted,
            ActivityStatus::InProgress,
            ActivityStatus::Completed,
            ActivityStatus::Delayed,
            ActivityStatus::Cancelled,
        ] {
            assert_eq!(ActivityStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ActivityStatus::from_str("done"), None);
    }
}
