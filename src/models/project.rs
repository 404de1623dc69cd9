use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked project owning a set of activities.
///
/// The budget is the approved amount for the whole project; the activity
/// planned/actual costs roll up against it in the financial report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub budget: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "active" => Some(Self::Active),
            "on_hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Label used in generated reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Planning => "Planejamento",
            Self::Active => "Em andamento",
            Self::OnHold => "Pausado",
            Self::Completed => "Concluído",
            Self::Cancelled => "Cancelado",
        }
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
}

/// Input for updating an existing project. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
}

impl CreateProjectInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Project name must not be empty".to_string());
        }
        validate_budget(self.budget)
    }
}

impl UpdateProjectInput {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("Project name must not be empty".to_string());
        }
        validate_budget(self.budget)
    }
}

fn validate_budget(budget: Option<f64>) -> Result<(), String> {
    match budget {
        Some(b) if !b.is_finite() || b < 0.0 => {
            Err("Invalid budget: must be a non-negative number".to_string())
        }
        _ => Ok(()),
    }
}
