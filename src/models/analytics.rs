use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Earned-value indicators for a set of activities.
///
/// Derived on every request and never persisted. `spi` and `cpi` are rounded
/// to two decimals, the percentages to one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiData {
    /// Schedule performance index (earned value / planned value).
    pub spi: f64,
    /// Cost performance index (earned value / actual cost).
    pub cpi: f64,
    /// Share of activities with status `completed`, in percent.
    pub completion_rate: f64,
    /// `(EV - AC) / total planned cost`, in percent.
    pub budget_variance: f64,
    /// `(EV - PV) / total planned cost`, in percent.
    pub schedule_variance: f64,
    /// Classified on the unrounded indices, so a CPI of 0.7994 shows as
    /// `0.80` here yet still counts as below the 0.8 threshold.
    pub risk_level: RiskLevel,
}

/// Risk classification derived from SPI and CPI.
///
/// Variants are declared from least to most severe so `Ord` follows severity.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "baixo",
            Self::Medium => "médio",
            Self::High => "alto",
            Self::Critical => "crítico",
        }
    }
}

/// Unrounded earned-value totals behind [`KpiData`], also used by the financial report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EarnedValueTotals {
    pub activity_count: usize,
    pub completed_count: usize,
    pub total_planned_cost: f64,
    pub total_actual_cost: f64,
    pub planned_value: f64,
    pub earned_value: f64,
}

/// Schedule entry produced by the critical path flagger.
///
/// `late_start`/`late_finish` mirror the early dates and `total_float` is
/// always zero: no backward pass is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathActivity {
    pub id: Uuid,
    pub name: String,
    pub early_start: NaiveDate,
    pub early_finish: NaiveDate,
    pub late_start: NaiveDate,
    pub late_finish: NaiveDate,
    pub total_float: i64,
    pub is_critical: bool,
    /// Duration in days.
    pub duration: u32,
}

/// Result of one critical path pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathAnalysis {
    /// Every activity, in input order.
    pub activities: Vec<CriticalPathActivity>,
    /// The subset flagged critical, in input order.
    pub critical_path: Vec<CriticalPathActivity>,
    /// Longest single activity span, in days.
    pub total_duration: i64,
    pub critical_path_length: usize,
}

/// Four calendar quarters of activities, labelled with a single year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub year: i32,
    pub quarters: Vec<RoadmapQuarter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapQuarter {
    /// 1 through 4.
    pub quarter: u8,
    /// e.g. `Q1 2025`.
    pub label: String,
    pub activity_ids: Vec<Uuid>,
    pub activity_count: usize,
    pub milestone_count: usize,
    pub completed_count: usize,
    /// Completed activities over the quarter's activities, in percent.
    pub completion_rate: f64,
}

/// Per-person workload, grouped by the activity `responsible` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadEntry {
    pub responsible: String,
    pub activity_count: usize,
    pub completed_count: usize,
    pub delayed_count: usize,
    pub critical_count: usize,
    /// Mean completion percentage, one decimal.
    pub average_completion: f64,
    pub planned_cost: f64,
}

/// Budget and earned-value figures for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFinancials {
    pub project_id: Uuid,
    pub project_name: String,
    pub budget: f64,
    pub planned_cost: f64,
    pub actual_cost: f64,
    pub earned_value: f64,
    /// Budget left after actual cost; negative when over budget.
    pub remaining_budget: f64,
    /// Actual cost over budget, in percent (one decimal). Zero without a budget.
    pub budget_consumption: f64,
    pub cpi: f64,
}
