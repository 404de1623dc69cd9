use crate::models::{Activity, Project, ProjectFinancials};

use super::{earned_value_totals, ratio, round_to};

/// Budget rollup per project, in the order the projects are given.
///
/// Activities whose `project_id` matches no project are ignored.
pub fn project_financials(projects: &[Project], activities: &[Activity]) -> Vec<ProjectFinancials> {
    projects
        .iter()
        .map(|project| {
            let owned: Vec<Activity> = activities
                .iter()
                .filter(|a| a.project_id == project.id)
                .cloned()
                .collect();
            let totals = earned_value_totals(&owned);
            let budget = if project.budget.is_finite() {
                project.budget.max(0.0)
            } else {
                0.0
            };

            ProjectFinancials {
                project_id: project.id,
                project_name: project.name.clone(),
                budget,
                planned_cost: totals.total_planned_cost,
                actual_cost: totals.total_actual_cost,
                earned_value: totals.earned_value,
                remaining_budget: budget - totals.total_actual_cost,
                budget_consumption: round_to(
                    ratio(totals.total_actual_cost * 100.0, budget),
                    1,
                ),
                cpi: round_to(ratio(totals.earned_value, totals.total_actual_cost), 2),
            }
        })
        .collect()
}
