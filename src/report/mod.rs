//! Report assembly.
//!
//! A [`ReportContext`] gathers every aggregate a report needs in one pure
//! pass over the projects and activities. The [`ReportAssembler`] then
//! renders it as a self-contained HTML page ("advanced" report) or a
//! paginated text document (per-type "simple" report), attaching narrative
//! observations from the external service or the deterministic fallback.

mod document;
mod html;
mod narrative;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics;
use crate::models::*;

pub use document::*;
pub use html::render_advanced_html;
pub use narrative::*;

/// Which audience a report is written for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Projects,
    Users,
    Financial,
    General,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Projects,
        ReportType::Users,
        ReportType::Financial,
        ReportType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Users => "users",
            Self::Financial => "financial",
            Self::General => "general",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "projects" => Some(Self::Projects),
            "users" => Some(Self::Users),
            "financial" => Some(Self::Financial),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Projects => "Relatório de Projetos",
            Self::Users => "Relatório de Usuários",
            Self::Financial => "Relatório Financeiro",
            Self::General => "Relatório Geral",
        }
    }
}

/// Every aggregate a report renders, computed once per request.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub generated_on: NaiveDate,
    pub projects: Vec<Project>,
    pub activities: Vec<Activity>,
    pub totals: EarnedValueTotals,
    pub kpis: KpiData,
    pub critical_path: CriticalPathAnalysis,
    pub roadmap: Roadmap,
    pub workload: Vec<WorkloadEntry>,
    pub financials: Vec<ProjectFinancials>,
}

impl ReportContext {
    pub fn build(
        projects: Vec<Project>,
        activities: Vec<Activity>,
        today: NaiveDate,
        roadmap_year: i32,
    ) -> Self {
        let totals = analytics::earned_value_totals(&activities);
        Self {
            generated_on: today,
            kpis: analytics::kpis_from_totals(&totals),
            totals,
            critical_path: analytics::analyze_critical_path(&activities, today),
            roadmap: analytics::build_roadmap(&activities, roadmap_year),
            workload: analytics::workload_by_responsible(&activities),
            financials: analytics::project_financials(&projects, &activities),
            projects,
            activities,
        }
    }
}

/// A rendered report ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Renders reports, fetching narrative observations along the way.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    narrative: NarrativeClient,
}

impl ReportAssembler {
    pub fn new(narrative: NarrativeClient) -> Self {
        Self { narrative }
    }

    /// Observations for a report. Falls back to templated text on any failure.
    pub async fn observations(&self, report_type: ReportType, ctx: &ReportContext) -> Observations {
        if !self.narrative.is_enabled() {
            return Observations::fallback(report_type, ctx);
        }

        let request = NarrativeRequest::new(report_type, ctx);
        match self.narrative.generate(&request).await {
            Ok(observations) => {
                tracing::debug!(report_type = report_type.as_str(), "Narrative generated");
                observations
            }
            Err(e) => {
                tracing::warn!(
                    report_type = report_type.as_str(),
                    "Narrative generation failed, using fallback: {}",
                    e
                );
                Observations::fallback(report_type, ctx)
            }
        }
    }

    /// Self-contained HTML report for one dashboard.
    pub async fn advanced_report(
        &self,
        report_type: ReportType,
        dashboard_id: Uuid,
        ctx: &ReportContext,
    ) -> ReportFile {
        let observations = self.observations(report_type, ctx).await;
        ReportFile {
            filename: format!(
                "relatorio-{}-dashboard-{}-{}.html",
                report_type.as_str(),
                dashboard_id,
                ctx.generated_on.format("%Y-%m-%d")
            ),
            content_type: "text/html; charset=utf-8",
            body: render_advanced_html(report_type, dashboard_id, ctx, &observations),
        }
    }

    /// Paginated text report.
    pub async fn simple_report(&self, report_type: ReportType, ctx: &ReportContext) -> ReportFile {
        let observations = self.observations(report_type, ctx).await;
        let document = build_document(report_type, ctx, &observations);
        ReportFile {
            filename: format!(
                "relatorio-{}-{}.txt",
                report_type.as_str(),
                ctx.generated_on.format("%Y-%m-%d")
            ),
            content_type: "text/plain; charset=utf-8",
            body: document.render(),
        }
    }
}

/// Format a number with a decimal comma and dot thousands separators (`1.234,5`).
pub fn format_number(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Format an amount in reais (`R$ 1.234,56`).
pub fn format_currency(value: f64) -> String {
    format!("R$ {}", format_number(value, 2))
}
