//! Client for the external narrative generation service.
//!
//! The service receives the aggregated report data and answers with a short
//! commentary paragraph. It is optional: when it is not configured, fails,
//! or answers with nothing, the report uses [`Observations::fallback`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NarrativeConfig;
use crate::models::{
    ActivityStatus, CriticalPathActivity, KpiData, Priority, ProjectStatus, Roadmap,
};

use super::{format_currency, format_number, ReportContext, ReportType};

/// Narrative generation errors. None of these reach the report caller.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Narrative service is not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Narrative service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Narrative service returned empty observations")]
    Empty,
}

/// Where the observations text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    Generated,
    Fallback,
}

/// Commentary for the observations section of a report. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observations {
    pub text: String,
    pub source: ObservationSource,
}

/// Request body sent to the narrative service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest<'a> {
    pub report_type: ReportType,
    pub data: NarrativeData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeData<'a> {
    pub kpis: &'a KpiData,
    pub critical_path: &'a [CriticalPathActivity],
    pub roadmap: &'a Roadmap,
    pub activities: Vec<ActivityDigest<'a>>,
    pub projects: Vec<ProjectDigest<'a>>,
}

/// Activity fields shared with the narrative service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDigest<'a> {
    pub name: &'a str,
    pub status: ActivityStatus,
    pub priority: Priority,
    pub completion_percentage: f64,
    pub responsible: Option<&'a str>,
    pub discipline: Option<&'a str>,
}

/// Project fields shared with the narrative service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDigest<'a> {
    pub name: &'a str,
    pub status: ProjectStatus,
    pub budget: f64,
}

#[derive(Debug, Deserialize)]
struct NarrativeResponse {
    observations: String,
}

impl<'a> NarrativeRequest<'a> {
    pub fn new(report_type: ReportType, ctx: &'a ReportContext) -> Self {
        Self {
            report_type,
            data: NarrativeData {
                kpis: &ctx.kpis,
                critical_path: &ctx.critical_path.critical_path,
                roadmap: &ctx.roadmap,
                activities: ctx
                    .activities
                    .iter()
                    .map(|a| ActivityDigest {
                        name: &a.name,
                        status: a.status,
                        priority: a.priority,
                        completion_percentage: a.completion_percentage,
                        responsible: a.responsible.as_deref(),
                        discipline: a.discipline.as_deref(),
                    })
                    .collect(),
                projects: ctx
                    .projects
                    .iter()
                    .map(|p| ProjectDigest {
                        name: &p.name,
                        status: p.status,
                        budget: p.budget,
                    })
                    .collect(),
            },
        }
    }
}

/// HTTP client for the narrative service. Makes a single attempt per call.
#[derive(Debug, Clone)]
pub struct NarrativeClient {
    url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    client: Client,
}

impl NarrativeClient {
    pub fn from_config(config: &NarrativeConfig) -> Self {
        Self {
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
            client: Client::new(),
        }
    }

    /// A client that never calls out; every report gets fallback text.
    pub fn disabled() -> Self {
        Self::from_config(&NarrativeConfig::disabled())
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Request commentary for a report.
    pub async fn generate(
        &self,
        request: &NarrativeRequest<'_>,
    ) -> Result<Observations, GenerationError> {
        let url = self.url.as_deref().ok_or(GenerationError::NotConfigured)?;

        let mut req = self.client.post(url).timeout(self.timeout).json(request);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let body: NarrativeResponse = response.json().await?;
        let text = body.observations.trim();
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }

        Ok(Observations {
            text: text.to_string(),
            source: ObservationSource::Generated,
        })
    }
}

impl Observations {
    /// Deterministic commentary built from the report's own aggregates.
    pub fn fallback(report_type: ReportType, ctx: &ReportContext) -> Self {
        let kpis = &ctx.kpis;
        let text = match report_type {
            ReportType::Projects => {
                let active = ctx
                    .projects
                    .iter()
                    .filter(|p| p.status == ProjectStatus::Active)
                    .count();
                format!(
                    "O portfólio reúne {} projeto(s), dos quais {} em andamento, com {} atividade(s) acompanhada(s). \
                     A taxa de conclusão das atividades é de {}% e o nível de risco geral é {}.",
                    ctx.projects.len(),
                    active,
                    ctx.activities.len(),
                    format_number(kpis.completion_rate, 1),
                    kpis.risk_level.label(),
                )
            }
            ReportType::Users => {
                let delayed = ctx
                    .activities
                    .iter()
                    .filter(|a| a.status == ActivityStatus::Delayed)
                    .count();
                match ctx.workload.first() {
                    Some(top) => format!(
                        "{} responsável(is) distribuem {} atividade(s). A maior carga está com {}, \
                         com {} atividade(s) e conclusão média de {}%. Há {} atividade(s) atrasada(s) na equipe.",
                        ctx.workload.len(),
                        ctx.activities.len(),
                        top.responsible,
                        top.activity_count,
                        format_number(top.average_completion, 1),
                        delayed,
                    ),
                    None => "Nenhuma atividade atribuída a responsáveis até o momento.".to_string(),
                }
            }
            ReportType::Financial => {
                let budget: f64 = ctx.financials.iter().map(|f| f.budget).sum();
                format!(
                    "O orçamento total é de {}, com custo planejado de {} e custo real de {}. \
                     O CPI de {} e a variação de orçamento de {}% indicam nível de risco {}.",
                    format_currency(budget),
                    format_currency(ctx.totals.total_planned_cost),
                    format_currency(ctx.totals.total_actual_cost),
                    format_number(kpis.cpi, 2),
                    format_number(kpis.budget_variance, 1),
                    kpis.risk_level.label(),
                )
            }
            ReportType::General => format!(
                "O SPI de {} e o CPI de {} classificam o risco como {}. {} atividade(s) estão no caminho crítico \
                 e {}% das atividades foram concluídas.",
                format_number(kpis.spi, 2),
                format_number(kpis.cpi, 2),
                kpis.risk_level.label(),
                ctx.critical_path.critical_path_length,
                format_number(kpis.completion_rate, 1),
            ),
        };

        Self {
            text,
            source: ObservationSource::Fallback,
        }
    }
}
