//! Self-contained HTML rendering for the advanced dashboard report.
//!
//! Styling is embedded so the downloaded file opens offline.

use uuid::Uuid;

use crate::models::{KpiData, RiskLevel};

use super::{format_currency, format_number, Observations, ReportContext, ReportType, BRAND};

/// Render the advanced report for one dashboard.
pub fn render_advanced_html(
    report_type: ReportType,
    dashboard_id: Uuid,
    ctx: &ReportContext,
    observations: &Observations,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {brand}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {kpis}
        {projects}
        {critical_path}
        {roadmap}
        {activities}
        {observations}
        {footer}
    </div>
</body>
</html>"#,
        title = escape_html(report_type.title()),
        brand = escape_html(BRAND),
        css = inline_css(),
        header = render_header(report_type, dashboard_id, ctx),
        kpis = render_kpis(&ctx.kpis),
        projects = render_projects(ctx),
        critical_path = render_critical_path(ctx),
        roadmap = render_roadmap(ctx),
        activities = render_activities(ctx),
        observations = render_observations(observations),
        footer = render_footer(ctx),
    )
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn risk_class(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "risk-low",
        RiskLevel::Medium => "risk-medium",
        RiskLevel::High => "risk-high",
        RiskLevel::Critical => "risk-critical",
    }
}

fn render_header(report_type: ReportType, dashboard_id: Uuid, ctx: &ReportContext) -> String {
    format!(
        r#"<header>
            <h1>{title}</h1>
            <p class="meta">{brand} &middot; Dashboard {id} &middot; {projects} projeto(s), {activities} atividade(s)</p>
        </header>"#,
        title = escape_html(report_type.title()),
        brand = escape_html(BRAND),
        id = dashboard_id,
        projects = ctx.projects.len(),
        activities = ctx.activities.len(),
    )
}

fn render_kpis(kpis: &KpiData) -> String {
    let card = |label: &str, value: String| {
        format!(
            r#"<div class="card"><div class="label">{}</div><div class="value">{}</div></div>"#,
            escape_html(label),
            escape_html(&value)
        )
    };

    format!(
        r#"<section>
            <h2>Indicadores</h2>
            <div class="cards">
                {spi}{cpi}{completion}{budget}{schedule}
                <div class="card {risk_class}"><div class="label">Nível de risco</div><div class="value">{risk}</div></div>
            </div>
        </section>"#,
        spi = card("SPI", format_number(kpis.spi, 2)),
        cpi = card("CPI", format_number(kpis.cpi, 2)),
        completion = card(
            "Taxa de conclusão",
            format!("{}%", format_number(kpis.completion_rate, 1))
        ),
        budget = card(
            "Variação de orçamento",
            format!("{}%", format_number(kpis.budget_variance, 1))
        ),
        schedule = card(
            "Variação de prazo",
            format!("{}%", format_number(kpis.schedule_variance, 1))
        ),
        risk_class = risk_class(kpis.risk_level),
        risk = escape_html(kpis.risk_level.label()),
    )
}

fn render_projects(ctx: &ReportContext) -> String {
    let rows: String = if ctx.projects.is_empty() {
        r#"<tr><td colspan="4" class="empty">Nenhum projeto cadastrado.</td></tr>"#.to_string()
    } else {
        ctx.projects
            .iter()
            .map(|p| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&p.name),
                    escape_html(p.status.label()),
                    escape_html(&format_currency(p.budget)),
                    escape_html(p.description.as_deref().unwrap_or("-")),
                )
            })
            .collect()
    };

    format!(
        r#"<section>
            <h2>Projetos</h2>
            <table>
                <thead><tr><th>Projeto</th><th>Status</th><th>Orçamento</th><th>Descrição</th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        rows = rows,
    )
}

fn render_critical_path(ctx: &ReportContext) -> String {
    let analysis = &ctx.critical_path;
    let rows: String = if analysis.critical_path.is_empty() {
        r#"<tr><td colspan="4" class="empty">Nenhuma atividade crítica.</td></tr>"#.to_string()
    } else {
        analysis
            .critical_path
            .iter()
            .map(|entry| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&entry.name),
                    entry.early_start.format("%d/%m/%Y"),
                    entry.early_finish.format("%d/%m/%Y"),
                    entry.duration
                )
            })
            .collect()
    };

    format!(
        r#"<section>
            <h2>Caminho crítico</h2>
            <p>{count} atividade(s) crítica(s) &middot; maior duração de {duration} dia(s)</p>
            <table>
                <thead><tr><th>Atividade</th><th>Início</th><th>Término</th><th>Duração (dias)</th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        count = analysis.critical_path_length,
        duration = analysis.total_duration,
        rows = rows,
    )
}

fn render_roadmap(ctx: &ReportContext) -> String {
    let rows: String = ctx
        .roadmap
        .quarters
        .iter()
        .map(|q| {
            format!(
                r#"<tr><td>{}</td><td>{}</td><td>{}</td><td><div class="bar"><span style="width: {}%"></span></div> {}%</td></tr>"#,
                escape_html(&q.label),
                q.activity_count,
                q.milestone_count,
                q.completion_rate.clamp(0.0, 100.0),
                format_number(q.completion_rate, 1)
            )
        })
        .collect();

    format!(
        r#"<section>
            <h2>Roadmap {year}</h2>
            <table>
                <thead><tr><th>Trimestre</th><th>Atividades</th><th>Marcos</th><th>Conclusão</th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        year = ctx.roadmap.year,
        rows = rows,
    )
}

fn render_activities(ctx: &ReportContext) -> String {
    let rows: String = if ctx.activities.is_empty() {
        r#"<tr><td colspan="7" class="empty">Nenhuma atividade cadastrada.</td></tr>"#.to_string()
    } else {
        ctx.activities
            .iter()
            .map(|a| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&a.name),
                    escape_html(a.status.label()),
                    escape_html(a.priority.label()),
                    format_number(a.completion_percentage, 0),
                    escape_html(&format_currency(a.planned_cost)),
                    escape_html(&format_currency(a.actual_cost)),
                    escape_html(a.responsible.as_deref().unwrap_or("-")),
                )
            })
            .collect()
    };

    format!(
        r#"<section>
            <h2>Atividades</h2>
            <table>
                <thead><tr><th>Atividade</th><th>Status</th><th>Prioridade</th><th>Conclusão</th><th>Custo planejado</th><th>Custo real</th><th>Responsável</th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        rows = rows,
    )
}

fn render_observations(observations: &Observations) -> String {
    let paragraphs: String = observations
        .text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect();

    format!(
        r#"<section class="observations">
            <h2>Observações</h2>
            {paragraphs}
        </section>"#,
        paragraphs = paragraphs,
    )
}

fn render_footer(ctx: &ReportContext) -> String {
    format!(
        r#"<footer>Gerado em {} &middot; {}</footer>"#,
        ctx.generated_on.format("%d/%m/%Y"),
        escape_html(BRAND)
    )
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; color: #1f2937; background: #f3f4f6; line-height: 1.5; }
.container { max-width: 1100px; margin: 0 auto; padding: 32px 24px; }
header { border-bottom: 4px solid #0ea5e9; padding-bottom: 16px; margin-bottom: 24px; }
h1 { font-size: 28px; color: #0c4a6e; }
h2 { font-size: 20px; color: #0c4a6e; margin-bottom: 12px; }
.meta { color: #6b7280; font-size: 14px; }
section { background: #fff; border-radius: 8px; padding: 20px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 12px; }
.card { border: 1px solid #e5e7eb; border-radius: 6px; padding: 12px; }
.card .label { font-size: 12px; color: #6b7280; text-transform: uppercase; }
.card .value { font-size: 22px; font-weight: 600; }
.risk-low { border-color: #10b981; color: #047857; }
.risk-medium { border-color: #f59e0b; color: #b45309; }
.risk-high { border-color: #f97316; color: #c2410c; }
.risk-critical { border-color: #ef4444; color: #b91c1c; }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e5e7eb; }
th { background: #f9fafb; font-weight: 600; }
td.empty { color: #9ca3af; text-align: center; }
.bar { display: inline-block; width: 120px; height: 8px; background: #e5e7eb; border-radius: 4px; overflow: hidden; vertical-align: middle; }
.bar span { display: block; height: 100%; background: #0ea5e9; }
.observations p { margin-bottom: 8px; }
footer { text-align: center; color: #9ca3af; font-size: 12px; margin-top: 24px; }
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, ProjectStatus};
    use crate::report::ObservationSource;
    use chrono::{NaiveDate, Utc};

    fn context(projects: Vec<Project>) -> ReportContext {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        ReportContext::build(projects, Vec::new(), today, 2025)
    }

    fn observations() -> Observations {
        Observations {
            text: "Tudo certo.".to_string(),
            source: ObservationSource::Generated,
        }
    }

    #[test]
    fn lists_projects_with_status_budget_and_description() {
        let project = Project {
            id: Uuid::new_v4(),
            name: "Ala <Norte>".to_string(),
            description: Some("Reforma das piscinas".to_string()),
            status: ProjectStatus::OnHold,
            budget: 12_500.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = project.id;
        let html = render_advanced_html(
            ReportType::Projects,
            id,
            &context(vec![project]),
            &observations(),
        );

        assert!(html.contains("<h2>Projetos</h2>"));
        assert!(html.contains(&format!(
            "<tr><td>Ala &lt;Norte&gt;</td><td>{}</td><td>R$ 12.500,00</td><td>Reforma das piscinas</td></tr>",
            ProjectStatus::OnHold.label()
        )));
    }

    #[test]
    fn empty_project_list_has_placeholder_row() {
        let html = render_advanced_html(
            ReportType::General,
            Uuid::new_v4(),
            &context(Vec::new()),
            &observations(),
        );
        assert!(html.contains("Nenhum projeto cadastrado."));
        assert!(html.contains("<p>Tudo certo.</p>"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Obra" & 'Cia'</b>"#),
            "&lt;b&gt;&quot;Obra&quot; &amp; &#39;Cia&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn risk_classes_are_distinct() {
        let classes = [
            risk_class(RiskLevel::Low),
            risk_class(RiskLevel::Medium),
            risk_class(RiskLevel::High),
            risk_class(RiskLevel::Critical),
        ];
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
