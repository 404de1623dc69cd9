//! Paginated text documents for the per-type reports.
//!
//! Layout works on an A4 page measured in millimetres: every element
//! advances a vertical cursor, and once the next element would pass
//! [`PAGE_BREAK_Y`] a new page starts below the header.

use crate::analytics;
use crate::models::{Activity, ActivityStatus};

use super::{format_currency, format_number, Observations, ReportContext, ReportType};

/// Product name printed in every page header.
pub const BRAND: &str = "BeachPark – Tô Sabendo";

/// Vertical position (mm) past which content moves to a new page.
pub const PAGE_BREAK_Y: f64 = 270.0;
/// Where content starts on a fresh page, below the header (mm).
pub const CONTENT_TOP_Y: f64 = 30.0;
/// Maximum characters per line before paragraphs wrap.
pub const LINE_WIDTH: usize = 90;

const TITLE_HEIGHT: f64 = 12.0;
const SECTION_HEIGHT: f64 = 10.0;
const LINE_HEIGHT: f64 = 6.0;
const GAP_HEIGHT: f64 = 4.0;

const PAGE_SEPARATOR: char = '\u{0C}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
}

/// A finished document: a title and its pages in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub generated_on: String,
    pub pages: Vec<Page>,
}

impl Document {
    /// Render as plain text. Every page gets the same header and a page
    /// counter footer; pages are separated by a form feed.
    pub fn render(&self) -> String {
        let total = self.pages.len();
        let rule = "=".repeat(LINE_WIDTH);
        self.pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let mut out = String::new();
                out.push_str(&format!("{} | {}\n", BRAND, self.title));
                out.push_str(&format!("Gerado em {}\n", self.generated_on));
                out.push_str(&rule);
                out.push('\n');
                for line in &page.lines {
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str(&rule);
                out.push('\n');
                out.push_str(&format!("Página {} de {}\n", index + 1, total));
                out
            })
            .collect::<Vec<_>>()
            .join(&PAGE_SEPARATOR.to_string())
    }
}

/// Builds a [`Document`] line by line, breaking pages at [`PAGE_BREAK_Y`].
#[derive(Debug)]
pub struct DocumentBuilder {
    title: String,
    generated_on: String,
    pages: Vec<Page>,
    cursor_y: f64,
}

impl DocumentBuilder {
    pub fn new(title: impl Into<String>, generated_on: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_on: generated_on.into(),
            pages: vec![Page { lines: Vec::new() }],
            cursor_y: CONTENT_TOP_Y,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page { lines: Vec::new() });
        self.cursor_y = CONTENT_TOP_Y;
    }

    fn push(&mut self, line: String, height: f64) {
        if self.cursor_y + height > PAGE_BREAK_Y {
            self.new_page();
        }
        self.cursor_y += height;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
    }

    /// Report heading, in capitals.
    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.push(text.to_uppercase(), TITLE_HEIGHT);
        self
    }

    /// Section heading. A section never starts on the last line of a page.
    pub fn section(&mut self, text: &str) -> &mut Self {
        if self.cursor_y + GAP_HEIGHT + SECTION_HEIGHT + LINE_HEIGHT > PAGE_BREAK_Y {
            self.new_page();
        } else {
            self.push(String::new(), GAP_HEIGHT);
        }
        self.push(format!("## {}", text), SECTION_HEIGHT);
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(text.into(), LINE_HEIGHT);
        self
    }

    pub fn field(&mut self, label: &str, value: impl AsRef<str>) -> &mut Self {
        self.line(format!("  {}: {}", label, value.as_ref()))
    }

    /// Word-wrapped paragraph.
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        for line in wrap(text, LINE_WIDTH) {
            self.line(line);
        }
        self
    }

    pub fn finish(self) -> Document {
        Document {
            title: self.title,
            generated_on: self.generated_on,
            pages: self.pages,
        }
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay out the simple report for a report type.
pub fn build_document(
    report_type: ReportType,
    ctx: &ReportContext,
    observations: &Observations,
) -> Document {
    let mut doc = DocumentBuilder::new(
        report_type.title(),
        ctx.generated_on.format("%d/%m/%Y").to_string(),
    );
    doc.heading(report_type.title());

    match report_type {
        ReportType::Projects => projects_sections(&mut doc, ctx),
        ReportType::Users => users_sections(&mut doc, ctx),
        ReportType::Financial => financial_sections(&mut doc, ctx),
        ReportType::General => general_sections(&mut doc, ctx),
    }

    doc.section("Observações");
    doc.paragraph(&observations.text);
    doc.finish()
}

fn kpi_fields(doc: &mut DocumentBuilder, ctx: &ReportContext) {
    let kpis = &ctx.kpis;
    doc.field("SPI", format_number(kpis.spi, 2))
        .field("CPI", format_number(kpis.cpi, 2))
        .field("Taxa de conclusão", format!("{}%", format_number(kpis.completion_rate, 1)))
        .field("Variação de orçamento", format!("{}%", format_number(kpis.budget_variance, 1)))
        .field("Variação de prazo", format!("{}%", format_number(kpis.schedule_variance, 1)))
        .field("Nível de risco", kpis.risk_level.label());
}

fn projects_sections(doc: &mut DocumentBuilder, ctx: &ReportContext) {
    doc.section("Resumo");
    doc.field("Projetos", ctx.projects.len().to_string())
        .field("Atividades", ctx.activities.len().to_string());
    kpi_fields(doc, ctx);

    doc.section("Projetos");
    if ctx.projects.is_empty() {
        doc.line("Nenhum projeto cadastrado.");
    }
    for project in &ctx.projects {
        let owned: Vec<Activity> = ctx
            .activities
            .iter()
            .filter(|a| a.project_id == project.id)
            .cloned()
            .collect();
        let kpis = analytics::compute_kpis(&owned);
        doc.line(format!("- {}", project.name));
        doc.field("Status", project.status.label())
            .field("Orçamento", format_currency(project.budget))
            .field("Atividades", owned.len().to_string())
            .field("Conclusão", format!("{}%", format_number(kpis.completion_rate, 1)))
            .field("Risco", kpis.risk_level.label());
        if let Some(description) = project.description.as_deref().filter(|d| !d.trim().is_empty()) {
            for line in wrap(description, LINE_WIDTH - 4) {
                doc.line(format!("    {}", line));
            }
        }
    }
}

fn users_sections(doc: &mut DocumentBuilder, ctx: &ReportContext) {
    doc.section("Carga por responsável");
    if ctx.workload.is_empty() {
        doc.line("Nenhuma atividade cadastrada.");
    }
    for entry in &ctx.workload {
        doc.line(format!("- {}", entry.responsible));
        doc.field("Atividades", entry.activity_count.to_string())
            .field("Concluídas", entry.completed_count.to_string())
            .field("Atrasadas", entry.delayed_count.to_string())
            .field("Críticas", entry.critical_count.to_string())
            .field("Conclusão média", format!("{}%", format_number(entry.average_completion, 1)))
            .field("Custo planejado", format_currency(entry.planned_cost));
    }
}

fn financial_sections(doc: &mut DocumentBuilder, ctx: &ReportContext) {
    let budget: f64 = ctx.financials.iter().map(|f| f.budget).sum();
    doc.section("Resumo financeiro");
    doc.field("Orçamento total", format_currency(budget))
        .field("Custo planejado", format_currency(ctx.totals.total_planned_cost))
        .field("Custo real", format_currency(ctx.totals.total_actual_cost))
        .field("Valor planejado (PV)", format_currency(ctx.totals.planned_value))
        .field("Valor agregado (EV)", format_currency(ctx.totals.earned_value));
    kpi_fields(doc, ctx);

    doc.section("Por projeto");
    if ctx.financials.is_empty() {
        doc.line("Nenhum projeto cadastrado.");
    }
    for row in &ctx.financials {
        doc.line(format!("- {}", row.project_name));
        doc.field("Orçamento", format_currency(row.budget))
            .field("Custo planejado", format_currency(row.planned_cost))
            .field("Custo real", format_currency(row.actual_cost))
            .field("Saldo", format_currency(row.remaining_budget))
            .field("Consumo do orçamento", format!("{}%", format_number(row.budget_consumption, 1)))
            .field("CPI", format_number(row.cpi, 2));
    }
}

fn general_sections(doc: &mut DocumentBuilder, ctx: &ReportContext) {
    doc.section("Indicadores");
    kpi_fields(doc, ctx);

    doc.section("Status das atividades");
    for status in [
        ActivityStatus::NotStarted,
        ActivityStatus::InProgress,
        ActivityStatus::Completed,
        ActivityStatus::Delayed,
        ActivityStatus::Cancelled,
    ] {
        let count = ctx.activities.iter().filter(|a| a.status == status).count();
        doc.field(status.label(), count.to_string());
    }

    doc.section("Caminho crítico");
    doc.field(
        "Atividades críticas",
        ctx.critical_path.critical_path_length.to_string(),
    )
    .field(
        "Maior duração",
        format!("{} dia(s)", ctx.critical_path.total_duration),
    );
    for entry in &ctx.critical_path.critical_path {
        doc.line(format!(
            "  - {} ({} a {}, {} dia(s))",
            entry.name,
            entry.early_start.format("%d/%m/%Y"),
            entry.early_finish.format("%d/%m/%Y"),
            entry.duration
        ));
    }

    doc.section(&format!("Roadmap {}", ctx.roadmap.year));
    for quarter in &ctx.roadmap.quarters {
        doc.line(format!(
            "  {}: {} atividade(s), {} marco(s), {}% concluído",
            quarter.label,
            quarter.activity_count,
            quarter.milestone_count,
            format_number(quarter.completion_rate, 1)
        ));
    }
}
