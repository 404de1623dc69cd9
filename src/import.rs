//! CSV import of activities.
//!
//! The first row names the columns; only `name` is required. Recognised
//! columns are `name`, `status`, `priority`, `planned_cost`, `actual_cost`,
//! `completion_percentage`, `planned_start_date`, `actual_start_date`,
//! `planned_duration`, `is_milestone`, `responsible` and `discipline`.
//! Anything else is ignored. Numbers may use a decimal comma (`1.234,56`);
//! dots followed by groups of three digits are thousands (`1.500`). Dates
//! may be ISO (`2025-03-01`) or day-first (`01/03/2025`).

use std::collections::HashMap;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use crate::models::{ActivityStatus, CreateActivityInput, Priority};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("No activity rows found")]
    Empty,

    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidValue {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("Line {line}: {message}")]
    InvalidRow { line: u64, message: String },
}

struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.0
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Parse CSV text into activity inputs. Any invalid row fails the whole import.
pub fn parse_activities_csv(text: &str) -> Result<Vec<CreateActivityInput>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = Columns::from_headers(reader.headers()?);
    if !columns.0.contains_key("name") {
        return Err(ImportError::MissingColumn("name"));
    }

    let mut inputs = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let input = parse_row(&columns, &record, line)?;
        input
            .validate()
            .map_err(|message| ImportError::InvalidRow { line, message })?;
        inputs.push(input);
    }

    if inputs.is_empty() {
        return Err(ImportError::Empty);
    }

    tracing::debug!(rows = inputs.len(), "Parsed activity CSV");
    Ok(inputs)
}

fn parse_row(
    columns: &Columns,
    record: &StringRecord,
    line: u64,
) -> Result<CreateActivityInput, ImportError> {
    let invalid = |field: &'static str, value: &str| ImportError::InvalidValue {
        line,
        field,
        value: value.to_string(),
    };

    let number = |field: &'static str| -> Result<Option<f64>, ImportError> {
        columns
            .get(record, field)
            .map(|v| parse_number(v).ok_or_else(|| invalid(field, v)))
            .transpose()
    };
    let date = |field: &'static str| -> Result<Option<NaiveDate>, ImportError> {
        columns
            .get(record, field)
            .map(|v| parse_date(v).ok_or_else(|| invalid(field, v)))
            .transpose()
    };
    let text = |field: &str| columns.get(record, field).map(str::to_string);

    let status = columns
        .get(record, "status")
        .map(|v| ActivityStatus::from_str(&v.to_lowercase()).ok_or_else(|| invalid("status", v)))
        .transpose()?;
    let priority = columns
        .get(record, "priority")
        .map(|v| Priority::from_str(&v.to_lowercase()).ok_or_else(|| invalid("priority", v)))
        .transpose()?;
    let planned_duration = columns
        .get(record, "planned_duration")
        .map(|v| v.parse::<u32>().map_err(|_| invalid("planned_duration", v)))
        .transpose()?;
    let is_milestone = columns
        .get(record, "is_milestone")
        .map(|v| parse_bool(v).ok_or_else(|| invalid("is_milestone", v)))
        .transpose()?
        .unwrap_or(false);

    Ok(CreateActivityInput {
        name: text("name").unwrap_or_default(),
        status,
        priority,
        planned_cost: number("planned_cost")?,
        actual_cost: number("actual_cost")?,
        completion_percentage: number("completion_percentage")?,
        planned_start_date: date("planned_start_date")?,
        actual_start_date: date("actual_start_date")?,
        planned_duration,
        is_milestone,
        responsible: text("responsible"),
        discipline: text("discipline"),
    })
}

/// Accepts `1234.5`, `1234,5`, `1.234,56` and grouped thousands like `1.500`.
fn parse_number(value: &str) -> Option<f64> {
    let normalized = if value.contains(',') {
        value.replace('.', "").replace(',', ".")
    } else if is_grouped_thousands(value) {
        value.replace('.', "")
    } else {
        value.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `1.500`, `12.345.678`: dot-separated groups of three after a leading
/// group of one to three digits that does not start with zero.
fn is_grouped_thousands(value: &str) -> bool {
    let mut groups = value.split('.');
    let head = groups.next().unwrap_or_default();
    let all_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());

    let mut tail = groups.peekable();
    tail.peek().is_some()
        && all_digits(head)
        && head.len() <= 3
        && !head.starts_with('0')
        && tail.all(|g| g.len() == 3 && all_digits(g))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "sim" | "x" => Some(true),
        "false" | "0" | "no" | "não" | "nao" => Some(false),
        _ => None,
    }
}
