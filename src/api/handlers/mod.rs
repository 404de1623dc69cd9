use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::analytics;
use crate::db::Database;
use crate::import;
use crate::models::*;
use crate::report::{ReportContext, ReportFile, ReportType};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
///
/// Validation errors raised by the store (invalid amounts, blank names,
/// missing parents) are safe to expose and are returned as BAD_REQUEST.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();

    if msg.starts_with("Invalid") || msg.contains("must not be empty") || msg.contains("not found")
    {
        tracing::warn!("Validation error: {}", msg);
        return (StatusCode::BAD_REQUEST, msg);
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn bad_request(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();
    tracing::warn!("Validation error: {}", msg);
    (StatusCode::BAD_REQUEST, msg)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Load a project and its activities, or 404.
fn load_project(
    db: &Database,
    id: Uuid,
) -> Result<(Project, Vec<Activity>), (StatusCode, String)> {
    let project = db
        .get_project(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))?;
    let activities = db.get_activities_by_project(id).map_err(internal_error)?;
    Ok((project, activities))
}

fn attachment(file: ReportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response()
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(
    State(db): State<Database>,
) -> Result<Json<Vec<Project>>, (StatusCode, String)> {
    db.get_all_projects().map(Json).map_err(internal_error)
}

pub async fn get_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, (StatusCode, String)> {
    db.get_project(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

pub async fn create_project(
    State(db): State<Database>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    input.validate().map_err(bad_request)?;
    db.create_project(input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn update_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, (StatusCode, String)> {
    input.validate().map_err(bad_request)?;
    db.update_project(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

pub async fn delete_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_project(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Project not found".to_string()))
    }
}

// ============================================================
// Activities
// ============================================================

pub async fn list_project_activities(
    State(db): State<Database>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Activity>>, (StatusCode, String)> {
    let (_, activities) = load_project(&db, project_id)?;
    Ok(Json(activities))
}

pub async fn create_activity(
    State(db): State<Database>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<CreateActivityInput>,
) -> Result<(StatusCode, Json<Activity>), (StatusCode, String)> {
    input.validate().map_err(bad_request)?;
    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))?;

    db.create_activity(project_id, input)
        .map(|a| (StatusCode::CREATED, Json(a)))
        .map_err(internal_error)
}

/// Bulk-create activities from a CSV body. The import is all-or-nothing.
pub async fn import_activities(
    State(db): State<Database>,
    Path(project_id): Path<Uuid>,
    body: String,
) -> Result<(StatusCode, Json<Vec<Activity>>), (StatusCode, String)> {
    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))?;

    let inputs = import::parse_activities_csv(&body).map_err(bad_request)?;
    let created = db
        .create_activities(project_id, inputs)
        .map_err(internal_error)?;

    tracing::info!(
        project_id = %project_id,
        count = created.len(),
        "Imported activities from CSV"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_activity(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, (StatusCode, String)> {
    db.get_activity(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Activity not found".to_string()))
}

pub async fn update_activity(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateActivityInput>,
) -> Result<Json<Activity>, (StatusCode, String)> {
    input.validate().map_err(bad_request)?;
    db.update_activity(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Activity not found".to_string()))
}

pub async fn delete_activity(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_activity(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Activity not found".to_string()))
    }
}

// ============================================================
// Analytics
// ============================================================

pub async fn get_portfolio_kpis(
    State(db): State<Database>,
) -> Result<Json<KpiData>, (StatusCode, String)> {
    let activities = db.get_all_activities().map_err(internal_error)?;
    Ok(Json(analytics::compute_kpis(&activities)))
}

pub async fn get_project_kpis(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<KpiData>, (StatusCode, String)> {
    let (_, activities) = load_project(&db, id)?;
    Ok(Json(analytics::compute_kpis(&activities)))
}

pub async fn get_critical_path(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<CriticalPathAnalysis>, (StatusCode, String)> {
    let (_, activities) = load_project(&db, id)?;
    Ok(Json(analytics::analyze_critical_path(&activities, today())))
}

/// Query parameters for the roadmap.
#[derive(Debug, Deserialize)]
pub struct RoadmapQuery {
    pub year: Option<i32>,
}

pub async fn get_roadmap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RoadmapQuery>,
) -> Result<Json<Roadmap>, (StatusCode, String)> {
    let (_, activities) = load_project(&state.db, id)?;
    let year = query
        .year
        .or(state.roadmap_year)
        .unwrap_or_else(|| today().year());
    Ok(Json(analytics::build_roadmap(&activities, year)))
}

pub async fn build_project_chart(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(spec): Json<ChartSpec>,
) -> Result<Json<ChartSeries>, (StatusCode, String)> {
    spec.validate().map_err(bad_request)?;
    let (_, activities) = load_project(&db, id)?;
    analytics::build_chart(&activities, &spec)
        .map(Json)
        .map_err(bad_request)
}

// ============================================================
// Reports
// ============================================================

/// Query parameters for the advanced report.
#[derive(Debug, Deserialize)]
pub struct AdvancedReportQuery {
    #[serde(rename = "type")]
    pub report_type: Option<ReportType>,
}

/// HTML report for one project dashboard, sent as a download.
pub async fn advanced_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AdvancedReportQuery>,
) -> Result<Response, (StatusCode, String)> {
    let (project, activities) = load_project(&state.db, id)?;
    let report_type = query.report_type.unwrap_or(ReportType::General);
    let generated_on = today();
    let year = state.roadmap_year.unwrap_or_else(|| generated_on.year());

    let ctx = ReportContext::build(vec![project], activities, generated_on, year);
    let file = state.reports.advanced_report(report_type, id, &ctx).await;

    tracing::info!(
        report_type = report_type.as_str(),
        filename = %file.filename,
        "Generated advanced report"
    );
    Ok(attachment(file))
}

/// Paginated text report across every project, sent as a download.
pub async fn simple_report(
    State(state): State<AppState>,
    Path(report_type): Path<ReportType>,
) -> Result<Response, (StatusCode, String)> {
    let projects = state.db.get_all_projects().map_err(internal_error)?;
    let activities = state.db.get_all_activities().map_err(internal_error)?;
    let generated_on = today();
    let year = state.roadmap_year.unwrap_or_else(|| generated_on.year());

    let ctx = ReportContext::build(projects, activities, generated_on, year);
    let file = state.reports.simple_report(report_type, &ctx).await;

    tracing::info!(
        report_type = report_type.as_str(),
        filename = %file.filename,
        "Generated report"
    );
    Ok(attachment(file))
}
