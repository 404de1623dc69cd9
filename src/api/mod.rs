mod handlers;

use axum::{
    extract::FromRef,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::Database;
use crate::report::{NarrativeClient, ReportAssembler};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub reports: ReportAssembler,
    /// Fixed roadmap label year; `None` uses the current year.
    pub roadmap_year: Option<i32>,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            reports: ReportAssembler::new(NarrativeClient::from_config(&config.narrative)),
            roadmap_year: config.roadmap_year,
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/{id}", put(handlers::update_project))
        .route("/projects/{id}", delete(handlers::delete_project))
        .route("/projects/{id}/activities", get(handlers::list_project_activities))
        .route("/projects/{id}/activities", post(handlers::create_activity))
        .route("/projects/{id}/activities/import", post(handlers::import_activities))
        // Activities (by activity id)
        .route("/activities/{id}", get(handlers::get_activity))
        .route("/activities/{id}", put(handlers::update_activity))
        .route("/activities/{id}", delete(handlers::delete_activity))
        // Analytics
        .route("/kpis", get(handlers::get_portfolio_kpis))
        .route("/projects/{id}/kpis", get(handlers::get_project_kpis))
        .route("/projects/{id}/critical-path", get(handlers::get_critical_path))
        .route("/projects/{id}/roadmap", get(handlers::get_roadmap))
        .route("/projects/{id}/charts", post(handlers::build_project_chart))
        // Reports
        .route("/projects/{id}/reports/advanced", get(handlers::advanced_report))
        .route("/reports/{report_type}", get(handlers::simple_report))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
