use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tosabendo::api::{create_router, AppState};
use tosabendo::config::Config;
use tosabendo::db::Database;
use tosabendo::models::*;
use tosabendo::report::{NarrativeClient, ObservationSource, ReportAssembler, ReportContext, ReportType};

fn setup_with(config: Config) -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(AppState::new(db, &config));
    TestServer::new(app).expect("Failed to create test server")
}

fn setup() -> TestServer {
    setup_with(Config::disabled())
}

async fn create_test_project(server: &TestServer) -> Project {
    server
        .post("/api/v1/projects")
        .json(&CreateProjectInput {
            name: "Test Project".to_string(),
            budget: Some(10_000.0),
            status: Some(ProjectStatus::Active),
            ..Default::default()
        })
        .await
        .json::<Project>()
}

async fn create_activity(server: &TestServer, project: &Project, input: Value) -> Activity {
    let response = server
        .post(&format!("/api/v1/projects/{}/activities", project.id))
        .json(&input)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Activity>()
}

/// The two-activity portfolio: SPI 1.5, CPI 0.75, critical risk.
async fn seed_worked_example(server: &TestServer, project: &Project) {
    create_activity(
        server,
        project,
        json!({
            "name": "Terraplanagem",
            "status": "completed",
            "planned_cost": 1000.0,
            "actual_cost": 800.0,
            "completion_percentage": 100.0,
            "planned_start_date": "2025-02-03",
            "responsible": "Ana"
        }),
    )
    .await;
    create_activity(
        server,
        project,
        json!({
            "name": "Fundações",
            "status": "in_progress",
            "priority": "critical",
            "planned_cost": 1000.0,
            "actual_cost": 1200.0,
            "completion_percentage": 50.0,
            "planned_start_date": "2025-05-12",
            "planned_duration": 20,
            "is_milestone": true,
            "responsible": "Bruno"
        }),
    )
    .await;
}

/// Serve `app` on an ephemeral local port and return its `/observations` URL.
async fn spawn_service(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/observations", addr)
}

/// Stand-in for the narrative service. Records the last request body.
async fn spawn_narrative_service(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Option<Value>>>) {
    let received: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let seen = received.clone();
    let app = Router::new().route(
        "/observations",
        post(move |Json(body): Json<Value>| {
            let reply = reply.clone();
            let seen = seen.clone();
            async move {
                *seen.lock().unwrap() = Some(body);
                (status, Json(reply))
            }
        }),
    );

    (spawn_service(app).await, received)
}

fn narrative_config(url: String, timeout: Duration) -> Config {
    let mut config = Config::with_narrative_url(url);
    config.narrative.timeout = timeout;
    config
}

fn empty_context() -> ReportContext {
    let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    ReportContext::build(Vec::new(), Vec::new(), today, 2025)
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn creates_and_fetches_a_project() {
        let server = setup();
        let project = create_test_project(&server).await;
        assert_eq!(project.budget, 10_000.0);

        let response = server.get(&format!("/api/v1/projects/{}", project.id)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Project>().name, "Test Project");
    }

    #[tokio::test]
    async fn rejects_invalid_project() {
        let server = setup();
        let response = server
            .post("/api/v1/projects")
            .json(&json!({ "name": "", "budget": 10.0 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn updates_and_deletes_a_project() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .put(&format!("/api/v1/projects/{}", project.id))
            .json(&json!({ "status": "completed" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Project>().status, ProjectStatus::Completed);

        server
            .delete(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lists_projects() {
        let server = setup();
        create_test_project(&server).await;
        let projects: Vec<Project> = server.get("/api/v1/projects").await.json();
        assert_eq!(projects.len(), 1);
    }
}

mod activities {
    use super::*;

    #[tokio::test]
    async fn creates_lists_updates_and_deletes() {
        let server = setup();
        let project = create_test_project(&server).await;
        let activity = create_activity(&server, &project, json!({ "name": "Drenagem" })).await;
        assert_eq!(activity.status, ActivityStatus::NotStarted);

        let listed: Vec<Activity> = server
            .get(&format!("/api/v1/projects/{}/activities", project.id))
            .await
            .json();
        assert_eq!(listed.len(), 1);

        let response = server
            .put(&format!("/api/v1/activities/{}", activity.id))
            .json(&json!({ "status": "delayed", "completion_percentage": 30.0 }))
            .await;
        response.assert_status_ok();
        let updated: Activity = response.json();
        assert_eq!(updated.status, ActivityStatus::Delayed);
        assert_eq!(updated.completion_percentage, 30.0);

        server
            .delete(&format!("/api/v1/activities/{}", activity.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/activities/{}", activity.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_invalid_completion() {
        let server = setup();
        let project = create_test_project(&server).await;
        let response = server
            .post(&format!("/api/v1/projects/{}/activities", project.id))
            .json(&json!({ "name": "Excesso", "completion_percentage": 140.0 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("completion_percentage"));
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_project() {
        let server = setup();
        let response = server
            .post(&format!("/api/v1/projects/{}/activities", uuid::Uuid::new_v4()))
            .json(&json!({ "name": "Órfã" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn imports_activities_from_csv() {
        let server = setup();
        let project = create_test_project(&server).await;
        let csv = "name,status,planned_cost,planned_start_date,responsible\n\
                   Escavação,completed,\"1.000,00\",2025-01-15,Ana\n\
                   Alvenaria,in_progress,2500,01/04/2025,\n";

        let response = server
            .post(&format!("/api/v1/projects/{}/activities/import", project.id))
            .text(csv)
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Vec<Activity> = response.json();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].planned_cost, 1000.0);
        assert!(created[1].responsible.is_none());

        let listed: Vec<Activity> = server
            .get(&format!("/api/v1/projects/{}/activities", project.id))
            .await
            .json();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn rejects_invalid_csv_without_storing_anything() {
        let server = setup();
        let project = create_test_project(&server).await;
        let csv = "name,status\nBoa,completed\nRuim,finished\n";

        let response = server
            .post(&format!("/api/v1/projects/{}/activities/import", project.id))
            .text(csv)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Line 3"));

        let listed: Vec<Activity> = server
            .get(&format!("/api/v1/projects/{}/activities", project.id))
            .await
            .json();
        assert!(listed.is_empty());
    }
}

mod analytics {
    use super::*;

    #[tokio::test]
    async fn computes_project_kpis() {
        let server = setup();
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let response = server.get(&format!("/api/v1/projects/{}/kpis", project.id)).await;
        response.assert_status_ok();
        let kpis: KpiData = response.json();
        assert_eq!(kpis.spi, 1.5);
        assert_eq!(kpis.cpi, 0.75);
        assert_eq!(kpis.completion_rate, 50.0);
        assert_eq!(kpis.risk_level, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn empty_project_has_zero_kpis() {
        let server = setup();
        let project = create_test_project(&server).await;

        let kpis: KpiData = server
            .get(&format!("/api/v1/projects/{}/kpis", project.id))
            .await
            .json();
        assert_eq!(kpis, KpiData::default());
        assert_eq!(kpis.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn computes_portfolio_kpis_across_projects() {
        let server = setup();
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let kpis: KpiData = server.get("/api/v1/kpis").await.json();
        assert_eq!(kpis.spi, 1.5);
    }

    #[tokio::test]
    async fn flags_critical_path() {
        let server = setup();
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let analysis: CriticalPathAnalysis = server
            .get(&format!("/api/v1/projects/{}/critical-path", project.id))
            .await
            .json();
        assert_eq!(analysis.activities.len(), 2);
        assert_eq!(analysis.critical_path_length, 1);
        assert_eq!(analysis.critical_path[0].name, "Fundações");
        assert_eq!(analysis.total_duration, 20);
    }

    #[tokio::test]
    async fn builds_roadmap_for_requested_year() {
        let server = setup();
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let roadmap: Roadmap = server
            .get(&format!("/api/v1/projects/{}/roadmap?year=2025", project.id))
            .await
            .json();
        assert_eq!(roadmap.year, 2025);
        assert_eq!(roadmap.quarters[0].activity_count, 1);
        assert_eq!(roadmap.quarters[0].completion_rate, 100.0);
        assert_eq!(roadmap.quarters[1].milestone_count, 1);
        assert_eq!(roadmap.quarters[1].label, "Q2 2025");
    }

    #[tokio::test]
    async fn builds_custom_chart() {
        let server = setup();
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/charts", project.id))
            .json(&json!({
                "title": "Custo real por responsável",
                "x_field": "responsible",
                "y_field": "actual_cost",
                "aggregation": "sum"
            }))
            .await;
        response.assert_status_ok();
        let series: ChartSeries = response.json();
        assert_eq!(
            series.points,
            vec![
                ChartPoint { label: "Ana".into(), value: 800.0 },
                ChartPoint { label: "Bruno".into(), value: 1200.0 },
            ]
        );
    }

    #[tokio::test]
    async fn rejects_invalid_chart_spec() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/charts", project.id))
            .json(&json!({ "x_field": "status", "y_field": "count", "aggregation": "avg" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post(&format!("/api/v1/projects/{}/charts", project.id))
            .json(&json!({ "x_field": "colour", "y_field": "count", "aggregation": "count" }))
            .await;
        assert!(response.status_code().is_client_error());
    }
}

mod reports {
    use super::*;

    #[tokio::test]
    async fn advanced_report_downloads_html_with_fallback_observations() {
        let server = setup();
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let response = server
            .get(&format!(
                "/api/v1/projects/{}/reports/advanced?type=financial",
                project.id
            ))
            .await;
        response.assert_status_ok();

        let disposition = response.header("content-disposition");
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with(&format!(
            "attachment; filename=\"relatorio-financial-dashboard-{}-",
            project.id
        )));
        assert!(disposition.ends_with(".html\""));

        let body = response.text();
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("Relatório Financeiro"));
        assert!(body.contains("Fundações"));
        assert!(body.contains("O orçamento total é de R$ 10.000,00"));
    }

    #[tokio::test]
    async fn advanced_report_uses_generated_observations() {
        let (url, received) = spawn_narrative_service(
            StatusCode::OK,
            json!({ "observations": "Projeto dentro do prazo, atenção aos custos." }),
        )
        .await;
        let server = setup_with(Config::with_narrative_url(url));
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let response = server
            .get(&format!("/api/v1/projects/{}/reports/advanced", project.id))
            .await;
        response.assert_status_ok();
        assert!(response
            .text()
            .contains("Projeto dentro do prazo, atenção aos custos."));

        let payload = received.lock().unwrap().clone().expect("service was not called");
        assert_eq!(payload["reportType"], "general");
        assert_eq!(payload["data"]["kpis"]["cpi"], 0.75);
        assert_eq!(payload["data"]["criticalPath"].as_array().unwrap().len(), 1);
        assert_eq!(payload["data"]["activities"].as_array().unwrap().len(), 2);
        assert_eq!(payload["data"]["projects"][0]["name"], "Test Project");
    }

    #[tokio::test]
    async fn service_error_falls_back_to_template() {
        let (url, _) = spawn_narrative_service(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "quota exceeded" }),
        )
        .await;
        let server = setup_with(Config::with_narrative_url(url));
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let response = server
            .get(&format!("/api/v1/projects/{}/reports/advanced?type=general", project.id))
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("O SPI de 1,50 e o CPI de 0,75"));
    }

    #[tokio::test]
    async fn simple_report_downloads_paginated_text() {
        let server = setup();
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let response = server.get("/api/v1/reports/users").await;
        response.assert_status_ok();

        let disposition = response.header("content-disposition");
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"relatorio-users-"));
        assert!(disposition.ends_with(".txt\""));

        let body = response.text();
        assert!(body.starts_with("BeachPark – Tô Sabendo | Relatório de Usuários"));
        assert!(body.contains("- Ana"));
        assert!(body.contains("- Bruno"));
        assert!(body.contains("## Observações"));
        assert!(body.contains("Página 1 de 1"));
    }

    #[tokio::test]
    async fn simple_report_rejects_unknown_type() {
        let server = setup();
        let response = server.get("/api/v1/reports/advanced").await;
        assert!(response.status_code().is_client_error());
    }
}

mod narrative_fallback {
    use super::*;

    #[tokio::test]
    async fn hung_service_times_out_to_fallback() {
        let app = Router::new().route(
            "/observations",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "observations": "tarde demais" }))
            }),
        );
        let url = spawn_service(app).await;
        let config = narrative_config(url, Duration::from_secs(1));
        let assembler = ReportAssembler::new(NarrativeClient::from_config(&config.narrative));

        let ctx = empty_context();
        let observations = assembler.observations(ReportType::General, &ctx).await;
        assert_eq!(observations.source, ObservationSource::Fallback);
        assert!(!observations.text.trim().is_empty());
        assert!(!observations.text.contains("tarde demais"));
    }

    #[tokio::test]
    async fn blank_observations_fall_back() {
        let (url, _) =
            spawn_narrative_service(StatusCode::OK, json!({ "observations": "   " })).await;
        let config = narrative_config(url, Duration::from_secs(5));

        let assembler = ReportAssembler::new(NarrativeClient::from_config(&config.narrative));
        let ctx = empty_context();
        let observations = assembler.observations(ReportType::Projects, &ctx).await;
        assert_eq!(observations.source, ObservationSource::Fallback);

        let server = setup_with(config);
        let project = create_test_project(&server).await;
        seed_worked_example(&server, &project).await;

        let response = server
            .get(&format!("/api/v1/projects/{}/reports/advanced", project.id))
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("O SPI de 1,50 e o CPI de 0,75"));
    }

    #[tokio::test]
    async fn malformed_success_body_falls_back() {
        let app = Router::new().route(
            "/observations",
            post(|| async { (StatusCode::OK, "isto não é json") }),
        );
        let url = spawn_service(app).await;
        let config = narrative_config(url, Duration::from_secs(5));

        let assembler = ReportAssembler::new(NarrativeClient::from_config(&config.narrative));
        let ctx = empty_context();
        let observations = assembler.observations(ReportType::Financial, &ctx).await;
        assert_eq!(observations.source, ObservationSource::Fallback);
        assert!(observations.text.starts_with("O orçamento total é de R$ 0,00"));
    }
}
