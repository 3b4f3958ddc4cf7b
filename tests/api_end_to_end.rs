//! Runs the real router on an ephemeral port against in-memory SQLite and
//! drives it through `ApiClient` and the page view-models.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

use productpro::client::models::api_status::ApiStatus;
use productpro::client::pages::collaboration::CollaborationPage;
use productpro::client::pages::design_studio::DesignStudio;
use productpro::client::pages::export::{ExportFormat, ExportPage};
use productpro::client::pages::material_library::MaterialLibraryPage;
use productpro::client::pages::projects::ProjectsPage;
use productpro::client::pages::standards::StandardsPage;
use productpro::client::services::api_service::ApiClient;
use productpro::common::models::NewProject;
use productpro::server::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use productpro::server::connection::Server;

struct Backend {
    base_url: String,
    upload_dir: PathBuf,
    _scratch: TempDir,
}

async fn spawn_backend() -> Backend {
    let scratch = tempfile::tempdir().unwrap();
    let upload_dir = scratch.path().join("uploads");
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: "sqlite::memory:".into(),
        upload_dir: upload_dir.clone(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        catalog_path: None,
        log_level: "info".into(),
        performance_log_path: scratch.path().join("perf.log").to_string_lossy().to_string(),
        performance_log_interval_secs: 120,
    };
    let server = Server::bootstrap(config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    Backend { base_url: format!("http://{}/api", addr), upload_dir, _scratch: scratch }
}

/// Serves a fixed router, for backends that misbehave in specific ways.
async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/api", addr)
}

fn unused_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

#[tokio::test]
async fn mount_connects_to_healthy_backend() {
    let backend = spawn_backend().await;
    let api = ApiClient::mount(&backend.base_url).await.unwrap();
    assert_eq!(api.status().await, ApiStatus::connected());
}

#[tokio::test]
async fn unhealthy_flag_is_an_error() {
    let app = Router::new().route(
        "/api/health",
        get(|| async { Json(json!({ "status": "degraded", "services": { "database": false } })) }),
    );
    let api = ApiClient::mount(&spawn_stub(app).await).await.unwrap();

    let status = api.status().await;
    assert!(!status.is_connected);
    assert!(status.is_error);
    assert_eq!(status.error_message.as_deref(), Some("Backend reported status: degraded"));
}

#[tokio::test]
async fn health_probe_failure_is_an_error() {
    let app = Router::new().route(
        "/api/health",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "Starting up" }))) }),
    );
    let api = ApiClient::mount(&spawn_stub(app).await).await.unwrap();
    let status = api.status().await;
    assert!(status.is_error);
    assert_eq!(status.error_message.as_deref(), Some("Starting up"));
}

#[tokio::test]
async fn failed_project_fetch_leaves_list_empty() {
    let backend = spawn_backend().await;
    let live = ApiClient::new(&backend.base_url).unwrap();
    let mut page = ProjectsPage::new();
    page.create(&live, NewProject::new("Stool", "furniture")).await.unwrap();
    assert_eq!(page.projects.len(), 1);

    let offline = ApiClient::new(&unused_port_url()).unwrap();
    page.load(&offline).await;
    assert!(page.projects.is_empty());
    assert_eq!(page.error.as_deref(), Some("Failed to get projects"));
}

#[tokio::test]
async fn backend_error_text_and_fallbacks() {
    let app = Router::new()
        .route("/api/projects", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Database offline" }))) }))
        .route("/api/trends", get(|| async { Json(json!({ "success": true })) }))
        .route("/api/materials", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }));
    let api = ApiClient::new(&spawn_stub(app).await).unwrap();

    assert_eq!(api.get_projects().await.unwrap_err().message(), "Database offline");
    assert_eq!(api.get_trends(None).await.unwrap_err().message(), "Failed to get trends");
    assert_eq!(api.get_materials(None).await.unwrap_err().message(), "Failed to get materials");
}

#[tokio::test]
async fn project_crud_round_trip() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();

    let created = api
        .create_project(&NewProject::new("Lounge chair", "furniture").with_template("chair"))
        .await
        .unwrap();
    assert_eq!(created.components.len(), 4);
    assert_eq!(created.status, "draft");

    let fetched = api.get_project(&created.id).await.unwrap();
    assert_eq!(fetched.name, "Lounge chair");

    let updated = api
        .update_project(&created.id, &json!({ "name": "Lounge chair v2", "status": "review" }))
        .await
        .unwrap();
    assert_eq!(updated.name, "Lounge chair v2");
    assert_eq!(updated.version_history.len(), 1);

    assert_eq!(api.get_projects().await.unwrap().len(), 1);
    assert_eq!(api.delete_project(&created.id).await.unwrap(), "Project deleted successfully");
    assert_eq!(api.get_project(&created.id).await.unwrap_err().message(), "Project not found");
    assert!(api.get_projects().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_missing_fields() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();
    let err = api.create_project(&NewProject::new("", "furniture")).await.unwrap_err();
    assert_eq!(err.message(), "Missing required fields");
}

#[tokio::test]
async fn dxf_export_echoes_format() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();
    let project = api
        .create_project(&NewProject::new("Coffee table", "furniture").with_template("table"))
        .await
        .unwrap();

    let export = api.export_project(&project.id, "dxf").await.unwrap();
    assert_eq!(export.metadata.format, "dxf");
    assert_eq!(export.metadata.project_id, project.id);
    assert!(export.content.as_str().unwrap().ends_with("0\nEOF\n"));

    let err = api.export_project(&project.id, "docx").await.unwrap_err();
    assert_eq!(err.message(), "Unsupported export format: docx");

    let mut page = ExportPage::new();
    page.format = ExportFormat::Csv;
    let data = page.export(&api, &project.id).await.unwrap();
    assert_eq!(data.file_extension, "csv");
}

#[tokio::test]
async fn collaboration_name_defaults_to_project_name() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();
    let project = api.create_project(&NewProject::new("Desk Lamp", "furniture")).await.unwrap();

    let session = api.create_collaboration_session(&project.id, None).await.unwrap();
    assert_eq!(session.name, "Collaboration on Desk Lamp");
    assert_eq!(session.project_id, project.id);
    assert_eq!(session.status, "active");

    let mut page = CollaborationPage::new();
    page.load(&api, &project.id).await;
    let session = page.create_session(&api, None).await.unwrap();
    assert_eq!(session.name, "Collaboration on Desk Lamp");
    page.create_session(&api, Some("Design review")).await.unwrap();
    assert_eq!(page.sessions.len(), 2);

    let err = api.create_collaboration_session("", None).await.unwrap_err();
    assert_eq!(err.message(), "Missing project_id");
    let err = api.create_collaboration_session("ghost", None).await.unwrap_err();
    assert_eq!(err.message(), "Project not found");
}

#[tokio::test]
async fn catalog_filters() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();

    let all = api.get_materials(None).await.unwrap();
    let woods = api.get_materials(Some("woods")).await.unwrap();
    assert!(all.len() > woods.len());
    assert!(woods.iter().all(|m| m.category == "woods"));
    assert_eq!(api.get_material("bamboo").await.unwrap().name, woods.iter().find(|m| m.id == "bamboo").unwrap().name);
    assert_eq!(api.get_material("unobtainium").await.unwrap_err().message(), "Material not found");

    let sustainable = api.get_sustainable_materials(None, None).await.unwrap();
    assert!(sustainable.iter().all(|m| m.sustainability_score >= 0.7));
    let strict = api.get_sustainable_materials(Some("woods"), Some(0.85)).await.unwrap();
    let ids: Vec<&str> = strict.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["bamboo"]);

    let standards = api.get_standards(Some("electronics")).await.unwrap();
    assert!(!standards.is_empty());
    assert!(standards.iter().all(|s| s.industry == "electronics"));
    assert_eq!(api.get_standard("EN 1728").await.unwrap().id, "en_1728");

    let templates = api.get_templates(Some("furniture")).await.unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(api.get_template("packaging", "box").await.unwrap().id, "box");
    assert_eq!(api.get_template("packaging", "chair").await.unwrap_err().message(), "Template not found");

    let configs = api.get_industry_configs(Some("fashion")).await.unwrap();
    assert_eq!(configs.keys().collect::<Vec<_>>(), vec!["fashion"]);
    assert!(api.get_industry_configs(Some("aerospace")).await.unwrap().is_empty());

    let trends = api.get_trends(Some("furniture")).await.unwrap();
    assert_eq!(trends.len(), 4);
    assert!(trends.windows(2).all(|w| w[0].strength >= w[1].strength));
}

#[tokio::test]
async fn library_pages_load_through_api() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();

    let mut materials = MaterialLibraryPage::new();
    materials.set_category(&api, Some("metals")).await;
    assert_eq!(materials.categories(), vec!["metals".to_string()]);
    materials.set_sustainable_only(&api, true, Some(0.9)).await;
    assert!(materials.materials.is_empty());
    assert!(materials.error.is_none());
    materials.select(&api, "steel").await;
    assert_eq!(materials.selected.as_ref().map(|m| m.id.as_str()), Some("steel"));

    let mut standards = StandardsPage::new();
    standards.set_industry(&api, Some("furniture")).await;
    assert_eq!(standards.standards.len(), 3);
    standards.select(&api, "nope").await;
    assert_eq!(standards.error.as_deref(), Some("Standard not found"));
}

#[tokio::test]
async fn commands_analysis_and_recommendations() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();
    let project = api
        .create_project(&NewProject::new("Phone case", "electronics").with_template("phone_case"))
        .await
        .unwrap();

    let response = api.process_command("Make it BLUE and larger", Some(&project.id)).await.unwrap();
    assert!(response.success);
    let design = response.result.unwrap();
    assert_eq!(design.color, "blue");
    assert_eq!(design.scale, 1.1);
    assert_eq!(api.get_project(&project.id).await.unwrap().design.color, "blue");

    let detached = api.process_command("something unrelated", None).await.unwrap();
    assert!(detached.command_data.adjustments.is_empty());
    assert!(detached.result.is_none());
    assert_eq!(api.process_command("   ", None).await.unwrap_err().message(), "Missing command text");

    let analysis = api.analyze_project(&project.id).await.unwrap();
    assert_eq!(analysis.component_count, 2);
    assert_eq!(analysis.sustainability_level, "Unknown");

    let recommendations = api.get_recommendations(&project.id).await.unwrap();
    assert!(recommendations.categories.contains_key("materials"));

    let visualization = api.get_visualization(&project.id).await.unwrap();
    assert_eq!(visualization.design.color, "blue");
    assert_eq!(visualization.components.len(), 2);
}

#[tokio::test]
async fn studio_saves_design_and_uploads_reference() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();
    let project = api
        .create_project(&NewProject::new("Dining chair", "furniture").with_template("chair"))
        .await
        .unwrap();

    let mut studio = DesignStudio::new();
    studio.load(&api, &project.id).await;
    assert!(studio.error.is_none());
    assert_eq!(studio.templates.len(), 2);
    assert!(studio.industry_config.is_some());
    assert_eq!(studio.trends.len(), 4);

    studio.apply_command("wood with a glossy finish");
    assert!(studio.save(&api).await);
    let stored = api.get_project(&project.id).await.unwrap();
    assert_eq!(stored.design.material, "wood");
    assert_eq!(stored.design.finish, "glossy");

    let scratch = tempfile::tempdir().unwrap();
    let image = scratch.path().join("sketch 01.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G', 0x0d, 0x0a]).unwrap();
    assert!(studio.upload_reference(&api, &image).await);

    let upload = studio.last_upload.clone().unwrap();
    assert_eq!(upload.analysis.file_name, "sketch 01.png");
    assert_eq!(upload.analysis.content_type.as_deref(), Some("image/png"));
    assert_eq!(upload.analysis.size_bytes, 6);
    assert!(PathBuf::from(&upload.file_path).starts_with(&backend.upload_dir));
    assert!(upload.file_path.ends_with("_sketch_01.png"));

    let stored = api.get_project(&project.id).await.unwrap();
    assert_eq!(stored.reference_image.as_deref(), Some(upload.file_path.as_str()));
}

#[tokio::test]
async fn upload_validation() {
    let backend = spawn_backend().await;
    let api = ApiClient::new(&backend.base_url).unwrap();

    let err = api.upload_image("", vec![1, 2, 3], None).await.unwrap_err();
    assert_eq!(err.message(), "No selected file");

    let err = api.upload_image("a.png", vec![1], Some("ghost")).await.unwrap_err();
    assert_eq!(err.message(), "Project not found");

    let result = api.upload_image("loose.jpg", vec![1, 2], None).await.unwrap();
    assert!(result.analysis.project_id.is_none());
}
