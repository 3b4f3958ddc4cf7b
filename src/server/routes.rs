//! REST surface under `/api`. Handlers are thin: they pull the inputs out of
//! the request and hand them to the project, catalog, upload and
//! collaboration modules.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::design_command;
use crate::common::models::{CommandData, CommandResponse, HealthReport, NewProject};
use crate::server::catalog::Catalog;
use crate::server::collaboration;
use crate::server::config::ServerConfig;
use crate::server::database::Database;
use crate::server::error::{ServiceError, ServiceResult};
use crate::server::export;
use crate::server::projects;
use crate::server::uploads::{self, IncomingImage};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServerConfig>,
}

/// Query parameters shared by the filterable endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub category: Option<String>,
    pub industry: Option<String>,
    pub min_score: Option<String>,
    pub format: Option<String>,
}

impl FilterQuery {
    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    fn industry(&self) -> Option<&str> {
        self.industry.as_deref().filter(|i| !i.is_empty())
    }

    fn min_score(&self) -> Option<f64> {
        let raw = self.min_score.as_deref()?;
        match raw.trim().parse::<f64>() {
            Ok(score) => Some(score),
            Err(_) => {
                debug!("Ignoring unparsable min_score '{}'", raw);
                None
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let api = Router::new()
        .route("/health", get(health))
        .route("/process-command", post(process_command))
        .route("/upload-image", post(upload_image))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", get(get_project).put(update_project).delete(delete_project))
        .route("/projects/:id/analyze", post(analyze_project))
        .route("/projects/:id/recommendations", get(project_recommendations))
        .route("/projects/:id/visualization", get(project_visualization))
        .route("/projects/:id/export", get(export_project))
        .route("/materials", get(list_materials))
        .route("/materials/:id", get(get_material))
        .route("/standards", get(list_standards))
        .route("/standards/:id", get(get_standard))
        .route("/templates", get(list_templates))
        .route("/templates/:industry/:id", get(get_template))
        .route("/industry-configs", get(list_industry_configs))
        .route("/trends", get(list_trends))
        .route("/sustainability/materials", get(list_sustainable_materials))
        .route("/collaboration/sessions", post(create_collaboration_session));

    Router::new()
        .nest("/api", api)
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> ServiceResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServiceError::bad_request(rejection.body_text()))
}

fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

async fn unknown_route() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let database = match sqlx::query("SELECT 1").execute(&state.db.pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Health probe could not reach the database: {}", e);
            false
        }
    };
    let services = BTreeMap::from([
        ("database".to_string(), database),
        ("catalog".to_string(), !state.catalog.materials.is_empty()),
    ]);

    Json(HealthReport {
        status: if database { "healthy" } else { "degraded" }.to_string(),
        services,
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    })
}

async fn process_command(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServiceResult<Json<CommandResponse>> {
    let body = json_body(body)?;
    let command = str_field(&body, "command").ok_or_else(|| ServiceError::bad_request("Missing command text"))?;

    let adjustments = design_command::interpret(command);
    let result = match str_field(&body, "project_id") {
        Some(project_id) => Some(projects::apply_adjustments(&state.db, project_id, &adjustments).await?.design),
        None => None,
    };

    Ok(Json(CommandResponse {
        success: true,
        message: design_command::describe(&adjustments),
        command_data: CommandData { command: command.to_string(), adjustments },
        result,
    }))
}

async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServiceResult<Json<Value>> {
    let mut multipart = multipart.map_err(|rejection| ServiceError::bad_request(rejection.body_text()))?;

    let mut image = None;
    let mut project_id = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::bad_request(e.body_text()))?
    {
        match field.name() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| ServiceError::bad_request(e.body_text()))?;
                image = Some(IncomingImage { file_name, content_type, bytes: bytes.to_vec() });
            }
            Some("project_id") => {
                let text = field.text().await.map_err(|e| ServiceError::bad_request(e.body_text()))?;
                project_id = Some(text.trim().to_string()).filter(|id| !id.is_empty());
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ServiceError::bad_request("No image part"))?;
    let result = uploads::store_image(&state.db, &state.config.upload_dir, image, project_id.as_deref()).await?;
    Ok(Json(json!({
        "success": true,
        "file_path": result.file_path,
        "analysis": result.analysis,
    })))
}

async fn list_projects(State(state): State<AppState>) -> ServiceResult<Json<Value>> {
    let projects = projects::list_projects(&state.db).await?;
    Ok(Json(json!({ "success": true, "projects": projects })))
}

async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let new: NewProject = serde_json::from_value(json_body(body)?)
        .map_err(|e| ServiceError::bad_request(format!("Invalid project data: {}", e)))?;
    let project = projects::create_project(&state.db, &state.catalog, new).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "project": project }))))
}

async fn get_project(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<Value>> {
    let project = projects::get_project(&state.db, &id).await?;
    Ok(Json(json!({ "success": true, "project": project })))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServiceResult<Json<Value>> {
    let project = projects::update_project(&state.db, &id, json_body(body)?).await?;
    Ok(Json(json!({ "success": true, "project": project })))
}

async fn delete_project(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<Value>> {
    projects::delete_project(&state.db, &id).await?;
    Ok(Json(json!({ "success": true, "message": "Project deleted successfully" })))
}

async fn analyze_project(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<Value>> {
    let analysis = projects::analyze_project(&state.db, &state.catalog, &id).await?;
    Ok(Json(json!({ "success": true, "analysis": analysis })))
}

async fn project_recommendations(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<Value>> {
    let recommendations = projects::project_recommendations(&state.db, &state.catalog, &id).await?;
    Ok(Json(json!({ "success": true, "recommendations": recommendations })))
}

async fn project_visualization(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<Value>> {
    let project = projects::get_project(&state.db, &id).await?;
    let visualization = projects::visualize(&project, &state.catalog);
    Ok(Json(json!({ "success": true, "visualization": visualization })))
}

async fn export_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(filter): Query<FilterQuery>,
) -> ServiceResult<Json<Value>> {
    let project = projects::get_project(&state.db, &id).await?;
    let format = filter.format.as_deref().filter(|f| !f.is_empty()).unwrap_or("json");
    let export_data = export::export_project(&project, format)?;
    Ok(Json(json!({ "success": true, "export_data": export_data })))
}

async fn list_materials(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Json<Value> {
    Json(json!({ "success": true, "materials": state.catalog.materials(filter.category()) }))
}

async fn get_material(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<Value>> {
    let material = state.catalog.material(&id).ok_or_else(|| ServiceError::not_found("Material not found"))?;
    Ok(Json(json!({ "success": true, "material": material })))
}

async fn list_standards(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Json<Value> {
    Json(json!({ "success": true, "standards": state.catalog.standards(filter.industry()) }))
}

async fn get_standard(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<Value>> {
    let standard = state.catalog.standard(&id).ok_or_else(|| ServiceError::not_found("Standard not found"))?;
    Ok(Json(json!({ "success": true, "standard": standard })))
}

async fn list_templates(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Json<Value> {
    Json(json!({ "success": true, "templates": state.catalog.templates(filter.industry()) }))
}

async fn get_template(
    State(state): State<AppState>,
    Path((industry, id)): Path<(String, String)>,
) -> ServiceResult<Json<Value>> {
    let template = state
        .catalog
        .template(&industry, &id)
        .ok_or_else(|| ServiceError::not_found("Template not found"))?;
    Ok(Json(json!({ "success": true, "template": template })))
}

async fn list_industry_configs(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Json<Value> {
    Json(json!({ "success": true, "configs": state.catalog.industry_configs(filter.industry()) }))
}

async fn list_trends(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Json<Value> {
    Json(json!({ "success": true, "trends": state.catalog.trends(filter.industry()) }))
}

async fn list_sustainable_materials(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Json<Value> {
    let materials = state.catalog.sustainable_materials(filter.category(), filter.min_score());
    Json(json!({ "success": true, "materials": materials }))
}

async fn create_collaboration_session(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let body = json_body(body)?;
    let session =
        collaboration::create_session(&state.db, str_field(&body, "project_id"), str_field(&body, "name")).await?;

    let mut payload = serde_json::to_value(&session)?;
    if let Value::Object(fields) = &mut payload {
        fields.insert("success".to_string(), Value::Bool(true));
    }
    Ok((StatusCode::CREATED, Json(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_score_parsing() {
        let filter = FilterQuery { min_score: Some("0.8".into()), ..Default::default() };
        assert_eq!(filter.min_score(), Some(0.8));
        let filter = FilterQuery { min_score: Some("high".into()), ..Default::default() };
        assert_eq!(filter.min_score(), None);
        assert_eq!(FilterQuery::default().min_score(), None);
    }

    #[test]
    fn empty_filters_count_as_absent() {
        let filter = FilterQuery { category: Some(String::new()), industry: Some("furniture".into()), ..Default::default() };
        assert_eq!(filter.category(), None);
        assert_eq!(filter.industry(), Some("furniture"));
    }
}
