//! Single point of contact with the ProductPro REST backend.
//!
//! Every function performs exactly one HTTP round trip and returns the
//! payload field of the response body. Failures are normalized into
//! [`ApiError`]: the backend's `error` text when it sent one, otherwise the
//! fixed fallback message of the call. Nothing is retried or cached.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use url::Url;

use crate::client::error::{ApiError, ApiResult};
use crate::client::models::api_status::ApiStatus;
use crate::common::models::{
    AnalysisReport, CollaborationSession, CommandRequest, CommandResponse, ExportData, HealthReport, IndustryConfig, Material,
    NewProject, Project, Recommendations, Standard, Template, Trend, UploadResult, Visualization,
};

pub struct ApiClient {
    http: Client,
    base_url: Url,
    status: RwLock<ApiStatus>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::new(format!("Invalid API base URL: {}", base_url)))?;

        Ok(Self {
            http: Client::new(),
            base_url,
            status: RwLock::new(ApiStatus::default()),
        })
    }

    /// Builds the client and runs the first connectivity check.
    pub async fn mount(base_url: &str) -> ApiResult<Self> {
        let client = Self::new(base_url)?;
        client.check_connection().await;
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn status(&self) -> ApiStatus {
        self.status.read().await.clone()
    }

    /// Probes `/health`. Connected only when the probe succeeds and the
    /// backend reports itself healthy.
    pub async fn check_connection(&self) -> ApiStatus {
        *self.status.write().await = ApiStatus::checking();

        let outcome = match self.endpoint(&["health"], &[]) {
            Ok(url) => self.send(self.http.get(url), "Failed to connect to backend").await,
            Err(e) => Err(e),
        };
        let status = match outcome.and_then(|body| decode::<HealthReport>(body, "Invalid health response")) {
            Ok(report) if report.is_healthy() => ApiStatus::connected(),
            Ok(report) => ApiStatus::failed(format!("Backend reported status: {}", report.status)),
            Err(e) => ApiStatus::failed(e.message()),
        };

        if status.is_connected {
            debug!("Backend at {} is healthy", self.base_url);
        } else {
            warn!("Backend at {} is unavailable: {:?}", self.base_url, status.error_message);
        }
        *self.status.write().await = status.clone();
        status
    }

    pub async fn process_command(&self, command: &str, project_id: Option<&str>) -> ApiResult<CommandResponse> {
        const FALLBACK: &str = "Failed to process command";
        let url = self.endpoint(&["process-command"], &[])?;
        let request = CommandRequest { command: command.to_string(), project_id: project_id.map(str::to_string) };
        let body = self.send(self.http.post(url).json(&request), FALLBACK).await?;
        decode(body, FALLBACK)
    }

    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>, project_id: Option<&str>) -> ApiResult<UploadResult> {
        const FALLBACK: &str = "Failed to upload image";
        let url = self.endpoint(&["upload-image"], &[])?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(image_mime(file_name))
            .map_err(|e| {
                warn!("{}: {}", FALLBACK, e);
                ApiError::new(FALLBACK)
            })?;
        let mut form = Form::new().part("image", part);
        if let Some(project_id) = project_id {
            form = form.text("project_id", project_id.to_string());
        }
        let body = self.send(self.http.post(url).multipart(form), FALLBACK).await?;
        decode(body, FALLBACK)
    }

    pub async fn upload_image_file(&self, path: &Path, project_id: Option<&str>) -> ApiResult<UploadResult> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::new(format!("Failed to read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        self.upload_image(&file_name, bytes, project_id).await
    }

    pub async fn get_projects(&self) -> ApiResult<Vec<Project>> {
        self.get(&["projects"], &[], "projects", "Failed to get projects").await
    }

    pub async fn create_project(&self, project: &NewProject) -> ApiResult<Project> {
        const FALLBACK: &str = "Failed to create project";
        let url = self.endpoint(&["projects"], &[])?;
        let body = self.send(self.http.post(url).json(project), FALLBACK).await?;
        field(body, "project", FALLBACK)
    }

    pub async fn get_project(&self, project_id: &str) -> ApiResult<Project> {
        self.get(&["projects", project_id], &[], "project", "Failed to get project").await
    }

    pub async fn update_project(&self, project_id: &str, updates: &Value) -> ApiResult<Project> {
        const FALLBACK: &str = "Failed to update project";
        let url = self.endpoint(&["projects", project_id], &[])?;
        let body = self.send(self.http.put(url).json(updates), FALLBACK).await?;
        field(body, "project", FALLBACK)
    }

    pub async fn delete_project(&self, project_id: &str) -> ApiResult<String> {
        const FALLBACK: &str = "Failed to delete project";
        let url = self.endpoint(&["projects", project_id], &[])?;
        let body = self.send(self.http.delete(url), FALLBACK).await?;
        field(body, "message", FALLBACK)
    }

    pub async fn analyze_project(&self, project_id: &str) -> ApiResult<AnalysisReport> {
        const FALLBACK: &str = "Failed to analyze project";
        let url = self.endpoint(&["projects", project_id, "analyze"], &[])?;
        let body = self.send(self.http.post(url), FALLBACK).await?;
        field(body, "analysis", FALLBACK)
    }

    pub async fn get_recommendations(&self, project_id: &str) -> ApiResult<Recommendations> {
        self.get(&["projects", project_id, "recommendations"], &[], "recommendations", "Failed to get recommendations")
            .await
    }

    pub async fn get_visualization(&self, project_id: &str) -> ApiResult<Visualization> {
        self.get(&["projects", project_id, "visualization"], &[], "visualization", "Failed to get visualization")
            .await
    }

    pub async fn export_project(&self, project_id: &str, format: &str) -> ApiResult<ExportData> {
        self.get(&["projects", project_id, "export"], &[("format", Some(format.to_string()))], "export_data", "Failed to export project")
            .await
    }

    pub async fn get_materials(&self, category: Option<&str>) -> ApiResult<Vec<Material>> {
        self.get(&["materials"], &[("category", category.map(str::to_string))], "materials", "Failed to get materials")
            .await
    }

    pub async fn get_material(&self, material_id: &str) -> ApiResult<Material> {
        self.get(&["materials", material_id], &[], "material", "Failed to get material").await
    }

    pub async fn get_standards(&self, industry: Option<&str>) -> ApiResult<Vec<Standard>> {
        self.get(&["standards"], &[("industry", industry.map(str::to_string))], "standards", "Failed to get standards")
            .await
    }

    pub async fn get_standard(&self, standard_id: &str) -> ApiResult<Standard> {
        self.get(&["standards", standard_id], &[], "standard", "Failed to get standard").await
    }

    pub async fn get_templates(&self, industry: Option<&str>) -> ApiResult<Vec<Template>> {
        self.get(&["templates"], &[("industry", industry.map(str::to_string))], "templates", "Failed to get templates")
            .await
    }

    pub async fn get_template(&self, industry: &str, template_id: &str) -> ApiResult<Template> {
        self.get(&["templates", industry, template_id], &[], "template", "Failed to get template").await
    }

    pub async fn get_industry_configs(&self, industry: Option<&str>) -> ApiResult<BTreeMap<String, IndustryConfig>> {
        self.get(
            &["industry-configs"],
            &[("industry", industry.map(str::to_string))],
            "configs",
            "Failed to get industry configurations",
        )
        .await
    }

    pub async fn get_trends(&self, industry: Option<&str>) -> ApiResult<Vec<Trend>> {
        self.get(&["trends"], &[("industry", industry.map(str::to_string))], "trends", "Failed to get trends").await
    }

    pub async fn get_sustainable_materials(&self, category: Option<&str>, min_score: Option<f64>) -> ApiResult<Vec<Material>> {
        self.get(
            &["sustainability", "materials"],
            &[("category", category.map(str::to_string)), ("min_score", min_score.map(|s| s.to_string()))],
            "materials",
            "Failed to get sustainable materials",
        )
        .await
    }

    /// The backend answers with the session fields at the top level.
    pub async fn create_collaboration_session(&self, project_id: &str, name: Option<&str>) -> ApiResult<CollaborationSession> {
        const FALLBACK: &str = "Failed to create collaboration session";
        let url = self.endpoint(&["collaboration", "sessions"], &[])?;
        let mut payload = json!({ "project_id": project_id });
        if let Some(name) = name {
            payload["name"] = Value::String(name.to_string());
        }
        let body = self.send(self.http.post(url).json(&payload), FALLBACK).await?;
        decode(body, FALLBACK)
    }

    /// API root plus percent-encoded path segments. Query pairs whose value
    /// is `None` are left out entirely.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, Option<String>)]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::new(format!("Invalid API base URL: {}", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }

        let present: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, Option<String>)],
        key: &str,
        fallback: &str,
    ) -> ApiResult<T> {
        let url = self.endpoint(segments, query)?;
        let body = self.send(self.http.get(url), fallback).await?;
        field(body, key, fallback)
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> ApiResult<Value> {
        let response = request.send().await.map_err(|e| {
            warn!("{}: {}", fallback, e);
            ApiError::new(fallback)
        })?;

        let status = response.status();
        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                warn!("{}: unreadable response body ({}): {}", fallback, status, e);
                Value::Null
            }
        };

        if !status.is_success() || body.get("success").and_then(Value::as_bool) == Some(false) {
            debug!("{}: backend answered {} with {}", fallback, status, body);
            return Err(ApiError::from_body(&body, fallback));
        }
        if body.is_null() {
            return Err(ApiError::new(fallback));
        }
        Ok(body)
    }
}

/// Pulls one payload field out of a response body; a missing or `null`
/// field is a failure.
fn field<T: DeserializeOwned>(mut body: Value, key: &str, fallback: &str) -> ApiResult<T> {
    match body.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => {
            warn!("{}: response has no '{}' field", fallback, key);
            Err(ApiError::new(fallback))
        }
        Some(value) => decode(value, fallback),
    }
}

fn decode<T: DeserializeOwned>(value: Value, fallback: &str) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| {
        warn!("{}: unexpected response shape: {}", fallback, e);
        ApiError::new(fallback)
    })
}

fn image_mime(file_name: &str) -> &'static str {
    let extension = file_name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:5000/api").unwrap()
    }

    #[test]
    fn omitted_filters_produce_no_query() {
        let url = client().endpoint(&["materials"], &[("category", None)]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/materials");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn provided_filters_appear_verbatim() {
        let url = client()
            .endpoint(
                &["sustainability", "materials"],
                &[("category", Some("metal".into())), ("min_score", Some("0.8".into()))],
            )
            .unwrap();
        assert_eq!(url.query(), Some("category=metal&min_score=0.8"));

        let url = client()
            .endpoint(&["sustainability", "materials"], &[("category", None), ("min_score", Some("0.5".into()))])
            .unwrap();
        assert_eq!(url.query(), Some("min_score=0.5"));
    }

    #[test]
    fn path_segments_are_escaped() {
        let url = client().endpoint(&["projects", "a/b c"], &[]).unwrap();
        assert_eq!(url.path(), "/api/projects/a%2Fb%20c");
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let api = ApiClient::new("http://localhost:5000/api/").unwrap();
        let url = api.endpoint(&["health"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/health");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn missing_or_null_field_is_an_error() {
        let err = field::<Vec<Project>>(json!({ "success": true }), "projects", "Failed to get projects").unwrap_err();
        assert_eq!(err.message(), "Failed to get projects");
        let err = field::<Vec<Project>>(json!({ "projects": null }), "projects", "Failed to get projects").unwrap_err();
        assert_eq!(err.message(), "Failed to get projects");
        let empty: Vec<Project> = field(json!({ "projects": [] }), "projects", "Failed to get projects").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn guesses_image_mime() {
        assert_eq!(image_mime("chair.PNG"), "image/png");
        assert_eq!(image_mime("photo.jpeg"), "image/jpeg");
        assert_eq!(image_mime("notes"), "application/octet-stream");
    }

    #[tokio::test]
    async fn network_failure_uses_fallback_message() {
        // grab a free port and release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let api = ApiClient::new(&format!("http://127.0.0.1:{}/api", port)).unwrap();
        let err = api.get_projects().await.unwrap_err();
        assert_eq!(err.message(), "Failed to get projects");

        let status = api.check_connection().await;
        assert!(!status.is_connected);
        assert!(status.is_error);
        assert!(!status.is_loading);
        assert_eq!(status.error_message.as_deref(), Some("Failed to connect to backend"));
        assert_eq!(api.status().await, status);
    }
}
