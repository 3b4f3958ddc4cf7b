//! Design studio: one project, its industry context, and a chat-style
//! command box.
//!
//! Commands are interpreted locally by keyword matching. The backend's
//! `/process-command` endpoint is not involved; the adjusted design only
//! reaches the backend on [`DesignStudio::save`].

use std::path::Path;

use serde_json::json;

use crate::client::services::api_service::ApiClient;
use crate::common::design_command::{self, DesignState};
use crate::common::models::{IndustryConfig, Project, Template, Trend, UploadResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct DesignStudio {
    pub project: Option<Project>,
    pub design: DesignState,
    pub templates: Vec<Template>,
    pub industry_config: Option<IndustryConfig>,
    pub trends: Vec<Trend>,
    pub messages: Vec<ChatMessage>,
    pub last_upload: Option<UploadResult>,
    pub unsaved_changes: bool,
    pub error: Option<String>,
}

impl DesignStudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the project, then the templates, configuration and trends of
    /// its industry. A failed side load keeps the project; a failed project
    /// load closes whatever was open before.
    pub async fn load(&mut self, api: &ApiClient, project_id: &str) {
        let project = match api.get_project(project_id).await {
            Ok(project) => project,
            Err(e) => {
                self.close();
                self.error = Some(e.to_string());
                return;
            }
        };
        self.error = None;
        self.design = project.design.clone();
        self.unsaved_changes = false;
        let industry = project.industry.clone();
        self.project = Some(project);

        match api.get_templates(Some(&industry)).await {
            Ok(templates) => self.templates = templates,
            Err(e) => self.error = Some(e.to_string()),
        }
        match api.get_industry_configs(Some(&industry)).await {
            Ok(mut configs) => self.industry_config = configs.remove(&industry),
            Err(e) => self.error = Some(e.to_string()),
        }
        match api.get_trends(Some(&industry)).await {
            Ok(trends) => self.trends = trends,
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Applies a typed command to the local design and returns the reply.
    pub fn apply_command(&mut self, command: &str) -> String {
        let command = command.trim();
        self.messages.push(ChatMessage { speaker: Speaker::User, text: command.to_string() });

        let adjustments = design_command::interpret(command);
        self.design.apply_all(&adjustments);
        if !adjustments.is_empty() {
            self.unsaved_changes = true;
        }

        let reply = design_command::describe(&adjustments);
        self.messages.push(ChatMessage { speaker: Speaker::Assistant, text: reply.clone() });
        reply
    }

    pub async fn save(&mut self, api: &ApiClient) -> bool {
        let Some(project_id) = self.project.as_ref().map(|p| p.id.clone()) else {
            self.error = Some("No project loaded".to_string());
            return false;
        };
        match api.update_project(&project_id, &json!({ "design": self.design })).await {
            Ok(project) => {
                self.design = project.design.clone();
                self.project = Some(project);
                self.unsaved_changes = false;
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    pub async fn upload_reference(&mut self, api: &ApiClient, path: &Path) -> bool {
        let project_id = self.project.as_ref().map(|p| p.id.clone());
        match api.upload_image_file(path, project_id.as_deref()).await {
            Ok(result) => {
                if let Some(project) = self.project.as_mut() {
                    project.reference_image = Some(result.file_path.clone());
                }
                self.last_upload = Some(result);
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    fn close(&mut self) {
        self.project = None;
        self.design = DesignState::default();
        self.templates.clear();
        self.industry_config = None;
        self.trends.clear();
        self.last_upload = None;
        self.unsaved_changes = false;
    }

    pub fn reset_design(&mut self) {
        self.design = self.project.as_ref().map(|p| p.design.clone()).unwrap_or_default();
        self.unsaved_changes = false;
    }
}
