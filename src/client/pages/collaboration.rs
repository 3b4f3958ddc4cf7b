use crate::client::services::api_service::ApiClient;
use crate::common::models::{CollaborationSession, Project};

/// Sessions created here live only as long as the page.
#[derive(Debug, Default)]
pub struct CollaborationPage {
    pub project: Option<Project>,
    pub sessions: Vec<CollaborationSession>,
    pub error: Option<String>,
}

impl CollaborationPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_project(project: Project) -> Self {
        Self { project: Some(project), ..Self::default() }
    }

    pub async fn load(&mut self, api: &ApiClient, project_id: &str) {
        match api.get_project(project_id).await {
            Ok(project) => {
                self.project = Some(project);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Name of the next session: the typed one, or the project default.
    pub fn session_name(&self, name: Option<&str>) -> Option<String> {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => self.project.as_ref().map(|p| CollaborationSession::default_name(&p.name)),
        }
    }

    pub async fn create_session(&mut self, api: &ApiClient, name: Option<&str>) -> Option<CollaborationSession> {
        let (Some(project_id), Some(name)) = (self.project.as_ref().map(|p| p.id.clone()), self.session_name(name)) else {
            self.error = Some("Select a project first".to_string());
            return None;
        };

        match api.create_collaboration_session(&project_id, Some(&name)).await {
            Ok(session) => {
                self.sessions.push(session.clone());
                self.error = None;
                Some(session)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}
