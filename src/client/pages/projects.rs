use log::info;

use crate::client::services::api_service::ApiClient;
use crate::common::models::{NewProject, Project};

#[derive(Debug, Default)]
pub struct ProjectsPage {
    pub projects: Vec<Project>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl ProjectsPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A failed load leaves the list empty.
    pub async fn load(&mut self, api: &ApiClient) {
        self.is_loading = true;
        match api.get_projects().await {
            Ok(projects) => {
                self.projects = projects;
                self.error = None;
            }
            Err(e) => {
                self.projects.clear();
                self.error = Some(e.to_string());
            }
        }
        self.is_loading = false;
    }

    pub async fn create(&mut self, api: &ApiClient, new: NewProject) -> Option<Project> {
        match api.create_project(&new).await {
            Ok(project) => {
                info!("Created project {} ({})", project.name, project.id);
                self.projects.push(project.clone());
                self.error = None;
                Some(project)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    pub async fn delete(&mut self, api: &ApiClient, project_id: &str) -> bool {
        match api.delete_project(project_id).await {
            Ok(_) => {
                self.projects.retain(|p| p.id != project_id);
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}
