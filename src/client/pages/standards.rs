use crate::client::services::api_service::ApiClient;
use crate::common::models::Standard;

#[derive(Debug, Default)]
pub struct StandardsPage {
    pub industry: Option<String>,
    pub standards: Vec<Standard>,
    pub selected: Option<Standard>,
    pub error: Option<String>,
}

impl StandardsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &ApiClient) {
        match api.get_standards(self.industry.as_deref()).await {
            Ok(standards) => {
                self.standards = standards;
                self.error = None;
            }
            Err(e) => {
                self.standards.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    pub async fn set_industry(&mut self, api: &ApiClient, industry: Option<&str>) {
        self.industry = industry.map(str::trim).filter(|i| !i.is_empty()).map(str::to_string);
        self.selected = None;
        self.load(api).await;
    }

    pub async fn select(&mut self, api: &ApiClient, standard_id: &str) {
        match api.get_standard(standard_id).await {
            Ok(standard) => {
                self.selected = Some(standard);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}
