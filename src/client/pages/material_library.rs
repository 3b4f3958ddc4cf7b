use std::collections::BTreeSet;

use crate::client::services::api_service::ApiClient;
use crate::common::models::Material;

#[derive(Debug, Default)]
pub struct MaterialLibraryPage {
    pub category: Option<String>,
    pub sustainable_only: bool,
    /// Only sent in sustainable mode; the backend default applies when unset.
    pub min_score: Option<f64>,
    pub materials: Vec<Material>,
    pub selected: Option<Material>,
    pub error: Option<String>,
}

impl MaterialLibraryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &ApiClient) {
        let category = self.category.as_deref();
        let result = if self.sustainable_only {
            api.get_sustainable_materials(category, self.min_score).await
        } else {
            api.get_materials(category).await
        };
        match result {
            Ok(materials) => {
                self.materials = materials;
                self.error = None;
            }
            Err(e) => {
                self.materials.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    pub async fn set_category(&mut self, api: &ApiClient, category: Option<&str>) {
        self.category = category.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);
        self.load(api).await;
    }

    pub async fn set_sustainable_only(&mut self, api: &ApiClient, enabled: bool, min_score: Option<f64>) {
        self.sustainable_only = enabled;
        self.min_score = min_score;
        self.load(api).await;
    }

    pub async fn select(&mut self, api: &ApiClient, material_id: &str) {
        match api.get_material(material_id).await {
            Ok(material) => {
                self.selected = Some(material);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Categories present in the loaded list, for the filter picker.
    pub fn categories(&self) -> Vec<String> {
        self.materials
            .iter()
            .map(|m| m.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
