//! Read-only reference data: materials, standards, templates, industry
//! configurations and market trends.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};

use crate::common::models::{IndustryConfig, Material, Standard, Template, Trend};
use crate::server::config::ServerConfig;

const BUILTIN_CATALOG: &str = include_str!("catalog.json");

pub const DEFAULT_SUSTAINABLE_MIN_SCORE: f64 = 0.7;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub standards: Vec<Standard>,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub industry_configs: BTreeMap<String, IndustryConfig>,
    #[serde(default)]
    pub trends: Vec<Trend>,
}

impl Catalog {
    pub fn builtin() -> anyhow::Result<Self> {
        serde_json::from_str(BUILTIN_CATALOG).context("built-in catalog is not valid JSON")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid catalog file {}", path.display()))
    }

    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Self::load(path)?,
            None => Self::builtin()?,
        };
        info!(
            "📚 Catalog ready: {} materials, {} standards, {} templates, {} industries, {} trends",
            catalog.materials.len(),
            catalog.standards.len(),
            catalog.templates.len(),
            catalog.industry_configs.len(),
            catalog.trends.len()
        );
        Ok(catalog)
    }

    pub fn materials(&self, category: Option<&str>) -> Vec<Material> {
        self.materials
            .iter()
            .filter(|m| category.map_or(true, |c| m.category == c))
            .cloned()
            .collect()
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn standards(&self, industry: Option<&str>) -> Vec<Standard> {
        self.standards
            .iter()
            .filter(|s| industry.map_or(true, |i| s.industry == i))
            .cloned()
            .collect()
    }

    /// Looks up by slug first, then by published code.
    pub fn standard(&self, id: &str) -> Option<&Standard> {
        self.standards
            .iter()
            .find(|s| s.id == id)
            .or_else(|| self.standards.iter().find(|s| s.code.eq_ignore_ascii_case(id)))
    }

    pub fn templates(&self, industry: Option<&str>) -> Vec<Template> {
        self.templates
            .iter()
            .filter(|t| industry.map_or(true, |i| t.industry == i))
            .cloned()
            .collect()
    }

    pub fn template(&self, industry: &str, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.industry == industry && t.id == id)
    }

    pub fn industry_configs(&self, industry: Option<&str>) -> BTreeMap<String, IndustryConfig> {
        match industry {
            Some(industry) => self
                .industry_configs
                .get(industry)
                .map(|config| BTreeMap::from([(industry.to_string(), config.clone())]))
                .unwrap_or_default(),
            None => self.industry_configs.clone(),
        }
    }

    /// Strongest first. With an industry, global trends are included too.
    pub fn trends(&self, industry: Option<&str>) -> Vec<Trend> {
        let mut trends: Vec<Trend> = self
            .trends
            .iter()
            .filter(|t| industry.map_or(true, |i| t.applies_to(i)))
            .cloned()
            .collect();
        trends.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        trends
    }

    /// Highest score first.
    pub fn sustainable_materials(&self, category: Option<&str>, min_score: Option<f64>) -> Vec<Material> {
        let min_score = min_score.unwrap_or(DEFAULT_SUSTAINABLE_MIN_SCORE);
        let mut materials: Vec<Material> = self
            .materials(category)
            .into_iter()
            .filter(|m| m.sustainability_score >= min_score)
            .collect();
        materials.sort_by(|a, b| b.sustainability_score.total_cmp(&a.sustainability_score));
        materials
    }

    /// Materials an industry usually works with, in the configured order.
    pub fn common_materials(&self, industry: &str) -> Vec<&Material> {
        self.industry_configs
            .get(industry)
            .map(|config| config.common_materials.iter().filter_map(|id| self.material(id)).collect())
            .unwrap_or_default()
    }
}
