// Common models shared between client and server
use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::design_command::{DesignAdjustment, DesignState};

pub const PROJECT_STATUS_DRAFT: &str = "draft";
pub const SESSION_STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub industry: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub reference_image: Option<String>,
    /// Backend timestamps are kept as sent; older backends emit naive ISO
    /// strings or leave them out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default = "default_project_status")]
    pub status: String,
    #[serde(default)]
    pub design: DesignState,
    #[serde(default)]
    pub components: Vec<ProjectComponent>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub manufacturing_processes: Vec<String>,
    #[serde(default)]
    pub design_parameters: BTreeMap<String, DesignParameter>,
    #[serde(default)]
    pub analysis_results: Option<Value>,
    #[serde(default)]
    pub version_history: Vec<Value>,
    /// Backend fields the frontend does not model; passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// The stored analysis, if it has the shape this backend writes.
    pub fn analysis(&self) -> Option<AnalysisReport> {
        self.analysis_results
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

fn default_project_status() -> String {
    PROJECT_STATUS_DRAFT.to_string()
}

/// RFC 3339 timestamp for records written by this backend.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectComponent {
    pub name: String,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub selected_material: Option<String>,
    #[serde(default)]
    pub properties: Value,
    #[serde(default = "default_component_status")]
    pub status: String,
}

fn default_true() -> bool {
    true
}

fn default_component_status() -> String {
    "pending".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DesignParameter {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub selected: Option<String>,
}

/// Snapshot taken before every update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectVersion {
    pub version: u32,
    #[serde(default)]
    pub recorded_at: Option<String>,
    pub name: String,
    pub industry: String,
    pub status: String,
    pub design: DesignState,
    #[serde(default)]
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            industry: industry.into(),
            template_id: None,
            reference_image: None,
            description: None,
        }
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollaborationSession {
    pub session_id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default = "default_session_status")]
    pub status: String,
}

impl CollaborationSession {
    /// Name used when a session is created without one.
    pub fn default_name(project_name: &str) -> String {
        format!("Collaboration on {}", project_name)
    }
}

fn default_session_status() -> String {
    SESSION_STATUS_ACTIVE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: BTreeMap<String, f64>,
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub sustainability: MaterialSustainability,
    #[serde(default)]
    pub sustainability_score: f64,
    #[serde(default)]
    pub finish_options: Vec<String>,
    #[serde(default)]
    pub cost_factor: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MaterialSustainability {
    #[serde(default)]
    pub recyclable: bool,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default)]
    pub carbon_footprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Standard {
    pub id: String,
    pub code: String,
    pub name: String,
    pub industry: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_requirements: Vec<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: String,
    pub industry: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub components: Vec<TemplateComponent>,
    #[serde(default)]
    pub design_parameters: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub manufacturing_processes: Vec<String>,
    #[serde(default)]
    pub applicable_standards: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateComponent {
    pub name: String,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub default_materials: Vec<String>,
    #[serde(default)]
    pub properties: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub design_principles: Vec<DesignPrinciple>,
    #[serde(default)]
    pub common_materials: Vec<String>,
    #[serde(default)]
    pub key_standards: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignPrinciple {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_considerations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trend {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub strength: f64,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub maturity: String,
    #[serde(default)]
    pub key_elements: Vec<String>,
    /// Empty means the trend applies to every industry.
    #[serde(default)]
    pub industries: Vec<String>,
}

impl Trend {
    pub fn applies_to(&self, industry: &str) -> bool {
        self.industries.is_empty() || self.industries.iter().any(|i| i == industry)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, bool>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandData {
    pub command: String,
    pub adjustments: Vec<DesignAdjustment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
    pub command_data: CommandData,
    /// Present when the command targeted a project.
    #[serde(default)]
    pub result: Option<DesignState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResult {
    pub file_path: String,
    pub analysis: UploadAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadAnalysis {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub size_bytes: u64,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub project_id: String,
    pub project_name: String,
    pub industry: String,
    pub component_count: usize,
    pub components_with_material: usize,
    pub unselected_components: Vec<String>,
    pub parameters_selected: usize,
    pub parameters_total: usize,
    #[serde(default)]
    pub average_sustainability: Option<f64>,
    pub sustainability_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendations {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub project_id: String,
    pub project_name: String,
    pub industry: String,
    pub categories: BTreeMap<String, Vec<Recommendation>>,
}

impl Recommendations {
    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub target: String,
    pub suggestion: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    pub priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visualization {
    pub project_id: String,
    pub project_name: String,
    pub industry: String,
    pub design: DesignState,
    pub components: Vec<VisualComponent>,
    pub materials: Vec<VisualMaterial>,
    pub parameters: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub analysis_summary: Option<AnalysisSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualComponent {
    pub name: String,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub properties: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualMaterial {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub sustainability_score: Option<f64>,
    pub sustainability_level: String,
    pub completeness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportData {
    pub metadata: ExportMetadata,
    pub content: Value,
    pub file_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportMetadata {
    pub project_id: String,
    pub project_name: String,
    pub industry: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub export_date: Option<String>,
    pub format: String,
}
