use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;

use crate::client::error::ApiError;
use crate::client::services::api_service::ApiClient;
use crate::common::models::ExportData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Pdf,
    Dxf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Pdf, ExportFormat::Dxf];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Dxf => "dxf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ApiError::new(format!("Unsupported export format: {}", s)))
    }
}

#[derive(Debug, Default)]
pub struct ExportPage {
    pub format: ExportFormat,
    pub last_export: Option<ExportData>,
    pub error: Option<String>,
}

impl ExportPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn export(&mut self, api: &ApiClient, project_id: &str) -> Option<&ExportData> {
        match api.export_project(project_id, self.format.as_str()).await {
            Ok(data) => {
                self.last_export = Some(data);
                self.error = None;
                self.last_export.as_ref()
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Writes the last export into `dir` as `{project name}.{extension}`.
    pub async fn save_to(&self, dir: &Path) -> std::io::Result<Option<PathBuf>> {
        let Some(data) = &self.last_export else {
            return Ok(None);
        };
        tokio::fs::create_dir_all(dir).await?;
        let stem: String = data
            .metadata
            .project_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let path = dir.join(format!("{}.{}", stem, data.file_extension));
        tokio::fs::write(&path, file_contents(&data.content)).await?;
        Ok(Some(path))
    }
}

/// Text exports are written as-is, structured ones as pretty JSON.
fn file_contents(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::models::ExportMetadata;
    use serde_json::json;

    #[test]
    fn parses_formats() {
        assert_eq!("DXF".parse::<ExportFormat>().unwrap(), ExportFormat::Dxf);
        assert_eq!(" csv ".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        let err = "docx".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.message(), "Unsupported export format: docx");
    }

    #[tokio::test]
    async fn saves_last_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = ExportPage::new();
        assert_eq!(page.save_to(dir.path()).await.unwrap(), None);

        page.last_export = Some(ExportData {
            metadata: ExportMetadata {
                project_id: "p1".into(),
                project_name: "Gift box".into(),
                industry: "packaging".into(),
                created_at: None,
                updated_at: None,
                export_date: Some("2024-05-01T10:00:00".into()),
                format: "csv".into(),
            },
            content: json!("type,name,value,required\n"),
            file_extension: "csv".into(),
        });
        let path = page.save_to(dir.path()).await.unwrap().unwrap();
        assert!(path.ends_with("Gift_box.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "type,name,value,required\n");
    }
}
