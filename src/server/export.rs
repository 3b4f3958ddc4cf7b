//! Project export in json, csv, pdf and dxf flavours.
//!
//! `pdf` only carries the document structure; rendering happens elsewhere.
//! `dxf` is a minimal ASCII drawing with one rectangle per component that
//! has dimensions.

use log::info;
use serde_json::{json, Value};

use crate::common::models::{timestamp_now, ExportData, ExportMetadata, Project};
use crate::server::error::{ServiceError, ServiceResult};

/// Horizontal gap between component outlines in the drawing.
const DXF_SPACING: f64 = 10.0;

pub fn export_project(project: &Project, format: &str) -> ServiceResult<ExportData> {
    let (content, file_extension) = match format.to_ascii_lowercase().as_str() {
        "json" => (serde_json::to_value(project)?, "json"),
        "csv" => (Value::String(to_csv(project)), "csv"),
        "pdf" => (pdf_document(project), "pdf"),
        "dxf" => (Value::String(to_dxf(project)), "dxf"),
        _ => return Err(ServiceError::bad_request(format!("Unsupported export format: {}", format))),
    };

    info!("Exported design data for project: {} in {} format", project.id, format);
    Ok(ExportData {
        metadata: ExportMetadata {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            industry: project.industry.clone(),
            created_at: project.created_at.clone(),
            updated_at: project.updated_at.clone(),
            export_date: Some(timestamp_now()),
            format: format.to_string(),
        },
        content,
        file_extension: file_extension.to_string(),
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_csv(project: &Project) -> String {
    let mut out = String::from("type,name,value,required\n");
    for component in &project.components {
        out.push_str(&format!(
            "component,{},{},{}\n",
            csv_field(&component.name),
            csv_field(component.selected_material.as_deref().unwrap_or("")),
            component.required
        ));
    }
    for (name, parameter) in &project.design_parameters {
        out.push_str(&format!(
            "parameter,{},{},\n",
            csv_field(name),
            csv_field(parameter.selected.as_deref().unwrap_or(""))
        ));
    }
    out.push_str(&format!("design,color,{},\n", csv_field(&project.design.color)));
    out.push_str(&format!("design,material,{},\n", csv_field(&project.design.material)));
    out.push_str(&format!("design,finish,{},\n", csv_field(&project.design.finish)));
    out.push_str(&format!("design,scale,{},\n", project.design.scale));
    out
}

fn pdf_document(project: &Project) -> Value {
    json!({
        "project_summary": {
            "name": project.name,
            "industry": project.industry,
            "description": project.description,
            "status": project.status,
        },
        "design": project.design,
        "components": project.components,
        "design_parameters": project.design_parameters,
        "analysis_results": project.analysis_results,
    })
}

/// Width and height of a component outline, scaled by the design scale.
fn outline(properties: &Value, scale: f64) -> Option<(f64, f64)> {
    let dims = properties.get("dimensions")?;
    let get = |key: &str| dims.get(key).and_then(Value::as_f64);
    let width = get("width").or_else(|| get("length"))?;
    let height = get("height").or_else(|| get("depth")).or_else(|| get("thickness"))?;
    Some((width * scale, height * scale))
}

fn dxf_layer(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

fn dxf_line(out: &mut String, layer: &str, from: (f64, f64), to: (f64, f64)) {
    out.push_str(&format!(
        "0\nLINE\n8\n{}\n10\n{:.3}\n20\n{:.3}\n30\n0.0\n11\n{:.3}\n21\n{:.3}\n31\n0.0\n",
        layer, from.0, from.1, to.0, to.1
    ));
}

fn to_dxf(project: &Project) -> String {
    let mut out = String::from("0\nSECTION\n2\nENTITIES\n");
    let mut x = 0.0;
    for component in &project.components {
        let Some((w, h)) = outline(&component.properties, project.design.scale) else {
            continue;
        };
        let layer = dxf_layer(&component.name);
        let corners = [(x, 0.0), (x + w, 0.0), (x + w, h), (x, h)];
        for i in 0..corners.len() {
            dxf_line(&mut out, &layer, corners[i], corners[(i + 1) % corners.len()]);
        }
        x += w + DXF_SPACING;
    }
    out.push_str("0\nENDSEC\n0\nEOF\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::design_command::DesignState;
    use crate::common::models::{DesignParameter, ProjectComponent};
    use std::collections::BTreeMap;

    fn project() -> Project {
        let now = Some(timestamp_now());
        Project {
            id: "p1".into(),
            name: "Chair".into(),
            industry: "furniture".into(),
            description: None,
            template_id: Some("chair".into()),
            reference_image: None,
            created_at: now.clone(),
            updated_at: now,
            status: "draft".into(),
            design: DesignState::default(),
            components: vec![
                ProjectComponent {
                    name: "Seat".into(),
                    required: true,
                    selected_material: Some("oak".into()),
                    properties: json!({ "dimensions": { "width": 45, "depth": 45, "height": 5 } }),
                    status: "pending".into(),
                },
                ProjectComponent {
                    name: "Cushion, soft".into(),
                    required: false,
                    selected_material: None,
                    properties: json!({ "padding": "foam" }),
                    status: "pending".into(),
                },
            ],
            materials: vec!["oak".into()],
            manufacturing_processes: vec![],
            design_parameters: BTreeMap::from([(
                "style".to_string(),
                DesignParameter { options: vec!["modern".into()], selected: Some("modern".into()) },
            )]),
            analysis_results: None,
            version_history: vec![],
            extra: Default::default(),
        }
    }

    #[test]
    fn dxf_format_is_echoed_in_metadata() {
        let data = export_project(&project(), "dxf").unwrap();
        assert_eq!(data.metadata.format, "dxf");
        assert_eq!(data.file_extension, "dxf");
        let drawing = data.content.as_str().unwrap();
        assert!(drawing.starts_with("0\nSECTION\n2\nENTITIES\n"));
        assert!(drawing.ends_with("0\nEOF\n"));
        // only the seat has dimensions: one rectangle
        assert_eq!(drawing.matches("\nLINE\n").count(), 4);
        assert!(drawing.contains("\n8\nSEAT\n"));
    }

    #[test]
    fn csv_escapes_fields() {
        let data = export_project(&project(), "csv").unwrap();
        let text = data.content.as_str().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "type,name,value,required");
        assert_eq!(lines[1], "component,Seat,oak,true");
        assert_eq!(lines[2], "component,\"Cushion, soft\",,false");
        assert_eq!(lines[3], "parameter,style,modern,");
    }

    #[test]
    fn json_and_pdf_exports() {
        let json_export = export_project(&project(), "json").unwrap();
        assert_eq!(json_export.content["name"], "Chair");

        let pdf = export_project(&project(), "pdf").unwrap();
        assert_eq!(pdf.content["project_summary"]["industry"], "furniture");
        assert_eq!(pdf.file_extension, "pdf");
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let err = export_project(&project(), "docx").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported export format: docx");
    }
}
