use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use log::{info, warn};
use serde_json::{Map, Value};
use sqlx::{Row, SqliteConnection};

use crate::common::design_command::{DesignAdjustment, DesignState};
use crate::common::models::{
    timestamp_now, AnalysisReport, AnalysisSummary, DesignParameter, NewProject, Project, ProjectComponent,
    ProjectVersion, Recommendation, Recommendations, VisualComponent, VisualMaterial, Visualization,
    PROJECT_STATUS_DRAFT,
};
use crate::server::catalog::Catalog;
use crate::server::database::Database;
use crate::server::error::{ServiceError, ServiceResult};

/// Fields a client update may never overwrite.
const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "version_history"];

const LOW_SUSTAINABILITY: f64 = 0.5;

pub async fn create_project(db: &Database, catalog: &Catalog, new: NewProject) -> ServiceResult<Project> {
    if new.name.trim().is_empty() || new.industry.trim().is_empty() {
        return Err(ServiceError::bad_request("Missing required fields"));
    }

    let now = timestamp_now();
    let mut project = Project {
        id: uuid::Uuid::new_v4().to_string(),
        description: Some(new.description.unwrap_or_else(|| format!("Design project for {}", new.name))),
        name: new.name,
        industry: new.industry,
        template_id: new.template_id,
        reference_image: new.reference_image,
        created_at: Some(now.clone()),
        updated_at: Some(now),
        status: PROJECT_STATUS_DRAFT.to_string(),
        design: DesignState::default(),
        components: Vec::new(),
        materials: Vec::new(),
        manufacturing_processes: Vec::new(),
        design_parameters: BTreeMap::new(),
        analysis_results: None,
        version_history: Vec::new(),
        extra: Map::new(),
    };

    if let Some(template_id) = project.template_id.as_deref() {
        match catalog.template(&project.industry, template_id) {
            Some(template) => {
                project.components = template
                    .components
                    .iter()
                    .map(|c| ProjectComponent {
                        name: c.name.clone(),
                        required: c.required,
                        selected_material: None,
                        properties: c.properties.clone(),
                        status: "pending".to_string(),
                    })
                    .collect();
                project.design_parameters = template
                    .design_parameters
                    .iter()
                    .map(|(name, options)| (name.clone(), DesignParameter { options: options.clone(), selected: None }))
                    .collect();
                project.manufacturing_processes = template.manufacturing_processes.clone();
            }
            None => warn!("Template not found: {}/{}", project.industry, template_id),
        }
    }

    insert_project(db, &project).await?;
    info!("Created design project: {}", project.id);
    Ok(project)
}

async fn insert_project(db: &Database, project: &Project) -> ServiceResult<()> {
    let data = serde_json::to_string(project)?;
    let now = Utc::now().timestamp();
    sqlx::query("INSERT INTO projects (id, name, industry, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)")
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.industry)
        .bind(data)
        .bind(now)
        .bind(now)
        .execute(&db.pool)
        .await?;
    Ok(())
}

async fn write_project(conn: &mut SqliteConnection, project: &Project) -> ServiceResult<()> {
    let data = serde_json::to_string(project)?;
    let res = sqlx::query("UPDATE projects SET name = ?, industry = ?, data = ?, updated_at = ? WHERE id = ?")
        .bind(&project.name)
        .bind(&project.industry)
        .bind(data)
        .bind(Utc::now().timestamp())
        .bind(&project.id)
        .execute(conn)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ServiceError::not_found("Project not found"));
    }
    Ok(())
}

/// Loads, changes and stores one project as a single step. The write lock
/// and the transaction cover the read as well as the write, so concurrent
/// changes to the same project are applied one after the other.
pub async fn modify_project<T, F>(db: &Database, project_id: &str, change: F) -> ServiceResult<(Project, T)>
where
    F: FnOnce(&mut Project) -> ServiceResult<T>,
{
    let _guard = db.write_lock().await;
    let mut tx = db.pool.begin().await?;

    let row = sqlx::query("SELECT data FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
    let mut project: Project = match row {
        Some(r) => serde_json::from_str(&r.get::<String, _>("data"))?,
        None => return Err(ServiceError::not_found("Project not found")),
    };

    // an early return drops the transaction, which rolls it back
    let output = change(&mut project)?;
    write_project(&mut tx, &project).await?;
    tx.commit().await?;
    Ok((project, output))
}

pub async fn list_projects(db: &Database) -> ServiceResult<Vec<Project>> {
    let rows = sqlx::query("SELECT data FROM projects ORDER BY created_at ASC, rowid ASC")
        .fetch_all(&db.pool)
        .await?;
    rows.iter()
        .map(|r| serde_json::from_str::<Project>(&r.get::<String, _>("data")).map_err(ServiceError::from))
        .collect()
}

pub async fn get_project(db: &Database, project_id: &str) -> ServiceResult<Project> {
    let row = sqlx::query("SELECT data FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_optional(&db.pool)
        .await?;
    match row {
        Some(r) => Ok(serde_json::from_str(&r.get::<String, _>("data"))?),
        None => Err(ServiceError::not_found("Project not found")),
    }
}

/// Merges the submitted fields into the stored project. The previous
/// state is appended to `version_history` first.
pub async fn update_project(db: &Database, project_id: &str, updates: Value) -> ServiceResult<Project> {
    let updates = match updates {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(ServiceError::bad_request("Missing update data")),
    };

    let (updated, ()) = modify_project(db, project_id, |project| {
        record_version(project)?;

        let mut doc = serde_json::to_value(&*project)?;
        if let Value::Object(fields) = &mut doc {
            for (key, value) in updates {
                if !PROTECTED_FIELDS.contains(&key.as_str()) {
                    fields.insert(key, value);
                }
            }
        }
        let mut updated: Project = serde_json::from_value(doc)
            .map_err(|e| ServiceError::bad_request(format!("Invalid project update: {}", e)))?;
        updated.updated_at = Some(timestamp_now());
        *project = updated;
        Ok(())
    })
    .await?;

    info!("Updated design project: {}", project_id);
    Ok(updated)
}

pub async fn delete_project(db: &Database, project_id: &str) -> ServiceResult<()> {
    let res = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project_id)
        .execute(&db.pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ServiceError::not_found("Project not found"));
    }
    info!("Deleted design project: {}", project_id);
    Ok(())
}

pub async fn apply_adjustments(db: &Database, project_id: &str, adjustments: &[DesignAdjustment]) -> ServiceResult<Project> {
    if adjustments.is_empty() {
        return get_project(db, project_id).await;
    }
    let (project, ()) = modify_project(db, project_id, |project| {
        record_version(project)?;
        project.design.apply_all(adjustments);
        project.updated_at = Some(timestamp_now());
        Ok(())
    })
    .await?;
    Ok(project)
}

fn record_version(project: &mut Project) -> ServiceResult<()> {
    let version = ProjectVersion {
        version: project.version_history.len() as u32 + 1,
        recorded_at: project.updated_at.clone(),
        name: project.name.clone(),
        industry: project.industry.clone(),
        status: project.status.clone(),
        design: project.design.clone(),
        materials: project.materials.clone(),
    };
    project.version_history.push(serde_json::to_value(version)?);
    Ok(())
}

/// Material ids in use: the project list plus any component selection.
fn selected_material_ids(project: &Project) -> BTreeSet<String> {
    project
        .materials
        .iter()
        .cloned()
        .chain(project.components.iter().filter_map(|c| c.selected_material.clone()))
        .collect()
}

pub fn sustainability_level(score: Option<f64>) -> &'static str {
    match score {
        Some(s) if s >= 0.75 => "High",
        Some(s) if s >= LOW_SUSTAINABILITY => "Medium",
        Some(_) => "Low",
        None => "Unknown",
    }
}

pub fn analyze(project: &Project, catalog: &Catalog) -> AnalysisReport {
    let scores: Vec<f64> = selected_material_ids(project)
        .iter()
        .filter_map(|id| catalog.material(id))
        .map(|m| m.sustainability_score)
        .collect();
    let average_sustainability = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    AnalysisReport {
        timestamp: Some(timestamp_now()),
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        industry: project.industry.clone(),
        component_count: project.components.len(),
        components_with_material: project.components.iter().filter(|c| c.selected_material.is_some()).count(),
        unselected_components: project
            .components
            .iter()
            .filter(|c| c.selected_material.is_none())
            .map(|c| c.name.clone())
            .collect(),
        parameters_selected: project.design_parameters.values().filter(|p| p.selected.is_some()).count(),
        parameters_total: project.design_parameters.len(),
        average_sustainability,
        sustainability_level: sustainability_level(average_sustainability).to_string(),
    }
}

pub async fn analyze_project(db: &Database, catalog: &Catalog, project_id: &str) -> ServiceResult<AnalysisReport> {
    let (_, report) = modify_project(db, project_id, |project| {
        let report = analyze(project, catalog);
        project.analysis_results = Some(serde_json::to_value(&report)?);
        project.updated_at = Some(timestamp_now());
        Ok(report)
    })
    .await?;
    info!("Analyzed design for project: {}", project_id);
    Ok(report)
}

pub fn recommend(project: &Project, analysis: &AnalysisReport, catalog: &Catalog) -> Recommendations {
    let mut categories: BTreeMap<String, Vec<Recommendation>> = BTreeMap::new();

    let mut common = catalog.common_materials(&project.industry);
    common.sort_by(|a, b| b.sustainability_score.total_cmp(&a.sustainability_score));
    let common_ids: Vec<String> = common.iter().take(3).map(|m| m.id.clone()).collect();

    let materials: Vec<Recommendation> = project
        .components
        .iter()
        .filter(|c| c.selected_material.is_none())
        .map(|c| Recommendation {
            target: c.name.clone(),
            suggestion: format!("Select a material for {}", c.name),
            alternatives: common_ids.clone(),
            priority: if c.required { "High" } else { "Low" }.to_string(),
        })
        .collect();
    if !materials.is_empty() {
        categories.insert("materials".to_string(), materials);
    }

    let parameters: Vec<Recommendation> = project
        .design_parameters
        .iter()
        .filter(|(_, p)| p.selected.is_none() && !p.options.is_empty())
        .map(|(name, p)| Recommendation {
            target: name.clone(),
            suggestion: format!("Choose a {} (for example {})", name.replace('_', " "), p.options[0]),
            alternatives: p.options.clone(),
            priority: "Medium".to_string(),
        })
        .collect();
    if !parameters.is_empty() {
        categories.insert("design_parameters".to_string(), parameters);
    }

    if analysis.average_sustainability.map_or(false, |s| s < LOW_SUSTAINABILITY) {
        let sustainability: Vec<Recommendation> = selected_material_ids(project)
            .iter()
            .filter_map(|id| catalog.material(id))
            .filter(|m| m.sustainability_score < LOW_SUSTAINABILITY)
            .map(|m| {
                let mut alternatives = catalog.sustainable_materials(Some(&m.category), None);
                if alternatives.is_empty() {
                    alternatives = catalog.sustainable_materials(None, None);
                }
                Recommendation {
                    target: m.id.clone(),
                    suggestion: format!("Replace {} with a more sustainable material", m.name),
                    alternatives: alternatives.into_iter().take(3).map(|a| a.id).collect(),
                    priority: if m.sustainability_score < 0.4 { "High" } else { "Medium" }.to_string(),
                }
            })
            .collect();
        if !sustainability.is_empty() {
            categories.insert("sustainability".to_string(), sustainability);
        }
    }

    Recommendations {
        timestamp: Some(timestamp_now()),
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        industry: project.industry.clone(),
        categories,
    }
}

pub async fn project_recommendations(db: &Database, catalog: &Catalog, project_id: &str) -> ServiceResult<Recommendations> {
    let project = get_project(db, project_id).await?;
    let analysis = match project.analysis() {
        Some(analysis) => analysis,
        None => analyze_project(db, catalog, project_id).await?,
    };
    let recommendations = recommend(&project, &analysis, catalog);
    info!("Generated {} design recommendations for project: {}", recommendations.total(), project_id);
    Ok(recommendations)
}

pub fn visualize(project: &Project, catalog: &Catalog) -> Visualization {
    let summary = project.analysis().map(|a| {
        let done = a.components_with_material + a.parameters_selected;
        let total = a.component_count + a.parameters_total;
        AnalysisSummary {
            sustainability_score: a.average_sustainability,
            sustainability_level: a.sustainability_level.clone(),
            completeness: if total == 0 { 1.0 } else { done as f64 / total as f64 },
        }
    });

    Visualization {
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        industry: project.industry.clone(),
        design: project.design.clone(),
        components: project
            .components
            .iter()
            .map(|c| VisualComponent {
                name: c.name.clone(),
                material: c.selected_material.clone(),
                properties: c.properties.clone(),
            })
            .collect(),
        materials: project
            .materials
            .iter()
            .map(|id| {
                let material = catalog.material(id);
                VisualMaterial {
                    id: id.clone(),
                    name: material.map(|m| m.name.clone()),
                    category: material.map(|m| m.category.clone()),
                }
            })
            .collect(),
        parameters: project
            .design_parameters
            .iter()
            .map(|(name, p)| (name.clone(), p.selected.clone()))
            .collect(),
        analysis_summary: summary,
    }
}
