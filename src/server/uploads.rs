use std::path::Path;

use chrono::Utc;
use log::{info, warn};

use crate::common::models::{timestamp_now, UploadAnalysis, UploadResult};
use crate::server::database::Database;
use crate::server::error::{ServiceError, ServiceResult};
use crate::server::projects;

pub struct IncomingImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Keeps ASCII letters, digits, '.', '-' and '_'; everything else becomes '_'.
pub fn sanitize_file_name(name: &str) -> String {
    // browsers may send a full client path
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

pub async fn store_image(
    db: &Database,
    upload_dir: &Path,
    image: IncomingImage,
    project_id: Option<&str>,
) -> ServiceResult<UploadResult> {
    if image.file_name.trim().is_empty() {
        return Err(ServiceError::bad_request("No selected file"));
    }

    // resolve the project before touching the disk
    if let Some(id) = project_id {
        projects::get_project(db, id).await?;
    }

    tokio::fs::create_dir_all(upload_dir).await?;
    let upload_id = uuid::Uuid::new_v4().to_string();
    let stored_name = format!("{}_{}", upload_id, sanitize_file_name(&image.file_name));
    let path = upload_dir.join(&stored_name);
    tokio::fs::write(&path, &image.bytes).await?;
    let file_path = path.to_string_lossy().to_string();
    let size_bytes = image.bytes.len() as u64;

    if let Err(e) = record_upload(db, &upload_id, project_id, &image, &file_path).await {
        if let Err(io) = tokio::fs::remove_file(&path).await {
            warn!("Could not remove orphaned upload {}: {}", path.display(), io);
        }
        return Err(e);
    }

    info!("🖼️ Stored upload {} ({} bytes)", stored_name, size_bytes);
    Ok(UploadResult {
        file_path,
        analysis: UploadAnalysis {
            file_name: image.file_name,
            content_type: image.content_type,
            size_bytes,
            project_id: project_id.map(str::to_string),
        },
    })
}

/// Inserts the upload row and points the project at the new file.
async fn record_upload(
    db: &Database,
    upload_id: &str,
    project_id: Option<&str>,
    image: &IncomingImage,
    file_path: &str,
) -> ServiceResult<()> {
    sqlx::query("INSERT INTO uploads (id, project_id, original_name, file_path, content_type, size_bytes, uploaded_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
        .bind(upload_id)
        .bind(project_id)
        .bind(&image.file_name)
        .bind(file_path)
        .bind(&image.content_type)
        .bind(image.bytes.len() as i64)
        .bind(Utc::now().timestamp())
        .execute(&db.pool)
        .await?;

    if let Some(id) = project_id {
        projects::modify_project(db, id, |project| {
            project.reference_image = Some(file_path.to_string());
            project.updated_at = Some(timestamp_now());
            Ok(())
        })
        .await?;
    }
    Ok(())
}
