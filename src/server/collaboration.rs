use chrono::Utc;
use log::info;

use crate::common::models::{timestamp_now, CollaborationSession, SESSION_STATUS_ACTIVE};
use crate::server::database::Database;
use crate::server::error::{ServiceError, ServiceResult};
use crate::server::projects;

pub async fn create_session(db: &Database, project_id: Option<&str>, name: Option<&str>) -> ServiceResult<CollaborationSession> {
    let project_id = project_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::bad_request("Missing project_id"))?;
    let project = projects::get_project(db, project_id).await?;

    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => CollaborationSession::default_name(&project.name),
    };

    let session = CollaborationSession {
        session_id: uuid::Uuid::new_v4().to_string(),
        project_id: project.id,
        name,
        created_at: Some(timestamp_now()),
        status: SESSION_STATUS_ACTIVE.to_string(),
    };

    sqlx::query("INSERT INTO collaboration_sessions (session_id, project_id, name, created_at, status) VALUES (?, ?, ?, ?, ?)")
        .bind(&session.session_id)
        .bind(&session.project_id)
        .bind(&session.name)
        .bind(Utc::now().timestamp())
        .bind(&session.status)
        .execute(&db.pool)
        .await?;

    info!("🤝 Created collaboration session {} for project {}", session.session_id, session.project_id);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::models::NewProject;
    use crate::server::catalog::Catalog;
    use crate::server::database::Table;

    async fn setup() -> (Database, String) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let catalog = Catalog::builtin().unwrap();
        let project = projects::create_project(&db, &catalog, NewProject::new("Desk Lamp", "furniture")).await.unwrap();
        (db, project.id)
    }

    #[tokio::test]
    async fn name_defaults_to_project_name() {
        let (db, project_id) = setup().await;
        let session = create_session(&db, Some(&project_id), None).await.unwrap();
        assert_eq!(session.name, "Collaboration on Desk Lamp");
        assert_eq!(session.status, "active");

        let blank = create_session(&db, Some(&project_id), Some("  ")).await.unwrap();
        assert_eq!(blank.name, "Collaboration on Desk Lamp");

        assert_eq!(db.count(Table::CollaborationSessions).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn explicit_name_is_kept() {
        let (db, project_id) = setup().await;
        let session = create_session(&db, Some(&project_id), Some("Review round")).await.unwrap();
        assert_eq!(session.name, "Review round");
    }

    #[tokio::test]
    async fn requires_existing_project() {
        let (db, _) = setup().await;
        let err = create_session(&db, None, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing project_id");
        let err = create_session(&db, Some("ghost"), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
