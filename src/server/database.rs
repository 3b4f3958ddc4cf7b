use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub struct Database {
    pub pool: SqlitePool,
    /// Held across read-modify-write cycles on stored documents.
    writes: Arc<Mutex<()>>,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        info!("🔗 Connecting to database: {}", database_url);

        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            // Extract file path from database URL to create the parent directory if needed
            let file_path = if let Some(rest) = database_url.strip_prefix("sqlite://") {
                rest.split('?').next().unwrap_or(rest)
            } else if let Some(rest) = database_url.strip_prefix("sqlite:") {
                rest.split('?').next().unwrap_or(rest)
            } else {
                database_url
            };

            if let Some(parent) = std::path::Path::new(file_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;
                    debug!("📁 Created directory: {:?}", parent);
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every connection to :memory: is its own database, so keep a single one
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!("✅ Database connection successful");
        Ok(Self { pool, writes: Arc::new(Mutex::new(())) })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        // Projects are stored as whole JSON documents
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                industry TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
        "#).execute(&self.pool).await?;

        // Collaboration sessions
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS collaboration_sessions (
                session_id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                status TEXT NOT NULL
            );
        "#).execute(&self.pool).await?;

        // Uploaded reference images
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS uploads (
                id TEXT PRIMARY KEY,
                project_id TEXT,
                original_name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                content_type TEXT,
                size_bytes INTEGER NOT NULL,
                uploaded_at INTEGER NOT NULL
            );
        "#).execute(&self.pool).await?;

        Ok(())
    }

    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    pub async fn count(&self, table: Table) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table.name()))
            .fetch_one(&self.pool)
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Projects,
    CollaborationSessions,
    Uploads,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Projects => "projects",
            Table::CollaborationSessions => "collaboration_sessions",
            Table::Uploads => "uploads",
        }
    }
}
