use productpro::server::config::ServerConfig;
use productpro::server::database::Database;
use sqlx::Row;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let db_path = std::env::args().nth(1).unwrap_or_else(|| ServerConfig::from_env().database_url);
    println!("Connecting to {}", db_path);
    let db = Database::connect(&db_path).await?;

    println!("\n-- projects --");
    let rows = sqlx::query("SELECT id, name, industry, created_at, updated_at, length(data) AS size FROM projects ORDER BY created_at")
        .fetch_all(&db.pool)
        .await?;
    for r in rows.iter() {
        let id: String = r.try_get("id").unwrap_or_default();
        let name: String = r.try_get("name").unwrap_or_default();
        let industry: String = r.try_get("industry").unwrap_or_default();
        let created_at: i64 = r.try_get("created_at").unwrap_or(0);
        let updated_at: i64 = r.try_get("updated_at").unwrap_or(0);
        let size: i64 = r.try_get("size").unwrap_or(0);
        println!("id={} name={} industry={} created_at={} updated_at={} data_len={}",
                 id, name, industry, created_at, updated_at, size);
    }

    println!("\n-- collaboration_sessions --");
    let rows = sqlx::query("SELECT session_id, project_id, name, status, created_at FROM collaboration_sessions ORDER BY created_at")
        .fetch_all(&db.pool)
        .await?;
    for r in rows.iter() {
        let session_id: String = r.try_get("session_id").unwrap_or_default();
        let project_id: String = r.try_get("project_id").unwrap_or_default();
        let name: String = r.try_get("name").unwrap_or_default();
        let status: String = r.try_get("status").unwrap_or_default();
        let created_at: i64 = r.try_get("created_at").unwrap_or(0);
        println!("session_id={} project_id={} name={} status={} created_at={}", session_id, project_id, name, status, created_at);
    }

    println!("\n-- uploads (last 10) --");
    let rows = sqlx::query("SELECT id, project_id, original_name, file_path, size_bytes, uploaded_at FROM uploads ORDER BY uploaded_at DESC LIMIT 10")
        .fetch_all(&db.pool)
        .await?;
    for r in rows.iter() {
        let id: String = r.try_get("id").unwrap_or_default();
        let project_id: Option<String> = r.try_get("project_id").unwrap_or(None);
        let original_name: String = r.try_get("original_name").unwrap_or_default();
        let file_path: String = r.try_get("file_path").unwrap_or_default();
        let size_bytes: i64 = r.try_get("size_bytes").unwrap_or(0);
        let uploaded_at: i64 = r.try_get("uploaded_at").unwrap_or(0);
        println!("id={} project_id={} name={} path={} size={} uploaded_at={}",
                 id, project_id.unwrap_or_else(|| "-".to_string()), original_name, file_path, size_bytes, uploaded_at);
    }

    Ok(())
}
