use chrono::Utc;
use sysinfo::System;
use std::{fs::OpenOptions, io::Write, path::Path, sync::Arc, time::Duration};
use tokio::time;
use crate::server::database::{Database, Table};
use log::{info, error, warn};

pub async fn start_performance_logger(db: Arc<Database>, log_path: &str, interval: Duration) {
    let mut system = System::new_all();

    if let Some(parent) = Path::new(log_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Unable to create directory for performance log '{}': {}", log_path, e);
                return;
            }
        }
    }

    let mut file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path) {
        Ok(f) => f,
        Err(e) => {
            error!("Unable to open performance log file '{}': {}", log_path, e);
            return;
        }
    };

    // Header only for a fresh file
    if file.metadata().map(|m| m.len()).unwrap_or(0) == 0 {
        if let Err(e) = writeln!(file, "# ProductPro Server Performance Log\n# Timestamp, Projects, Collaboration_Sessions, Uploads, CPU_Usage") {
            error!("Failed to write header to performance log: {}", e);
            return;
        }
        info!("📊 Performance log initialized: {}", log_path);
    }

    loop {
        system.refresh_cpu();
        let cpus = system.cpus();
        let cpu_usage = if cpus.is_empty() {
            0.0
        } else {
            cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
        };
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let projects = table_count(&db, Table::Projects).await;
        let sessions = table_count(&db, Table::CollaborationSessions).await;
        let uploads = table_count(&db, Table::Uploads).await;

        info!("📊 Performance - Projects: {}, Sessions: {}, Uploads: {}, CPU: {:.1}%",
            projects, sessions, uploads, cpu_usage);

        if let Err(e) = writeln!(file, "{}, {}, {}, {}, {:.1}%", timestamp, projects, sessions, uploads, cpu_usage) {
            error!("Failed to write to performance log: {}", e);
        } else if let Err(e) = file.flush() {
            error!("Failed to flush performance log: {}", e);
        }

        time::sleep(interval).await;
    }
}

/// -1 marks a failed query in the log.
async fn table_count(db: &Database, table: Table) -> i64 {
    match db.count(table).await {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count {}: {}", table.name(), e);
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_header_and_first_sample() {
        let db = Arc::new(Database::connect("sqlite::memory:").await.unwrap());
        db.migrate().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("perf.log");
        let path_str = path.to_string_lossy().to_string();

        let logger = tokio::spawn(async move {
            start_performance_logger(db, &path_str, Duration::from_secs(3600)).await;
        });
        let mut content = String::new();
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            content = std::fs::read_to_string(&path).unwrap_or_default();
            if content.lines().count() >= 3 {
                break;
            }
        }
        logger.abort();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# ProductPro Server Performance Log");
        assert!(lines[2].contains(", 0, 0, 0, "));
    }

    #[tokio::test]
    async fn missing_table_counts_as_minus_one() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        assert_eq!(table_count(&db, Table::Uploads).await, -1);
    }
}
