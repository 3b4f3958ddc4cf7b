use std::env;
use std::path::PathBuf;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub catalog_path: Option<PathBuf>, // external catalog JSON, built-in one otherwise
    pub log_level: String,
    pub performance_log_path: String,
    pub performance_log_interval_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(5000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/productpro.db".to_string()),
            upload_dir: env::var("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("data/uploads")),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            catalog_path: env::var("CATALOG_PATH").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            performance_log_path: env::var("PERFORMANCE_LOG_PATH").unwrap_or_else(|_| "data/productpro_performance.log".to_string()),
            performance_log_interval_secs: env::var("PERFORMANCE_LOG_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(120),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
