// src/server/main.rs
// Entry point for the ProductPro API server
use productpro::server::{config::ServerConfig, connection::Server};
use productpro::utils::performance;
use std::time::Duration;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // LOG_LEVEL drives env_logger through RUST_LOG
    std::env::set_var("RUST_LOG", &config.log_level);
    env_logger::init();

    info!("📂 Uploads are stored in {}", config.upload_dir.display());
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let server = Server::bootstrap(config.clone()).await?;

    // Start performance logger in background
    let perf_db = server.db.clone();
    let perf_log_path = config.performance_log_path.clone();
    let interval = Duration::from_secs(config.performance_log_interval_secs.max(1));
    tokio::spawn(async move {
        info!("📊 Starting performance logger - logging every {} seconds to: {}", interval.as_secs(), perf_log_path);
        performance::start_performance_logger(perf_db, &perf_log_path, interval).await;
    });

    server.run(&config.bind_addr()).await?;
    Ok(())
}
