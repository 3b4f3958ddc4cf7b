use std::sync::Arc;

use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;

use crate::server::catalog::Catalog;
use crate::server::config::ServerConfig;
use crate::server::database::Database;
use crate::server::routes::{self, AppState};

pub struct Server {
    pub db: Arc<Database>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServerConfig>,
}

impl Server {
    /// Opens the database, runs the migrations and loads the catalog.
    pub async fn bootstrap(config: ServerConfig) -> anyhow::Result<Self> {
        let db = Arc::new(Database::connect(&config.database_url).await?);

        info!("🗄️ Running database migrations...");
        db.migrate().await.map_err(|e| {
            error!("Database migration failed: {}", e);
            e
        })?;
        info!("✅ Database migrations completed successfully");

        let catalog = Arc::new(Catalog::from_config(&config)?);
        Ok(Self { db, catalog, config: Arc::new(config) })
    }

    pub fn router(&self) -> Router {
        routes::router(AppState {
            db: self.db.clone(),
            catalog: self.catalog.clone(),
            config: self.config.clone(),
        })
    }

    pub async fn run(&self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener; tests bind to port 0 and read
    /// the address back before calling this.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        info!("🚀 ProductPro API listening on http://{}/api", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
