//! Database layer
//!
//! SeaORM entities for the webtrees tables, a primary/replica pool and the
//! [`Repository`] implementing the storage traits.

pub mod models;
mod repository;

pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use models::TreeEntity;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use std::time::Duration;
use tracing::{debug, info};

/// Primary connection for block settings, plus an optional replica that
/// serves record and preference reads.
#[derive(Clone)]
pub struct DbPool {
    pub primary: DatabaseConnection,
    pub replica: Option<DatabaseConnection>,
}

/// Pool options shared by primary and replica.
fn connect_options(url: &str, config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(false);
    options
}

async fn connect(role: &'static str, url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
    info!(role, max_connections = config.max_connections, "Connecting to webtrees database");

    Database::connect(connect_options(url, config))
        .await
        .map_err(|e| AppError::DatabaseConnection {
            message: format!("Failed to connect to {}: {}", role, e),
        })
}

/// Count the trees through `conn`. Fails when the webtrees schema is missing.
async fn count_trees(role: &'static str, conn: &DatabaseConnection) -> Result<u64> {
    TreeEntity::find()
        .count(conn)
        .await
        .map_err(|e| AppError::DatabaseConnection {
            message: format!("{} has no usable webtrees schema: {}", role, e),
        })
}

impl DbPool {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let primary = connect("primary", &config.url, config).await?;

        let replica = match config.read_url.as_deref() {
            Some(read_url) => Some(connect("replica", read_url, config).await?),
            None => None,
        };

        let pool = Self { primary, replica };
        let trees = count_trees("primary", &pool.primary).await?;
        info!(trees, replica = pool.replica.is_some(), "Database ready");

        Ok(pool)
    }

    /// Replica if configured, otherwise the primary.
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Check that every connection still reaches the tree table.
    pub async fn ping(&self) -> Result<()> {
        let trees = count_trees("primary", &self.primary).await?;
        if let Some(replica) = &self.replica {
            count_trees("replica", replica).await?;
        }

        debug!(trees, "Database ping");
        Ok(())
    }
}
