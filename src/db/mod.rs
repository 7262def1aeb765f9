pub mod config;
pub mod migrate;
pub mod operations;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::config::{DbConfig, DbConfigError};
use crate::db::migrate::MigrationError;

/// SQLite-backed implementation of every store trait.
#[derive(Clone)]
pub struct Database {
    config: DbConfig,
    pool: SqlitePool,
}

impl Database {
    pub async fn from_env() -> Result<Self, DbInitError> {
        let config = DbConfig::from_env()?;
        Self::connect(config).await
    }

    pub async fn connect(config: DbConfig) -> Result<Self, DbInitError> {
        ensure_parent_dir(&config.url);

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(config.journal_mode.to_sqlx())
            .busy_timeout(config.busy_timeout)
            .foreign_keys(config.foreign_keys);

        // An in-memory database lives only as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::debug!(url = %config.url, "database pool ready");

        Ok(Self { config, pool })
    }

    /// Fresh, migrated in-memory database.
    pub async fn in_memory() -> Result<Self, DbInitError> {
        let db = Self::connect(DbConfig::in_memory()).await?;
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<usize, MigrationError> {
        migrate::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

fn ensure_parent_dir(url: &str) {
    let Some(path) = sqlite_file_path(url) else {
        return;
    };
    if let Some(parent) = Path::new(path).parent() {
        if parent.as_os_str().is_empty() {
            return;
        }
        if let Err(err) = std::fs::create_dir_all(parent) {
            tracing::warn!(
                error = %err,
                dir = %parent.display(),
                "failed to create database directory"
            );
        }
    }
}

fn sqlite_file_path(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty() && !path.starts_with(":memory:")).then_some(path)
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error(transparent)]
    Config(#[from] DbConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}
