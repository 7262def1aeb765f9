use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::operations::format_timestamp;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// Applied in order; names are recorded in `_migrations` and never reused.
const MIGRATIONS: &[Migration] = &[Migration {
    name: "001_init_schema",
    sql: include_str!("../../sql/001_init_schema.sql"),
}];

/// Applies every migration not yet recorded, each inside its own transaction.
/// Returns how many were applied.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, MigrationError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "_migrations" (
            "name" TEXT PRIMARY KEY NOT NULL,
            "appliedAt" TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<String> = sqlx::query_scalar(r#"SELECT "name" FROM "_migrations""#)
        .fetch_all(pool)
        .await?;

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|name| name == m.name))
        .collect();

    if pending.is_empty() {
        tracing::debug!(known = MIGRATIONS.len(), "schema up to date");
        return Ok(0);
    }

    for migration in &pending {
        apply(pool, migration).await?;
        tracing::info!(migration = migration.name, "migration applied");
    }

    Ok(pending.len())
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<(), MigrationError> {
    let failed = |source| MigrationError::Migration {
        name: migration.name.to_string(),
        source,
    };

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(migration.sql)
        .execute(&mut *tx)
        .await
        .map_err(failed)?;
    sqlx::query(r#"INSERT INTO "_migrations" ("name", "appliedAt") VALUES (?, ?)"#)
        .bind(migration.name)
        .bind(format_timestamp(&Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(failed)?;
    tx.commit().await.map_err(failed)?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("migration {name} failed: {source}")]
    Migration {
        name: String,
        #[source]
        source: sqlx::Error,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
