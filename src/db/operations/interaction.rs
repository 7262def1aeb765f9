use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use crate::adaptive::types::{Interaction, InteractionStatus};
use crate::db::operations::{format_timestamp, parse_timestamp};
use crate::store::StoreError;

/// Newest first; ties keep the most recently inserted row on top.
pub async fn find_by_learner(
    pool: &SqlitePool,
    learner_id: &str,
) -> Result<Vec<Interaction>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "interactions"
        WHERE "learnerId" = ?
        ORDER BY "timestamp" DESC, "rowid" DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_interaction).collect()
}

/// Runs on a pool or inside an open transaction.
pub async fn insert_interaction<'e, E>(
    executor: E,
    interaction: &Interaction,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO "interactions" (
            "id", "learnerId", "assetId", "status", "score",
            "timeSpentSeconds", "attempts", "timestamp"
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&interaction.id)
    .bind(&interaction.learner_id)
    .bind(&interaction.asset_id)
    .bind(interaction.status.as_str())
    .bind(interaction.score)
    .bind(i64::from(interaction.time_spent_seconds))
    .bind(i64::from(interaction.attempts))
    .bind(format_timestamp(&interaction.timestamp))
    .execute(executor)
    .await?;

    Ok(())
}

fn map_interaction(row: &SqliteRow) -> Result<Interaction, StoreError> {
    let status: String = row.try_get("status")?;
    let time_spent: i64 = row.try_get("timeSpentSeconds")?;
    let attempts: i64 = row.try_get("attempts")?;
    let timestamp: String = row.try_get("timestamp")?;

    Ok(Interaction {
        id: row.try_get("id")?,
        learner_id: row.try_get("learnerId")?,
        asset_id: row.try_get("assetId")?,
        status: InteractionStatus::parse(&status),
        score: row.try_get("score")?,
        time_spent_seconds: u32::try_from(time_spent.max(0)).unwrap_or(u32::MAX),
        attempts: u32::try_from(attempts.max(0)).unwrap_or(u32::MAX),
        timestamp: parse_timestamp(&timestamp)?,
    })
}
