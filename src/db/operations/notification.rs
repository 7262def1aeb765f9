use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::adaptive::types::{Notification, NotificationKind};
use crate::db::operations::{format_timestamp, parse_timestamp};
use crate::store::StoreError;

pub async fn insert_notification(
    pool: &SqlitePool,
    item: &Notification,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO "notifications" (
            "id", "learnerId", "kind", "message", "topic", "isRead", "createdAt"
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.learner_id)
    .bind(item.kind.as_str())
    .bind(&item.message)
    .bind(&item.topic)
    .bind(item.is_read)
    .bind(format_timestamp(&item.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_by_learner(
    pool: &SqlitePool,
    learner_id: &str,
) -> Result<Vec<Notification>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "notifications"
        WHERE "learnerId" = ?
        ORDER BY "createdAt" DESC, "rowid" DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_notification).collect()
}

pub async fn has_unread_topic(
    pool: &SqlitePool,
    learner_id: &str,
    topic: &str,
) -> Result<bool, StoreError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM "notifications"
        WHERE "learnerId" = ? AND "topic" = ? AND "isRead" = 0
        "#,
    )
    .bind(learner_id)
    .bind(topic)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

pub async fn mark_read(pool: &SqlitePool, notification_id: &str) -> Result<bool, StoreError> {
    let result = sqlx::query(r#"UPDATE "notifications" SET "isRead" = 1 WHERE "id" = ?"#)
        .bind(notification_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn map_notification(row: &SqliteRow) -> Result<Notification, StoreError> {
    let kind: String = row.try_get("kind")?;
    let created_at: String = row.try_get("createdAt")?;

    Ok(Notification {
        id: row.try_get("id")?,
        learner_id: row.try_get("learnerId")?,
        kind: NotificationKind::parse(&kind),
        message: row.try_get("message")?,
        topic: row.try_get("topic")?,
        is_read: row.try_get("isRead")?,
        created_at: parse_timestamp(&created_at)?,
    })
}
