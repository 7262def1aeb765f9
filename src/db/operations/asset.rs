use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::adaptive::types::{Asset, ContentFormat, Difficulty};
use crate::db::operations::{format_timestamp, parse_timestamp};
use crate::store::{AssetFilter, StoreError};

pub async fn get_asset(pool: &SqlitePool, asset_id: &str) -> Result<Option<Asset>, StoreError> {
    let row = sqlx::query(r#"SELECT * FROM "assets" WHERE "id" = ? LIMIT 1"#)
        .bind(asset_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| map_asset(&r)).transpose()
}

pub async fn insert_asset(pool: &SqlitePool, asset: &Asset) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO "assets" (
            "id", "title", "description", "contentFormat", "skillTag", "difficultyLevel",
            "estimatedDurationMinutes", "cheatsheet", "isActive", "isArchived", "createdAt"
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&asset.id)
    .bind(&asset.title)
    .bind(&asset.description)
    .bind(asset.content_format.as_str())
    .bind(&asset.skill_tag)
    .bind(i64::from(asset.difficulty.value()))
    .bind(i64::from(asset.estimated_duration_minutes))
    .bind(&asset.cheatsheet)
    .bind(asset.is_active)
    .bind(asset.is_archived)
    .bind(format_timestamp(&asset.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn count_assets(pool: &SqlitePool) -> Result<u64, StoreError> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "assets""#)
        .fetch_one(pool)
        .await?;
    Ok(count.max(0) as u64)
}

pub async fn set_archived(
    pool: &SqlitePool,
    asset_id: &str,
    archived: bool,
) -> Result<bool, StoreError> {
    let result = sqlx::query(r#"UPDATE "assets" SET "isArchived" = ? WHERE "id" = ?"#)
        .bind(archived)
        .bind(asset_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Active, unarchived assets matching `filter`, oldest first.
pub async fn find_active_assets(
    pool: &SqlitePool,
    filter: &AssetFilter,
) -> Result<Vec<Asset>, StoreError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"SELECT * FROM "assets" WHERE "isActive" = 1 AND "isArchived" = 0"#,
    );

    if let Some(difficulty) = filter.difficulty {
        qb.push(r#" AND "difficultyLevel" = "#)
            .push_bind(i64::from(difficulty.value()));
    }

    if let Some(format) = filter.format {
        qb.push(r#" AND "contentFormat" = "#).push_bind(format.as_str());
    }

    if !filter.exclude_ids.is_empty() {
        qb.push(r#" AND "id" NOT IN ("#);
        let mut separated = qb.separated(", ");
        for id in &filter.exclude_ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");
    }

    qb.push(r#" ORDER BY "createdAt" ASC, "id" ASC"#);

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(map_asset).collect()
}

fn map_asset(row: &SqliteRow) -> Result<Asset, StoreError> {
    let id: String = row.try_get("id")?;
    let level: i64 = row.try_get("difficultyLevel")?;
    let difficulty = u8::try_from(level)
        .ok()
        .and_then(Difficulty::new)
        .ok_or_else(|| StoreError::InvalidData(format!("asset {id} has difficulty {level}")))?;
    let format: String = row.try_get("contentFormat")?;
    let minutes: i64 = row.try_get("estimatedDurationMinutes")?;
    let created_at: String = row.try_get("createdAt")?;

    Ok(Asset {
        id,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        content_format: ContentFormat::parse(&format),
        skill_tag: row.try_get("skillTag")?,
        difficulty,
        estimated_duration_minutes: u32::try_from(minutes.max(0)).unwrap_or(u32::MAX),
        cheatsheet: row.try_get("cheatsheet")?,
        is_active: row.try_get("isActive")?,
        is_archived: row.try_get("isArchived")?,
        created_at: parse_timestamp(&created_at)?,
    })
}
