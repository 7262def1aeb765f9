use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use crate::adaptive::types::SkillMastery;
use crate::db::operations::{format_timestamp, parse_timestamp};
use crate::store::StoreError;

pub async fn find_by_learner(
    pool: &SqlitePool,
    learner_id: &str,
) -> Result<Vec<SkillMastery>, StoreError> {
    let rows = sqlx::query(
        r#"SELECT * FROM "skill_mastery" WHERE "learnerId" = ? ORDER BY "skillName" ASC"#,
    )
    .bind(learner_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_mastery).collect()
}

pub async fn get_mastery(
    pool: &SqlitePool,
    learner_id: &str,
    skill_name: &str,
) -> Result<Option<SkillMastery>, StoreError> {
    let row = sqlx::query(
        r#"SELECT * FROM "skill_mastery" WHERE "learnerId" = ? AND "skillName" = ? LIMIT 1"#,
    )
    .bind(learner_id)
    .bind(skill_name)
    .fetch_optional(pool)
    .await?;

    row.map(|r| map_mastery(&r)).transpose()
}

pub async fn upsert_mastery<'e, E>(executor: E, row: &SkillMastery) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO "skill_mastery" ("learnerId", "skillName", "proficiency", "lastUpdated")
        VALUES (?, ?, ?, ?)
        ON CONFLICT ("learnerId", "skillName") DO UPDATE SET
            "proficiency" = excluded."proficiency",
            "lastUpdated" = excluded."lastUpdated"
        "#,
    )
    .bind(&row.learner_id)
    .bind(&row.skill_name)
    .bind(row.proficiency)
    .bind(format_timestamp(&row.last_updated))
    .execute(executor)
    .await?;

    Ok(())
}

fn map_mastery(row: &SqliteRow) -> Result<SkillMastery, StoreError> {
    let last_updated: String = row.try_get("lastUpdated")?;
    let proficiency: f64 = row.try_get("proficiency")?;

    Ok(SkillMastery {
        learner_id: row.try_get("learnerId")?,
        skill_name: row.try_get("skillName")?,
        proficiency: proficiency.clamp(0.0, 100.0),
        last_updated: parse_timestamp(&last_updated)?,
    })
}
