use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::adaptive::types::{LearningPace, LearningStyle, Learner};
use crate::db::operations::{format_timestamp, parse_timestamp};
use crate::store::StoreError;

pub async fn get_learner(
    pool: &SqlitePool,
    learner_id: &str,
) -> Result<Option<Learner>, StoreError> {
    let row = sqlx::query(r#"SELECT * FROM "learners" WHERE "id" = ? LIMIT 1"#)
        .bind(learner_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| map_learner(&r)).transpose()
}

pub async fn insert_learner(pool: &SqlitePool, learner: &Learner) -> Result<(), StoreError> {
    let current_skills = serde_json::to_string(&learner.current_skills)?;
    let target_skills = serde_json::to_string(&learner.target_skills)?;

    sqlx::query(
        r#"
        INSERT INTO "learners" (
            "id", "email", "fullName", "role", "department", "currentSkills", "targetSkills",
            "preferredLearningStyle", "learningPace", "createdAt"
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&learner.id)
    .bind(&learner.email)
    .bind(&learner.full_name)
    .bind(&learner.role)
    .bind(&learner.department)
    .bind(current_skills)
    .bind(target_skills)
    .bind(learner.preferred_learning_style.as_str())
    .bind(learner.learning_pace.as_str())
    .bind(format_timestamp(&learner.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

fn map_learner(row: &SqliteRow) -> Result<Learner, StoreError> {
    let current_skills: String = row.try_get("currentSkills")?;
    let target_skills: String = row.try_get("targetSkills")?;
    let style: String = row.try_get("preferredLearningStyle")?;
    let pace: String = row.try_get("learningPace")?;
    let created_at: String = row.try_get("createdAt")?;

    Ok(Learner {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        full_name: row.try_get("fullName")?,
        role: row.try_get("role")?,
        department: row.try_get("department")?,
        current_skills: parse_skills(&current_skills)?,
        target_skills: parse_skills(&target_skills)?,
        preferred_learning_style: LearningStyle::parse(&style),
        learning_pace: LearningPace::parse(&pace),
        created_at: parse_timestamp(&created_at)?,
    })
}

fn parse_skills(raw: &str) -> Result<Vec<String>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}
