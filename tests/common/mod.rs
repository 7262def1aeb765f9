#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use pdp_backend::adaptive::types::{
    Asset, ContentFormat, Difficulty, Interaction, InteractionStatus, LearningPace,
    LearningStyle, Learner, SkillMastery,
};
use pdp_backend::adaptive::{EngineConfig, FixedJitter, JitterSource, RecommendationEngine};
use pdp_backend::store::{CatalogStore, InMemoryStore, MasteryStore};

pub const FIXED_EPOCH: i64 = 1_700_000_000;

pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(FIXED_EPOCH, 0).unwrap() + Duration::seconds(offset_secs)
}

pub fn learner(id: &str) -> Learner {
    Learner {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        full_name: format!("Learner {id}"),
        role: "Engineer".to_string(),
        department: Some("Engineering".to_string()),
        current_skills: vec!["Python".to_string()],
        target_skills: vec!["FastAPI".to_string(), "React".to_string()],
        preferred_learning_style: LearningStyle::Video,
        learning_pace: LearningPace::Medium,
        created_at: at(0),
    }
}

/// Asset created `order` seconds after the epoch, so catalog order follows `order`.
pub fn asset(
    id: &str,
    skill: &str,
    difficulty: u8,
    format: ContentFormat,
    order: i64,
) -> Asset {
    Asset {
        id: id.to_string(),
        title: format!("{skill} level {difficulty}"),
        description: format!("{skill} module"),
        content_format: format,
        skill_tag: skill.to_string(),
        difficulty: Difficulty::new(difficulty).unwrap(),
        estimated_duration_minutes: 10,
        cheatsheet: None,
        is_active: true,
        is_archived: false,
        created_at: at(order),
    }
}

pub fn interaction(
    id: &str,
    learner_id: &str,
    asset_id: &str,
    status: InteractionStatus,
    score: Option<f64>,
    time_spent_seconds: u32,
    offset_secs: i64,
) -> Interaction {
    Interaction {
        id: id.to_string(),
        learner_id: learner_id.to_string(),
        asset_id: asset_id.to_string(),
        status,
        score,
        time_spent_seconds,
        attempts: 1,
        timestamp: at(offset_secs),
    }
}

pub fn mastery(learner_id: &str, skill: &str, proficiency: f64) -> SkillMastery {
    SkillMastery {
        learner_id: learner_id.to_string(),
        skill_name: skill.to_string(),
        proficiency,
        last_updated: at(0),
    }
}

pub fn engine_with<S>(store: Arc<S>, jitter: Arc<dyn JitterSource>) -> RecommendationEngine<S>
where
    S: CatalogStore + MasteryStore,
{
    RecommendationEngine::with_jitter(store, EngineConfig::default(), jitter)
}

pub fn fixed_engine(store: Arc<InMemoryStore>) -> RecommendationEngine<InMemoryStore> {
    engine_with(store, Arc::new(FixedJitter(0)))
}

pub async fn seed_store(
    store: &InMemoryStore,
    learners: &[Learner],
    assets: &[Asset],
    interactions: &[Interaction],
    mastery_rows: &[SkillMastery],
) {
    for l in learners {
        store.insert_learner(l).await.unwrap();
    }
    for a in assets {
        store.insert_asset(a).await.unwrap();
    }
    for i in interactions {
        store.insert_interaction(i).await.unwrap();
    }
    for m in mastery_rows {
        store.upsert_mastery(m).await.unwrap();
    }
}
