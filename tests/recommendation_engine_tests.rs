//! Integration tests for RecommendationEngine over the in-memory store.
//!
//! Covers next-asset adaptation, relaxation tiers, ranked recommendations
//! fast-track exclusion and store failures.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use pdp_backend::adaptive::types::{
    Asset, ContentFormat, Interaction, InteractionStatus, Learner, SkillMastery,
};
use pdp_backend::adaptive::{EngineEvent, FixedJitter, SeededJitter, SkipReason, ThreadJitter};
use pdp_backend::store::{AssetFilter, CatalogStore, InMemoryStore, MasteryStore, StoreError};

use common::{asset, engine_with, fixed_engine, interaction, learner, mastery, seed_store};

// ============================================================================
// Next asset
// ============================================================================

#[tokio::test]
async fn unknown_learner_gets_nothing() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(&store, &[], &[asset("a1", "Python", 1, ContentFormat::Video, 1)], &[], &[]).await;
    let engine = fixed_engine(Arc::clone(&store));

    assert!(engine.compute_next_asset("ghost").await.unwrap().is_none());
    assert!(engine.compute_recommendations("ghost", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn cold_start_picks_difficulty_one() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("hard", "Python", 3, ContentFormat::Video, 1),
            asset("easy", "Python", 1, ContentFormat::Pdf, 2),
            asset("mid", "Python", 2, ContentFormat::Video, 3),
        ],
        &[],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "easy");
    assert_eq!(next.difficulty.value(), 1);
}

#[tokio::test]
async fn struggling_learner_steps_down_and_prefers_scorm() {
    let store = Arc::new(InMemoryStore::new());
    // Score 40 taking twice the estimate: 24 + 20 = 44.
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("decorators", "Python", 3, ContentFormat::Video, 1),
            asset("lists-video", "Python", 2, ContentFormat::Video, 2),
            asset("shell", "Python", 2, ContentFormat::Scorm, 3),
        ],
        &[interaction("i1", "u1", "decorators", InteractionStatus::Completed, Some(40.0), 1200, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let plan = engine
        .plan_next_step(&store_interactions(&store, "u1").await)
        .await
        .unwrap();
    assert_eq!(plan.target_difficulty.value(), 2);
    assert_eq!(plan.preferred_format, Some(ContentFormat::Scorm));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "shell");
}

#[tokio::test]
async fn accelerating_learner_steps_up() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("d3", "Python", 3, ContentFormat::Video, 1),
            asset("d3-other", "Python", 3, ContentFormat::Pdf, 2),
            asset("d4", "Python", 4, ContentFormat::Pdf, 3),
        ],
        &[interaction("i1", "u1", "d3", InteractionStatus::Completed, Some(95.0), 600, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "d4");
    assert_eq!(next.difficulty.value(), 4);
}

#[tokio::test]
async fn steady_learner_stays_at_level() {
    let store = Arc::new(InMemoryStore::new());
    // 70 on time: 42 + 40 = 82.
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("d2", "Python", 2, ContentFormat::Video, 1),
            asset("d3", "Python", 3, ContentFormat::Video, 2),
            asset("d2-next", "Python", 2, ContentFormat::Pdf, 3),
        ],
        &[interaction("i1", "u1", "d2", InteractionStatus::Completed, Some(70.0), 600, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "d2-next");
}

#[tokio::test]
async fn relaxes_format_before_difficulty() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("decorators", "Python", 3, ContentFormat::Video, 1),
            asset("d2-pdf", "Python", 2, ContentFormat::Pdf, 2),
            asset("d5", "Python", 5, ContentFormat::Scorm, 3),
        ],
        &[interaction("i1", "u1", "decorators", InteractionStatus::Completed, Some(40.0), 1200, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "d2-pdf");
}

#[tokio::test]
async fn relaxes_difficulty_when_level_is_exhausted() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("d3", "Python", 3, ContentFormat::Video, 1),
            asset("d1", "Python", 1, ContentFormat::Video, 2),
            asset("d5", "Python", 5, ContentFormat::Scorm, 3),
        ],
        &[interaction("i1", "u1", "d3", InteractionStatus::Completed, Some(95.0), 600, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "d1");
}

#[tokio::test]
async fn exhausted_catalog_returns_none() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[asset("only", "Python", 1, ContentFormat::Video, 1)],
        &[interaction("i1", "u1", "only", InteractionStatus::Completed, Some(90.0), 600, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    assert!(engine.compute_next_asset("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_last_asset_falls_back_to_cold_start() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("d3", "Python", 3, ContentFormat::Video, 1),
            asset("d1", "Python", 1, ContentFormat::Video, 2),
        ],
        &[interaction("i1", "u1", "deleted", InteractionStatus::Completed, Some(95.0), 600, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "d1");
}

#[tokio::test]
async fn started_interactions_do_not_exclude_assets() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[asset("d1", "Python", 1, ContentFormat::Video, 1)],
        &[interaction("i1", "u1", "d1", InteractionStatus::Started, None, 0, 10)],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    // A started interaction with no score plans as struggling at the same asset,
    // which is still available once the tiers relax.
    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "d1");
}

#[tokio::test]
async fn archived_assets_are_never_selected() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("d1-old", "Python", 1, ContentFormat::Video, 1),
            asset("d1-new", "Python", 1, ContentFormat::Video, 2),
        ],
        &[],
        &[],
    )
    .await;
    assert!(store.set_asset_archived("d1-old", true));
    let engine = fixed_engine(Arc::clone(&store));

    let next = engine.compute_next_asset("u1").await.unwrap().unwrap();
    assert_eq!(next.id, "d1-new");

    let ranked = engine.compute_recommendations("u1", 5).await.unwrap();
    assert!(ranked.iter().all(|a| a.id != "d1-old"));
}

// ============================================================================
// Ranked recommendations
// ============================================================================

fn scenario_assets() -> Vec<pdp_backend::adaptive::types::Asset> {
    vec![
        asset("java", "Java", 1, ContentFormat::Video, 1),
        asset("react", "React", 1, ContentFormat::Pdf, 2),
        asset("fastapi", "FastAPI", 1, ContentFormat::Video, 3),
    ]
}

#[tokio::test]
async fn target_skill_outranks_irrelevant_skill_under_any_jitter() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(&store, &[learner("u1")], &scenario_assets(), &[], &[]).await;

    for jitter in [0, 5] {
        let engine = engine_with(Arc::clone(&store), Arc::new(FixedJitter(jitter)));
        let ranked = engine.compute_recommendations("u1", 3).await.unwrap();
        let pos = |id: &str| ranked.iter().position(|a| a.id == id).unwrap();
        assert!(pos("fastapi") < pos("java"));
    }

    let engine = engine_with(Arc::clone(&store), Arc::new(ThreadJitter));
    for _ in 0..20 {
        let ranked = engine.compute_recommendations("u1", 3).await.unwrap();
        let pos = |id: &str| ranked.iter().position(|a| a.id == id).unwrap();
        assert!(pos("fastapi") < pos("java"));
    }
}

#[tokio::test]
async fn scores_are_reported_with_their_parts() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(&store, &[learner("u1")], &scenario_assets(), &[], &[]).await;
    let engine = engine_with(Arc::clone(&store), Arc::new(FixedJitter(2)));

    let outcome = engine.recommend("u1", 3).await.unwrap();
    let ids: Vec<&str> = outcome.ranked.iter().map(|s| s.asset.id.as_str()).collect();
    assert_eq!(ids, vec!["fastapi", "react", "java"]);

    let fastapi = &outcome.ranked[0];
    assert_eq!(fastapi.base_score, 50);
    assert_eq!(fastapi.jitter, 2);
    assert_eq!(fastapi.score, 52);
    assert_eq!(outcome.ranked[1].base_score, 40);
    assert_eq!(outcome.ranked[2].base_score, 10);
    assert!(outcome.events.is_empty());
}

#[tokio::test]
async fn limit_truncates_results() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(&store, &[learner("u1")], &scenario_assets(), &[], &[]).await;
    let engine = fixed_engine(Arc::clone(&store));

    let ranked = engine.compute_recommendations("u1", 1).await.unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].id, "fastapi");

    assert!(engine.compute_recommendations("u1", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn completed_assets_are_excluded() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &scenario_assets(),
        &[
            interaction("i1", "u1", "fastapi", InteractionStatus::Completed, Some(60.0), 600, 10),
            interaction("i2", "u1", "react", InteractionStatus::Failed, Some(10.0), 600, 20),
        ],
        &[],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let ids: HashSet<String> = engine
        .compute_recommendations("u1", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert!(!ids.contains("fastapi"));
    assert!(ids.contains("react"));
    assert!(ids.contains("java"));
}

#[tokio::test]
async fn mastered_basics_are_fast_tracked_with_events() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("py-intro", "Python", 1, ContentFormat::Video, 1),
            asset("py-lists", "Python", 2, ContentFormat::Pdf, 2),
            asset("py-decorators", "Python", 3, ContentFormat::Video, 3),
            asset("react", "React", 1, ContentFormat::Pdf, 4),
        ],
        &[],
        &[mastery("u1", "Python", 85.0)],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let outcome = engine.recommend("u1", 10).await.unwrap();
    let ids: Vec<&str> = outcome.ranked.iter().map(|s| s.asset.id.as_str()).collect();
    assert!(!ids.contains(&"py-intro"));
    assert!(!ids.contains(&"py-lists"));
    assert!(ids.contains(&"py-decorators"));

    let skipped: HashSet<&str> = outcome
        .events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Skipped {
                asset_id,
                reason: SkipReason::Mastered,
                ..
            } => Some(asset_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, HashSet::from(["py-intro", "py-lists"]));
}

#[tokio::test]
async fn struggling_skill_boosts_remedial_content() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("react-hard", "React", 4, ContentFormat::Video, 1),
            asset("react-basics", "React", 2, ContentFormat::Pdf, 2),
            asset("fastapi", "FastAPI", 3, ContentFormat::Video, 3),
        ],
        &[],
        &[mastery("u1", "React", 20.0)],
    )
    .await;
    let engine = fixed_engine(Arc::clone(&store));

    let outcome = engine.recommend("u1", 3).await.unwrap();
    let ids: Vec<&str> = outcome.ranked.iter().map(|s| s.asset.id.as_str()).collect();
    assert_eq!(ids, vec!["react-basics", "fastapi", "react-hard"]);
    assert_eq!(outcome.ranked[0].base_score, 90);
    assert_eq!(outcome.ranked[1].base_score, 50);
    assert_eq!(outcome.ranked[2].base_score, 0);
}

#[tokio::test]
async fn repeated_calls_return_same_top_set() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(
        &store,
        &[learner("u1")],
        &[
            asset("fastapi", "FastAPI", 1, ContentFormat::Video, 1),
            asset("react", "React", 1, ContentFormat::Pdf, 2),
            asset("java", "Java", 1, ContentFormat::Video, 3),
            asset("go", "Go", 2, ContentFormat::Pdf, 4),
        ],
        &[],
        &[],
    )
    .await;
    let engine = engine_with(Arc::clone(&store), Arc::new(ThreadJitter));

    let set = |assets: Vec<pdp_backend::adaptive::types::Asset>| -> HashSet<String> {
        assets.into_iter().map(|a| a.id).collect()
    };
    let first = set(engine.compute_recommendations("u1", 2).await.unwrap());
    let second = set(engine.compute_recommendations("u1", 2).await.unwrap());
    assert_eq!(first, second);
    assert_eq!(first, HashSet::from(["fastapi".to_string(), "react".to_string()]));
}

#[tokio::test]
async fn seeded_jitter_is_reproducible() {
    let store = Arc::new(InMemoryStore::new());
    seed_store(&store, &[learner("u1")], &scenario_assets(), &[], &[]).await;

    let first = engine_with(Arc::clone(&store), Arc::new(SeededJitter::new(7)))
        .recommend("u1", 3)
        .await
        .unwrap();
    let second = engine_with(Arc::clone(&store), Arc::new(SeededJitter::new(7)))
        .recommend("u1", 3)
        .await
        .unwrap();

    let jitters = |o: &pdp_backend::adaptive::RecommendationOutcome| -> Vec<(String, i32)> {
        o.ranked.iter().map(|s| (s.asset.id.clone(), s.jitter)).collect()
    };
    assert_eq!(jitters(&first), jitters(&second));
    assert!(first.ranked.iter().all(|s| (0..=5).contains(&s.jitter)));
}

async fn store_interactions(
    store: &InMemoryStore,
    learner_id: &str,
) -> Vec<pdp_backend::adaptive::types::Interaction> {
    use pdp_backend::store::CatalogStore;
    store.find_interactions_by_learner(learner_id).await.unwrap()
}

// ============================================================================
// Store failures
// ============================================================================

/// Catalog whose asset listing is unavailable; everything else is served by an
/// in-memory store.
struct OfflineCatalog {
    inner: InMemoryStore,
}

#[async_trait]
impl CatalogStore for OfflineCatalog {
    async fn get_learner(&self, learner_id: &str) -> Result<Option<Learner>, StoreError> {
        self.inner.get_learner(learner_id).await
    }

    async fn insert_learner(&self, learner: &Learner) -> Result<(), StoreError> {
        self.inner.insert_learner(learner).await
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Option<Asset>, StoreError> {
        self.inner.get_asset(asset_id).await
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        self.inner.insert_asset(asset).await
    }

    async fn count_assets(&self) -> Result<u64, StoreError> {
        self.inner.count_assets().await
    }

    async fn find_active_assets(&self, _filter: &AssetFilter) -> Result<Vec<Asset>, StoreError> {
        Err(StoreError::InvalidData("catalog offline".to_string()))
    }

    async fn find_interactions_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<Interaction>, StoreError> {
        self.inner.find_interactions_by_learner(learner_id).await
    }

    async fn insert_interaction(&self, interaction: &Interaction) -> Result<(), StoreError> {
        self.inner.insert_interaction(interaction).await
    }
}

#[async_trait]
impl MasteryStore for OfflineCatalog {
    async fn find_mastery_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<SkillMastery>, StoreError> {
        self.inner.find_mastery_by_learner(learner_id).await
    }

    async fn get_mastery(
        &self,
        learner_id: &str,
        skill_name: &str,
    ) -> Result<Option<SkillMastery>, StoreError> {
        self.inner.get_mastery(learner_id, skill_name).await
    }

    async fn upsert_mastery(&self, mastery: &SkillMastery) -> Result<(), StoreError> {
        self.inner.upsert_mastery(mastery).await
    }

    async fn record_completion(
        &self,
        interaction: &Interaction,
        mastery: &SkillMastery,
    ) -> Result<(), StoreError> {
        self.inner.record_completion(interaction, mastery).await
    }
}

#[tokio::test]
async fn catalog_errors_propagate_unchanged() {
    let inner = InMemoryStore::new();
    seed_store(
        &inner,
        &[learner("u1")],
        &[asset("a1", "Python", 1, ContentFormat::Video, 1)],
        &[interaction("i1", "u1", "a1", InteractionStatus::Completed, Some(90.0), 600, 1)],
        &[mastery("u1", "Python", 40.0)],
    )
    .await;
    let engine = engine_with(Arc::new(OfflineCatalog { inner }), Arc::new(FixedJitter(0)));

    let err = engine.compute_next_asset("u1").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(ref msg) if msg == "catalog offline"));

    let err = engine.compute_recommendations("u1", 3).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(ref msg) if msg == "catalog offline"));
}
