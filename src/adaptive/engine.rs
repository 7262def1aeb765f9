use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::adaptive::config::EngineConfig;
use crate::adaptive::events::EngineEvent;
use crate::adaptive::jitter::{JitterSource, SeededJitter, ThreadJitter};
use crate::adaptive::performance::{self, NextStepPlan};
use crate::adaptive::ranking::{self, ScoredAsset, SkillProfile};
use crate::adaptive::types::{Asset, Interaction};
use crate::store::{AssetFilter, CatalogStore, MasteryStore, StoreError};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationOutcome {
    pub ranked: Vec<ScoredAsset>,
    pub events: Vec<EngineEvent>,
}

impl RecommendationOutcome {
    pub fn assets(&self) -> Vec<Asset> {
        self.ranked.iter().map(|s| s.asset.clone()).collect()
    }

    pub fn into_assets(self) -> Vec<Asset> {
        self.ranked.into_iter().map(|s| s.asset).collect()
    }
}

/// Picks what a learner should study next.
///
/// Holds nothing but a store handle, the jitter source and immutable config, so one
/// instance can serve any number of learners concurrently. Every call reads a fresh
/// snapshot from the store; store errors are returned unchanged.
pub struct RecommendationEngine<S> {
    store: Arc<S>,
    jitter: Arc<dyn JitterSource>,
    config: EngineConfig,
}

impl<S> Clone for RecommendationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            jitter: Arc::clone(&self.jitter),
            config: self.config.clone(),
        }
    }
}

impl<S> RecommendationEngine<S>
where
    S: CatalogStore + MasteryStore,
{
    /// Uses a seeded jitter source when `config.jitter_seed` is set.
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let jitter: Arc<dyn JitterSource> = match config.jitter_seed {
            Some(seed) => Arc::new(SeededJitter::new(seed)),
            None => Arc::new(ThreadJitter),
        };
        Self::with_jitter(store, config, jitter)
    }

    pub fn with_jitter(store: Arc<S>, config: EngineConfig, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            store,
            jitter,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn compute_performance_score(&self, interaction: &Interaction, asset: &Asset) -> f64 {
        performance::compute_performance_score(interaction, asset, &self.config.performance)
    }

    /// Difficulty/format plan derived from the learner's most recent interaction.
    pub async fn plan_next_step(
        &self,
        interactions: &[Interaction],
    ) -> Result<NextStepPlan, StoreError> {
        let Some(last) = interactions.first() else {
            return Ok(NextStepPlan::cold_start());
        };

        let Some(last_asset) = self.store.get_asset(&last.asset_id).await? else {
            warn!(
                learner_id = %last.learner_id,
                asset_id = %last.asset_id,
                "last interaction references a missing asset, starting from level 1"
            );
            return Ok(NextStepPlan::cold_start());
        };

        Ok(performance::plan_next_step(
            Some((last, &last_asset)),
            &self.config.performance,
            &self.config.adaptation,
        ))
    }

    /// Single next asset, relaxing format and then difficulty until something fits.
    pub async fn compute_next_asset(&self, learner_id: &str) -> Result<Option<Asset>, StoreError> {
        if self.store.get_learner(learner_id).await?.is_none() {
            debug!(learner_id, "learner not found");
            return Ok(None);
        }

        let interactions = self.store.find_interactions_by_learner(learner_id).await?;
        let completed = completed_asset_ids(&interactions);
        let plan = self.plan_next_step(&interactions).await?;

        debug!(
            learner_id,
            trajectory = plan.trajectory.as_str(),
            target_difficulty = plan.target_difficulty.value(),
            preferred_format = plan.preferred_format.map(|f| f.as_str()),
            performance = plan.performance_score,
            "planned next step"
        );

        let mut tiers = Vec::with_capacity(3);
        if plan.preferred_format.is_some() {
            tiers.push(
                AssetFilter::excluding(completed.clone())
                    .with_difficulty(plan.target_difficulty)
                    .with_format(plan.preferred_format),
            );
        }
        tiers.push(
            AssetFilter::excluding(completed.clone()).with_difficulty(plan.target_difficulty),
        );
        tiers.push(AssetFilter::excluding(completed));

        for (tier, filter) in tiers.iter().enumerate() {
            let candidates = self.store.find_active_assets(filter).await?;
            if let Some(asset) = candidates.into_iter().next() {
                debug!(learner_id, asset_id = %asset.id, tier, "selected next asset");
                return Ok(Some(asset));
            }
        }

        debug!(learner_id, "catalog exhausted");
        Ok(None)
    }

    /// Top `limit` candidates with their scores and the events the pass produced.
    pub async fn recommend(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<RecommendationOutcome, StoreError> {
        let Some(learner) = self.store.get_learner(learner_id).await? else {
            debug!(learner_id, "learner not found");
            return Ok(RecommendationOutcome::default());
        };

        let interactions = self.store.find_interactions_by_learner(learner_id).await?;
        let completed = completed_asset_ids(&interactions);

        let mastery = self.store.find_mastery_by_learner(learner_id).await?;
        let profile = SkillProfile::from_mastery(&mastery, &self.config.mastery);

        let candidates = self
            .store
            .find_active_assets(&AssetFilter::excluding(completed))
            .await?;

        let ranking = ranking::rank_candidates(
            candidates,
            &learner,
            &profile,
            &self.config,
            self.jitter.as_ref(),
            limit,
        );

        debug!(
            learner_id,
            returned = ranking.ranked.len(),
            skipped = ranking.events.len(),
            "ranked recommendations"
        );

        Ok(RecommendationOutcome {
            ranked: ranking.ranked,
            events: ranking.events,
        })
    }

    pub async fn compute_recommendations(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<Vec<Asset>, StoreError> {
        Ok(self.recommend(learner_id, limit).await?.into_assets())
    }
}

fn completed_asset_ids(interactions: &[Interaction]) -> HashSet<String> {
    interactions
        .iter()
        .filter(|i| i.is_completed())
        .map(|i| i.asset_id.clone())
        .collect()
}
