pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::adaptive::types::{
    Asset, ContentFormat, Difficulty, Interaction, Learner, Notification, SkillMastery,
};

pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Filter for active, unarchived catalog assets.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub difficulty: Option<Difficulty>,
    pub format: Option<ContentFormat>,
    pub exclude_ids: HashSet<String>,
}

impl AssetFilter {
    pub fn excluding(exclude_ids: HashSet<String>) -> Self {
        Self {
            exclude_ids,
            ..Self::default()
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_format(mut self, format: Option<ContentFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        asset.is_recommendable()
            && !self.exclude_ids.contains(&asset.id)
            && self.difficulty.map_or(true, |d| asset.difficulty == d)
            && self.format.map_or(true, |f| asset.content_format == f)
    }
}

/// Learners, assets and their interaction history.
///
/// `find_active_assets` yields assets ordered by creation time, then id.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_learner(&self, learner_id: &str) -> Result<Option<Learner>, StoreError>;
    async fn insert_learner(&self, learner: &Learner) -> Result<(), StoreError>;

    async fn get_asset(&self, asset_id: &str) -> Result<Option<Asset>, StoreError>;
    async fn insert_asset(&self, asset: &Asset) -> Result<(), StoreError>;
    async fn count_assets(&self) -> Result<u64, StoreError>;
    async fn find_active_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>, StoreError>;

    /// Newest first.
    async fn find_interactions_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<Interaction>, StoreError>;
    async fn insert_interaction(&self, interaction: &Interaction) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MasteryStore: Send + Sync {
    async fn find_mastery_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<SkillMastery>, StoreError>;
    async fn get_mastery(
        &self,
        learner_id: &str,
        skill_name: &str,
    ) -> Result<Option<SkillMastery>, StoreError>;
    /// Last write wins.
    async fn upsert_mastery(&self, mastery: &SkillMastery) -> Result<(), StoreError>;
    /// Stores a qualifying completion and the mastery row it produced; either both
    /// are written or neither is.
    async fn record_completion(
        &self,
        interaction: &Interaction,
        mastery: &SkillMastery,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn push_notification(&self, notification: &Notification) -> Result<(), StoreError>;
    /// Newest first.
    async fn list_notifications(&self, learner_id: &str) -> Result<Vec<Notification>, StoreError>;
    async fn has_unread_topic(&self, learner_id: &str, topic: &str) -> Result<bool, StoreError>;
    async fn mark_notification_read(&self, notification_id: &str) -> Result<bool, StoreError>;
}
