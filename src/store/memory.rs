use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::adaptive::types::{Asset, Interaction, Learner, Notification, SkillMastery};
use crate::store::{AssetFilter, CatalogStore, MasteryStore, NotificationSink, StoreError};

#[derive(Default)]
struct Tables {
    learners: HashMap<String, Learner>,
    assets: HashMap<String, Asset>,
    interactions: Vec<Interaction>,
    mastery: HashMap<(String, String), SkillMastery>,
    notifications: Vec<Notification>,
}

/// Process-local store backing tests and embedded use.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_asset_archived(&self, asset_id: &str, archived: bool) -> bool {
        let mut tables = self.tables.write();
        match tables.assets.get_mut(asset_id) {
            Some(asset) => {
                asset.is_archived = archived;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn get_learner(&self, learner_id: &str) -> Result<Option<Learner>, StoreError> {
        Ok(self.tables.read().learners.get(learner_id).cloned())
    }

    async fn insert_learner(&self, learner: &Learner) -> Result<(), StoreError> {
        self.tables
            .write()
            .learners
            .insert(learner.id.clone(), learner.clone());
        Ok(())
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Option<Asset>, StoreError> {
        Ok(self.tables.read().assets.get(asset_id).cloned())
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        self.tables
            .write()
            .assets
            .insert(asset.id.clone(), asset.clone());
        Ok(())
    }

    async fn count_assets(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().assets.len() as u64)
    }

    async fn find_active_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>, StoreError> {
        let tables = self.tables.read();
        let mut assets: Vec<Asset> = tables
            .assets
            .values()
            .filter(|asset| filter.matches(asset))
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(assets)
    }

    async fn find_interactions_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<Interaction>, StoreError> {
        let tables = self.tables.read();
        let mut interactions: Vec<Interaction> = tables
            .interactions
            .iter()
            .rev()
            .filter(|i| i.learner_id == learner_id)
            .cloned()
            .collect();
        interactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(interactions)
    }

    async fn insert_interaction(&self, interaction: &Interaction) -> Result<(), StoreError> {
        self.tables.write().interactions.push(interaction.clone());
        Ok(())
    }
}

#[async_trait]
impl MasteryStore for InMemoryStore {
    async fn find_mastery_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<SkillMastery>, StoreError> {
        let tables = self.tables.read();
        let mut rows: Vec<SkillMastery> = tables
            .mastery
            .values()
            .filter(|m| m.learner_id == learner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.skill_name.cmp(&b.skill_name));
        Ok(rows)
    }

    async fn get_mastery(
        &self,
        learner_id: &str,
        skill_name: &str,
    ) -> Result<Option<SkillMastery>, StoreError> {
        let key = (learner_id.to_string(), skill_name.to_string());
        Ok(self.tables.read().mastery.get(&key).cloned())
    }

    async fn upsert_mastery(&self, mastery: &SkillMastery) -> Result<(), StoreError> {
        let key = (mastery.learner_id.clone(), mastery.skill_name.clone());
        self.tables.write().mastery.insert(key, mastery.clone());
        Ok(())
    }

    async fn record_completion(
        &self,
        interaction: &Interaction,
        mastery: &SkillMastery,
    ) -> Result<(), StoreError> {
        let key = (mastery.learner_id.clone(), mastery.skill_name.clone());
        let mut tables = self.tables.write();
        tables.interactions.push(interaction.clone());
        tables.mastery.insert(key, mastery.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for InMemoryStore {
    async fn push_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        self.tables.write().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self, learner_id: &str) -> Result<Vec<Notification>, StoreError> {
        let tables = self.tables.read();
        let mut items: Vec<Notification> = tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.learner_id == learner_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn has_unread_topic(&self, learner_id: &str, topic: &str) -> Result<bool, StoreError> {
        Ok(self.tables.read().notifications.iter().any(|n| {
            n.learner_id == learner_id && !n.is_read && n.topic.as_deref() == Some(topic)
        }))
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
