pub mod asset;
pub mod interaction;
pub mod learner;
pub mod mastery;
pub mod notification;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::adaptive::types::{Asset, Interaction, Learner, Notification, SkillMastery};
use crate::db::Database;
use crate::store::{AssetFilter, CatalogStore, MasteryStore, NotificationSink, StoreError};

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("timestamp {raw:?}: {e}")))
}

#[async_trait]
impl CatalogStore for Database {
    async fn get_learner(&self, learner_id: &str) -> Result<Option<Learner>, StoreError> {
        learner::get_learner(self.pool(), learner_id).await
    }

    async fn insert_learner(&self, learner: &Learner) -> Result<(), StoreError> {
        learner::insert_learner(self.pool(), learner).await
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Option<Asset>, StoreError> {
        asset::get_asset(self.pool(), asset_id).await
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        asset::insert_asset(self.pool(), asset).await
    }

    async fn count_assets(&self) -> Result<u64, StoreError> {
        asset::count_assets(self.pool()).await
    }

    async fn find_active_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>, StoreError> {
        asset::find_active_assets(self.pool(), filter).await
    }

    async fn find_interactions_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<Interaction>, StoreError> {
        interaction::find_by_learner(self.pool(), learner_id).await
    }

    async fn insert_interaction(&self, interaction: &Interaction) -> Result<(), StoreError> {
        interaction::insert_interaction(self.pool(), interaction).await
    }
}

#[async_trait]
impl MasteryStore for Database {
    async fn find_mastery_by_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<SkillMastery>, StoreError> {
        mastery::find_by_learner(self.pool(), learner_id).await
    }

    async fn get_mastery(
        &self,
        learner_id: &str,
        skill_name: &str,
    ) -> Result<Option<SkillMastery>, StoreError> {
        mastery::get_mastery(self.pool(), learner_id, skill_name).await
    }

    async fn upsert_mastery(&self, row: &SkillMastery) -> Result<(), StoreError> {
        mastery::upsert_mastery(self.pool(), row).await
    }

    async fn record_completion(
        &self,
        completed: &Interaction,
        row: &SkillMastery,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool().begin().await?;
        interaction::insert_interaction(&mut *tx, completed).await?;
        mastery::upsert_mastery(&mut *tx, row).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for Database {
    async fn push_notification(&self, item: &Notification) -> Result<(), StoreError> {
        notification::insert_notification(self.pool(), item).await
    }

    async fn list_notifications(&self, learner_id: &str) -> Result<Vec<Notification>, StoreError> {
        notification::list_by_learner(self.pool(), learner_id).await
    }

    async fn has_unread_topic(&self, learner_id: &str, topic: &str) -> Result<bool, StoreError> {
        notification::has_unread_topic(self.pool(), learner_id, topic).await
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<bool, StoreError> {
        notification::mark_read(self.pool(), notification_id).await
    }
}
