use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::adaptive::events::EngineEvent;
use crate::adaptive::types::{Notification, NotificationKind};
use crate::store::{NotificationSink, StoreError};

/// Turns engine events into learner-facing notifications.
///
/// Each notification carries a topic key; a topic that still has an unread
/// notification is not written again.
pub struct NotificationService<S> {
    sink: Arc<S>,
}

impl<S> Clone for NotificationService<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: NotificationSink> NotificationService<S> {
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Writes notifications for `events`; returns the ones actually created.
    pub async fn dispatch(
        &self,
        learner_id: &str,
        events: &[EngineEvent],
    ) -> Result<Vec<Notification>, StoreError> {
        let mut created = Vec::new();

        for (topic, kind, message) in compose(events) {
            if self.sink.has_unread_topic(learner_id, &topic).await? {
                tracing::debug!(learner_id, topic = %topic, "unread notification exists, skipping");
                continue;
            }

            let notification = Notification {
                id: uuid::Uuid::new_v4().to_string(),
                learner_id: learner_id.to_string(),
                kind,
                message,
                topic: Some(topic),
                is_read: false,
                created_at: Utc::now(),
            };
            self.sink.push_notification(&notification).await?;
            tracing::info!(
                learner_id,
                notification_id = %notification.id,
                kind = notification.kind.as_str(),
                "notification created"
            );
            created.push(notification);
        }

        Ok(created)
    }

    pub async fn list(&self, learner_id: &str) -> Result<Vec<Notification>, StoreError> {
        self.sink.list_notifications(learner_id).await
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<bool, StoreError> {
        self.sink.mark_notification_read(notification_id).await
    }
}

/// One `(topic, kind, message)` per mastered skill and per skill with skipped assets.
fn compose(events: &[EngineEvent]) -> Vec<(String, NotificationKind, String)> {
    let mut out = Vec::new();
    let mut skipped: BTreeMap<&str, usize> = BTreeMap::new();

    for event in events {
        match event {
            EngineEvent::MasteryAchieved { skill, .. } => {
                out.push((
                    format!("fast_track:{skill}"),
                    NotificationKind::Success,
                    format!(
                        "Fast-Track unlocked: you've mastered {skill}. \
                         Introductory {skill} content will be skipped."
                    ),
                ));
            }
            EngineEvent::Skipped { skill, .. } => {
                *skipped.entry(skill.as_str()).or_default() += 1;
            }
        }
    }

    for (skill, count) in skipped {
        let noun = if count == 1 { "asset" } else { "assets" };
        out.push((
            format!("skipped:{skill}"),
            NotificationKind::Info,
            format!(
                "Skipped {count} introductory {skill} {noun} because you've already mastered it."
            ),
        ));
    }

    out
}
