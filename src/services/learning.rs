use std::sync::Arc;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adaptive::engine::RecommendationEngine;
use crate::adaptive::events::EngineEvent;
use crate::adaptive::mastery::{self, MasteryChange};
use crate::adaptive::types::{
    Asset, Interaction, InteractionStatus, LearningStyle, Notification, SkillMastery,
};
use crate::services::notification::NotificationService;
use crate::store::{CatalogStore, MasteryStore, NotificationSink, StoreError};

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("learner not found: {0}")]
    LearnerNotFound(String),
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error("score {0} outside 0..=100")]
    InvalidScore(f64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInteraction {
    pub learner_id: String,
    pub asset_id: String,
    pub status: InteractionStatus,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub time_spent_seconds: u32,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_attempts() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionOutcome {
    pub interaction: Interaction,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_recommendation: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheatsheet: Option<String>,
    pub remedial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastery: Option<MasteryChange>,
    pub events: Vec<EngineEvent>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerSummary {
    pub learner_id: String,
    pub full_name: String,
    pub completed_modules: usize,
    pub average_score: f64,
    pub learning_style: LearningStyle,
    pub skills: Vec<SkillMastery>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub weekday: String,
    pub minutes: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerAnalytics {
    pub learner_id: String,
    pub total_learning_hours: f64,
    pub modules_completed: usize,
    pub active_days_last_week: usize,
    /// Oldest day first, ending today.
    pub daily_activity: Vec<DailyActivity>,
    /// Target skills the learner does not list as current.
    pub skill_gaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub interaction_id: String,
    pub asset_id: String,
    pub asset_title: String,
    pub status: InteractionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub time_spent_seconds: u32,
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
}

const ACTIVITY_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Records learner activity and keeps mastery, recommendations and
/// notifications in step with it.
pub struct LearningService<S> {
    store: Arc<S>,
    engine: RecommendationEngine<S>,
    notifications: NotificationService<S>,
}

impl<S> LearningService<S>
where
    S: CatalogStore + MasteryStore + NotificationSink,
{
    pub fn new(engine: RecommendationEngine<S>) -> Self {
        let store = Arc::clone(engine.store());
        Self {
            notifications: NotificationService::new(Arc::clone(&store)),
            store,
            engine,
        }
    }

    pub fn engine(&self) -> &RecommendationEngine<S> {
        &self.engine
    }

    pub fn notifications(&self) -> &NotificationService<S> {
        &self.notifications
    }

    pub async fn record_interaction(
        &self,
        input: NewInteraction,
    ) -> Result<InteractionOutcome, LearningError> {
        if let Some(score) = input.score {
            if !(0.0..=100.0).contains(&score) {
                return Err(LearningError::InvalidScore(score));
            }
        }

        if self.store.get_learner(&input.learner_id).await?.is_none() {
            return Err(LearningError::LearnerNotFound(input.learner_id));
        }
        let asset = self
            .store
            .get_asset(&input.asset_id)
            .await?
            .ok_or_else(|| LearningError::AssetNotFound(input.asset_id.clone()))?;

        let interaction = Interaction {
            id: uuid::Uuid::new_v4().to_string(),
            learner_id: input.learner_id,
            asset_id: input.asset_id,
            status: input.status,
            score: input.score,
            time_spent_seconds: input.time_spent_seconds,
            attempts: input.attempts.max(1),
            timestamp: Utc::now(),
        };

        let growth = &self.engine.config().growth;
        let qualifies = interaction.is_completed()
            && interaction
                .score
                .is_some_and(|score| score >= growth.min_qualifying_score);
        let mastery_update = if qualifies {
            self.mastery_update(&interaction, &asset).await?
        } else {
            None
        };
        match &mastery_update {
            Some((row, _)) => self.store.record_completion(&interaction, row).await?,
            None => self.store.insert_interaction(&interaction).await?,
        }

        tracing::info!(
            learner_id = %interaction.learner_id,
            asset_id = %interaction.asset_id,
            status = interaction.status.as_str(),
            score = interaction.score,
            "interaction recorded"
        );

        let mut outcome = InteractionOutcome {
            message: "Progress recorded.".to_string(),
            next_recommendation: None,
            cheatsheet: None,
            remedial: false,
            mastery: None,
            events: Vec::new(),
            notifications: Vec::new(),
            interaction,
        };

        let score = match (outcome.interaction.is_completed(), outcome.interaction.score) {
            (true, Some(score)) => score,
            _ => return Ok(outcome),
        };

        if score >= growth.min_qualifying_score {
            outcome.message = format!(
                "Excellent! You scored {}%. Your adaptive profile has been updated.",
                format_score(score)
            );

            if let Some((_, change)) = mastery_update {
                tracing::info!(
                    learner_id = %outcome.interaction.learner_id,
                    skill = %change.skill,
                    previous = change.previous,
                    current = change.current,
                    "mastery updated"
                );
                outcome.events.extend(change.event());
                outcome.mastery = Some(change);
            }

            outcome.next_recommendation = self
                .engine
                .compute_next_asset(&outcome.interaction.learner_id)
                .await?;
            if outcome.next_recommendation.is_some() {
                outcome.message.push_str(" Ready for the next challenge?");
            }
        } else {
            outcome.message = format!(
                "You scored {}%. Let's review the key concepts before moving on.",
                format_score(score)
            );
            outcome.remedial = true;
            outcome.cheatsheet = asset.cheatsheet.clone();
        }

        if !outcome.events.is_empty() {
            outcome.notifications = self
                .notifications
                .dispatch(&outcome.interaction.learner_id, &outcome.events)
                .await?;
        }

        Ok(outcome)
    }

    async fn mastery_update(
        &self,
        interaction: &Interaction,
        asset: &Asset,
    ) -> Result<Option<(SkillMastery, MasteryChange)>, StoreError> {
        let existing = self
            .store
            .get_mastery(&interaction.learner_id, &asset.skill_tag)
            .await?;

        let config = self.engine.config();
        Ok(mastery::apply_completion(
            existing.as_ref(),
            interaction,
            asset,
            &config.growth,
            &config.mastery,
            Utc::now(),
        ))
    }

    /// Ranked picks plus the notifications their fast-track skips produced.
    pub async fn recommendations(
        &self,
        learner_id: &str,
        limit: Option<usize>,
    ) -> Result<(Vec<Asset>, Vec<Notification>), StoreError> {
        let limit = limit.unwrap_or(self.engine.config().default_limit);
        let outcome = self.engine.recommend(learner_id, limit).await?;
        let notifications = if outcome.events.is_empty() {
            Vec::new()
        } else {
            self.notifications.dispatch(learner_id, &outcome.events).await?
        };
        Ok((outcome.into_assets(), notifications))
    }

    pub async fn summary(&self, learner_id: &str) -> Result<LearnerSummary, LearningError> {
        let learner = self
            .store
            .get_learner(learner_id)
            .await?
            .ok_or_else(|| LearningError::LearnerNotFound(learner_id.to_string()))?;

        let interactions = self.store.find_interactions_by_learner(learner_id).await?;
        let completed: Vec<&Interaction> =
            interactions.iter().filter(|i| i.is_completed()).collect();
        let scores: Vec<f64> = completed.iter().filter_map(|i| i.score).collect();
        let average_score = if scores.is_empty() {
            0.0
        } else {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            (mean * 10.0).round() / 10.0
        };

        let mut skills = self.store.find_mastery_by_learner(learner_id).await?;
        skills.sort_by(|a, b| b.proficiency.total_cmp(&a.proficiency));

        Ok(LearnerSummary {
            learner_id: learner.id,
            full_name: learner.full_name,
            completed_modules: completed.len(),
            average_score,
            learning_style: learner.preferred_learning_style,
            skills,
        })
    }

    pub async fn analytics(&self, learner_id: &str) -> Result<LearnerAnalytics, LearningError> {
        self.analytics_at(learner_id, Utc::now()).await
    }

    /// Analytics as seen at `now`. Days are UTC calendar days.
    pub async fn analytics_at(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LearnerAnalytics, LearningError> {
        let learner = self
            .store
            .get_learner(learner_id)
            .await?
            .ok_or_else(|| LearningError::LearnerNotFound(learner_id.to_string()))?;
        let interactions = self.store.find_interactions_by_learner(learner_id).await?;

        let total_seconds: u64 = interactions
            .iter()
            .map(|i| u64::from(i.time_spent_seconds))
            .sum();
        let total_learning_hours = (total_seconds as f64 / 3600.0 * 10.0).round() / 10.0;
        let modules_completed = interactions.iter().filter(|i| i.is_completed()).count();

        let week_ago = now - Duration::days(ACTIVITY_WINDOW_DAYS);
        let active_days_last_week = interactions
            .iter()
            .filter(|i| i.timestamp >= week_ago)
            .map(|i| i.timestamp.date_naive())
            .collect::<HashSet<_>>()
            .len();

        let today = now.date_naive();
        let mut seconds_per_day: BTreeMap<NaiveDate, u64> = (0..ACTIVITY_WINDOW_DAYS)
            .rev()
            .map(|back| (today - Duration::days(back), 0))
            .collect();
        for i in &interactions {
            if let Some(total) = seconds_per_day.get_mut(&i.timestamp.date_naive()) {
                *total += u64::from(i.time_spent_seconds);
            }
        }
        let daily_activity = seconds_per_day
            .into_iter()
            .map(|(date, seconds)| DailyActivity {
                date,
                weekday: date.format("%a").to_string(),
                minutes: (seconds as f64 / 60.0).round() as u64,
            })
            .collect();

        let mut seen = HashSet::new();
        let skill_gaps = learner
            .target_skills
            .iter()
            .filter(|skill| !learner.current_skills.contains(skill))
            .filter(|skill| seen.insert(skill.as_str()))
            .cloned()
            .collect();

        Ok(LearnerAnalytics {
            learner_id: learner.id,
            total_learning_hours,
            modules_completed,
            active_days_last_week,
            daily_activity,
            skill_gaps,
        })
    }

    /// Newest interactions first, each with its asset's title. The limit applies
    /// before interactions whose asset no longer exists are dropped.
    pub async fn history(
        &self,
        learner_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, LearningError> {
        if self.store.get_learner(learner_id).await?.is_none() {
            return Err(LearningError::LearnerNotFound(learner_id.to_string()));
        }

        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let interactions = self.store.find_interactions_by_learner(learner_id).await?;
        let mut entries = Vec::new();
        for interaction in interactions.into_iter().take(limit) {
            let Some(asset) = self.store.get_asset(&interaction.asset_id).await? else {
                tracing::debug!(asset_id = %interaction.asset_id, "history skips missing asset");
                continue;
            };
            entries.push(HistoryEntry {
                interaction_id: interaction.id,
                asset_id: interaction.asset_id,
                asset_title: asset.title,
                status: interaction.status,
                score: interaction.score,
                time_spent_seconds: interaction.time_spent_seconds,
                attempts: interaction.attempts,
                timestamp: interaction.timestamp,
            });
        }
        Ok(entries)
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}
