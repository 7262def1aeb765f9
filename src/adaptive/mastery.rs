use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::config::{MasteryBands, MasteryGrowth};
use crate::adaptive::events::EngineEvent;
use crate::adaptive::types::{Asset, Interaction, SkillMastery};

/// Outcome of applying one qualifying completion to a skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryChange {
    pub skill: String,
    pub previous: f64,
    pub current: f64,
    pub crossed_mastery: bool,
}

impl MasteryChange {
    pub fn event(&self) -> Option<EngineEvent> {
        self.crossed_mastery.then(|| EngineEvent::MasteryAchieved {
            skill: self.skill.clone(),
            proficiency: self.current,
        })
    }
}

/// Proficiency gain for a completed interaction, or `None` when it does not qualify
/// or the skill is already capped.
///
/// `existing` is the learner's current row for the asset's skill, if any.
pub fn apply_completion(
    existing: Option<&SkillMastery>,
    interaction: &Interaction,
    asset: &Asset,
    growth: &MasteryGrowth,
    bands: &MasteryBands,
    now: DateTime<Utc>,
) -> Option<(SkillMastery, MasteryChange)> {
    if !interaction.is_completed() || asset.skill_tag.is_empty() {
        return None;
    }
    let score = interaction.score?;
    if score < growth.min_qualifying_score {
        return None;
    }

    let previous = existing.map(|m| m.proficiency).unwrap_or(0.0);
    if previous >= growth.max_proficiency {
        return None;
    }

    let increment =
        f64::from(asset.difficulty.value()) * growth.difficulty_multiplier * (score / 100.0);
    let current = (previous + increment.max(0.0)).min(growth.max_proficiency);

    let row = SkillMastery {
        learner_id: interaction.learner_id.clone(),
        skill_name: asset.skill_tag.clone(),
        proficiency: current,
        last_updated: now,
    };
    let change = MasteryChange {
        skill: asset.skill_tag.clone(),
        previous,
        current,
        crossed_mastery: previous <= bands.mastered_above && current > bands.mastered_above,
    };

    Some((row, change))
}
