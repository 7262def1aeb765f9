use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::adaptive::config::{EngineConfig, MasteryBands};
use crate::adaptive::events::{EngineEvent, SkipReason};
use crate::adaptive::jitter::JitterSource;
use crate::adaptive::types::{Asset, Learner, SkillMastery};

/// Mastery snapshot split into the two bands the ranking reacts to.
#[derive(Debug, Clone, Default)]
pub struct SkillProfile {
    mastered: HashSet<String>,
    struggling: HashSet<String>,
}

impl SkillProfile {
    pub fn from_mastery(rows: &[SkillMastery], bands: &MasteryBands) -> Self {
        let mut profile = Self::default();
        for row in rows {
            if row.proficiency > bands.mastered_above {
                profile.mastered.insert(row.skill_name.clone());
            } else if row.proficiency < bands.struggling_below {
                profile.struggling.insert(row.skill_name.clone());
            }
        }
        profile
    }

    pub fn is_mastered(&self, skill: &str) -> bool {
        self.mastered.contains(skill)
    }

    pub fn is_struggling(&self, skill: &str) -> bool {
        self.struggling.contains(skill)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAsset {
    pub asset: Asset,
    /// Deterministic part of the score.
    pub base_score: i32,
    pub jitter: i32,
    pub score: i32,
}

#[derive(Debug, Clone)]
pub enum CandidateVerdict {
    Excluded(EngineEvent),
    Scored { base_score: i32 },
}

/// Deterministic verdict for one candidate; jitter is added by the caller.
pub fn evaluate_candidate(
    asset: &Asset,
    learner: &Learner,
    profile: &SkillProfile,
    config: &EngineConfig,
) -> CandidateVerdict {
    let bands = &config.mastery;
    let weights = &config.ranking;
    let skill = asset.skill_tag.as_str();
    let difficulty = asset.difficulty.value();

    if profile.is_mastered(skill) && difficulty <= bands.fast_track_max_difficulty {
        return CandidateVerdict::Excluded(EngineEvent::Skipped {
            asset_id: asset.id.clone(),
            skill: asset.skill_tag.clone(),
            reason: SkipReason::Mastered,
        });
    }

    let mut score = 0;

    if profile.is_struggling(skill) {
        if difficulty <= bands.remedial_boost_max_difficulty {
            score += weights.remedial_boost;
        } else if difficulty >= bands.remedial_penalty_min_difficulty {
            score -= weights.remedial_penalty;
        }
    }

    if learner.targets_skill(skill) {
        score += weights.target_skill;
    } else if learner.knows_skill(skill) {
        score += weights.current_skill;
    }

    if learner.preferred_learning_style.matches(asset.content_format) {
        score += weights.format_match;
    }

    if role_matches(&learner.role, skill) {
        score += weights.role_match;
    }

    CandidateVerdict::Scored { base_score: score }
}

fn role_matches(role: &str, skill: &str) -> bool {
    let role = role.trim().to_lowercase();
    !role.is_empty() && skill.to_lowercase().contains(&role)
}

#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub ranked: Vec<ScoredAsset>,
    pub events: Vec<EngineEvent>,
}

/// Scores every candidate, drops fast-track skips, and keeps the best `limit`.
pub fn rank_candidates(
    candidates: Vec<Asset>,
    learner: &Learner,
    profile: &SkillProfile,
    config: &EngineConfig,
    jitter: &dyn JitterSource,
    limit: usize,
) -> Ranking {
    let mut ranking = Ranking::default();

    for asset in candidates {
        if !asset.is_recommendable() {
            continue;
        }
        match evaluate_candidate(&asset, learner, profile, config) {
            CandidateVerdict::Excluded(event) => {
                if let EngineEvent::Skipped { reason, .. } = &event {
                    tracing::debug!(
                        learner_id = %learner.id,
                        asset_id = %asset.id,
                        skill = %asset.skill_tag,
                        reason = reason.as_str(),
                        "fast-track skip"
                    );
                }
                ranking.events.push(event);
            }
            CandidateVerdict::Scored { base_score } => {
                let noise = jitter.jitter(config.ranking.max_jitter);
                ranking.ranked.push(ScoredAsset {
                    asset,
                    base_score,
                    jitter: noise,
                    score: base_score + noise,
                });
            }
        }
    }

    ranking.ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranking.ranked.truncate(limit);
    ranking
}
