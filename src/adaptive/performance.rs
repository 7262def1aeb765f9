use serde::{Deserialize, Serialize};

use crate::adaptive::config::{AdaptationThresholds, PerformanceWeights};
use crate::adaptive::types::{Asset, ContentFormat, Difficulty, Interaction};

/// Blend of correctness and time efficiency for one interaction, on a 0-100 scale.
///
/// A missing score counts as 0. Efficiency is estimated/actual duration, clamped to
/// `[min_efficiency, max_efficiency]`, and only earns time points up to parity.
pub fn compute_performance_score(
    interaction: &Interaction,
    asset: &Asset,
    weights: &PerformanceWeights,
) -> f64 {
    let raw_score = interaction.score.unwrap_or(0.0);

    let estimated = asset.estimated_duration_seconds();
    let spent = f64::from(interaction.time_spent_seconds);
    let efficiency = if estimated > 0.0 && spent > 0.0 {
        estimated / spent
    } else {
        1.0
    };
    let efficiency = efficiency.clamp(weights.min_efficiency, weights.max_efficiency);

    let score_component = (raw_score / 100.0) * weights.score_points;
    let time_component = weights.time_points * efficiency.min(1.0);

    score_component + time_component
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    ColdStart,
    Struggling,
    Steady,
    Accelerating,
}

impl Trajectory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ColdStart => "cold_start",
            Self::Struggling => "struggling",
            Self::Steady => "steady",
            Self::Accelerating => "accelerating",
        }
    }
}

/// Where the next single pick should land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStepPlan {
    pub trajectory: Trajectory,
    pub target_difficulty: Difficulty,
    pub preferred_format: Option<ContentFormat>,
    pub performance_score: Option<f64>,
}

impl NextStepPlan {
    pub fn cold_start() -> Self {
        Self {
            trajectory: Trajectory::ColdStart,
            target_difficulty: Difficulty::MIN,
            preferred_format: None,
            performance_score: None,
        }
    }
}

pub fn plan_next_step(
    last: Option<(&Interaction, &Asset)>,
    weights: &PerformanceWeights,
    thresholds: &AdaptationThresholds,
) -> NextStepPlan {
    let Some((interaction, asset)) = last else {
        return NextStepPlan::cold_start();
    };

    let score = compute_performance_score(interaction, asset, weights);

    if score < thresholds.struggling_below {
        NextStepPlan {
            trajectory: Trajectory::Struggling,
            target_difficulty: asset.difficulty.easier(),
            preferred_format: asset
                .content_format
                .is_passive()
                .then_some(ContentFormat::Scorm),
            performance_score: Some(score),
        }
    } else if score > thresholds.accelerating_above {
        NextStepPlan {
            trajectory: Trajectory::Accelerating,
            target_difficulty: asset.difficulty.harder(),
            preferred_format: None,
            performance_score: Some(score),
        }
    } else {
        NextStepPlan {
            trajectory: Trajectory::Steady,
            target_difficulty: asset.difficulty,
            preferred_format: None,
            performance_score: Some(score),
        }
    }
}
