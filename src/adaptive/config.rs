use serde::{Deserialize, Serialize};

/// Thresholds that steer the single-next-asset path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptationThresholds {
    /// Performance below this steps difficulty down.
    pub struggling_below: f64,
    /// Performance above this steps difficulty up.
    pub accelerating_above: f64,
}

impl Default for AdaptationThresholds {
    fn default() -> Self {
        Self {
            struggling_below: 50.0,
            accelerating_above: 90.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceWeights {
    pub score_points: f64,
    pub time_points: f64,
    pub min_efficiency: f64,
    pub max_efficiency: f64,
}

impl Default for PerformanceWeights {
    fn default() -> Self {
        Self {
            score_points: 60.0,
            time_points: 40.0,
            min_efficiency: 0.5,
            max_efficiency: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryBands {
    /// Proficiency strictly above this counts as mastered.
    pub mastered_above: f64,
    /// Proficiency strictly below this counts as struggling.
    pub struggling_below: f64,
    /// Skills at or below this difficulty are skipped once mastered.
    pub fast_track_max_difficulty: u8,
    pub remedial_boost_max_difficulty: u8,
    pub remedial_penalty_min_difficulty: u8,
}

impl Default for MasteryBands {
    fn default() -> Self {
        Self {
            mastered_above: 80.0,
            struggling_below: 40.0,
            fast_track_max_difficulty: 2,
            remedial_boost_max_difficulty: 2,
            remedial_penalty_min_difficulty: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingWeights {
    pub remedial_boost: i32,
    pub remedial_penalty: i32,
    pub target_skill: i32,
    pub current_skill: i32,
    pub format_match: i32,
    pub role_match: i32,
    pub max_jitter: i32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            remedial_boost: 50,
            remedial_penalty: 50,
            target_skill: 40,
            current_skill: 5,
            format_match: 10,
            role_match: 10,
            max_jitter: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryGrowth {
    /// Completions scoring at least this raise proficiency.
    pub min_qualifying_score: f64,
    pub difficulty_multiplier: f64,
    pub max_proficiency: f64,
}

impl Default for MasteryGrowth {
    fn default() -> Self {
        Self {
            min_qualifying_score: 80.0,
            difficulty_multiplier: 2.0,
            max_proficiency: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub default_limit: usize,
    pub performance: PerformanceWeights,
    pub adaptation: AdaptationThresholds,
    pub mastery: MasteryBands,
    pub ranking: RankingWeights,
    pub growth: MasteryGrowth,
    /// Seed for reproducible jitter; unset means thread-local randomness.
    pub jitter_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: 3,
            performance: PerformanceWeights::default(),
            adaptation: AdaptationThresholds::default(),
            mastery: MasteryBands::default(),
            ranking: RankingWeights::default(),
            growth: MasteryGrowth::default(),
            jitter_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let default_limit = std::env::var("RECOMMENDATION_DEFAULT_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(3);

        let jitter_seed = std::env::var("RECOMMENDATION_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        Self {
            default_limit,
            jitter_seed,
            ..Self::default()
        }
    }
}
