use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Skill already mastered; introductory content is redundant.
    Mastered,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mastered => "mastered",
        }
    }
}

/// Decisions worth telling the learner about, emitted alongside results
/// instead of being written anywhere by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    Skipped {
        asset_id: String,
        skill: String,
        reason: SkipReason,
    },
    MasteryAchieved {
        skill: String,
        proficiency: f64,
    },
}

impl EngineEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::Skipped { .. } => "SKIPPED",
            EngineEvent::MasteryAchieved { .. } => "MASTERY_ACHIEVED",
        }
    }

    pub fn skill(&self) -> &str {
        match self {
            EngineEvent::Skipped { skill, .. } => skill,
            EngineEvent::MasteryAchieved { skill, .. } => skill,
        }
    }
}
