use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    #[default]
    Video,
    Text,
    Interactive,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Text => "text",
            Self::Interactive => "interactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" => Self::Text,
            "interactive" => Self::Interactive,
            _ => Self::Video,
        }
    }

    /// Whether content delivered in `format` suits this style.
    pub fn matches(&self, format: ContentFormat) -> bool {
        matches!(
            (self, format),
            (Self::Video, ContentFormat::Video)
                | (Self::Text, ContentFormat::Pdf)
                | (Self::Interactive, ContentFormat::Scorm)
                | (Self::Interactive, ContentFormat::Html5)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningPace {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl LearningPace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Medium => "medium",
            Self::Fast => "fast",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "slow" => Self::Slow,
            "fast" => Self::Fast,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Video,
    Pdf,
    Scorm,
    Html5,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Pdf => "pdf",
            Self::Scorm => "scorm",
            Self::Html5 => "html5",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "scorm" => Self::Scorm,
            "html5" => Self::Html5,
            _ => Self::Video,
        }
    }

    /// Passive formats get swapped for hands-on content after a weak attempt.
    pub fn is_passive(&self) -> bool {
        matches!(self, Self::Video | Self::Pdf | Self::Html5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    #[default]
    Started,
    Completed,
    Failed,
}

impl InteractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Started,
        }
    }
}

/// Asset difficulty, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    pub const MAX: Difficulty = Difficulty(5);

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&level)
            .then_some(Self(level))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn easier(&self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN.0))
    }

    pub fn harder(&self) -> Self {
        Self((self.0 + 1).min(Self::MAX.0))
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("difficulty {value} outside 1..=5"))
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Learner {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub current_skills: Vec<String>,
    pub target_skills: Vec<String>,
    pub preferred_learning_style: LearningStyle,
    pub learning_pace: LearningPace,
    pub created_at: DateTime<Utc>,
}

impl Learner {
    pub fn targets_skill(&self, skill: &str) -> bool {
        self.target_skills.iter().any(|s| s == skill)
    }

    pub fn knows_skill(&self, skill: &str) -> bool {
        self.current_skills.iter().any(|s| s == skill)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content_format: ContentFormat,
    pub skill_tag: String,
    pub difficulty: Difficulty,
    pub estimated_duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheatsheet: Option<String>,
    pub is_active: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn is_recommendable(&self) -> bool {
        self.is_active && !self.is_archived
    }

    pub fn estimated_duration_seconds(&self) -> f64 {
        f64::from(self.estimated_duration_minutes) * 60.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: String,
    pub learner_id: String,
    pub asset_id: String,
    pub status: InteractionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub time_spent_seconds: u32,
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    pub fn is_completed(&self) -> bool {
        self.status == InteractionStatus::Completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMastery {
    pub learner_id: String,
    pub skill_name: String,
    pub proficiency: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub learner_id: String,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
