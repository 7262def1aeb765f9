pub mod learning;
pub mod notification;

pub use learning::{
    DailyActivity, HistoryEntry, InteractionOutcome, LearnerAnalytics, LearnerSummary,
    LearningError, LearningService, NewInteraction, DEFAULT_HISTORY_LIMIT,
};
pub use notification::NotificationService;
