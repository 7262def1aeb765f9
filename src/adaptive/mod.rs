pub mod config;
pub mod engine;
pub mod events;
pub mod jitter;
pub mod mastery;
pub mod performance;
pub mod ranking;
pub mod types;

pub use config::EngineConfig;
pub use engine::{RecommendationEngine, RecommendationOutcome};
pub use events::{EngineEvent, SkipReason};
pub use jitter::{FixedJitter, JitterSource, SeededJitter, ThreadJitter};
#[allow(unused_imports)]
pub use types::*;
