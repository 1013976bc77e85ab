//! ML module - feedback scoring and score trends
//!
//! Features:
//! - Weighted feedback score and experience-tiered progression
//! - Deload signal from sustained above-baseline fatigue
//! - Score trend using linear regression (linfa)

pub mod analyzer;
pub mod trend;

pub use analyzer::{
    FeedbackAnalyzer, FeedbackVerdict, Progression, ScoringField, ScoringSample, ScoringWeights,
};
pub use trend::{ScoreTrend, TrendReport};
