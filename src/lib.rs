//! flexifit - workout feedback scoring and progression tracking
//!
//! Keeps a user's profile and training history in memory, scores feedback,
//! classifies progression per experience tier and flags deload weeks.

pub mod config;
pub mod error;
pub mod ml;
pub mod profile;
pub mod service;
pub mod store;

pub use config::AnalyzerConfig;
pub use error::{FlexifitError, Result};
pub use ml::FeedbackAnalyzer;
pub use service::FeedbackService;
pub use store::FitnessUser;
