//! Analyzer configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{FlexifitError, Result};
use crate::ml::ScoringWeights;

/// Number of most recent submissions the deload check looks at
pub const DEFAULT_DELOAD_WINDOW: usize = 2;

/// Baseline fatigue for users registered without one
pub const DEFAULT_BASELINE_FATIGUE: f64 = 2.5;

/// Scoring weights and deload window, shared by every analyzer a service creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub weights: ScoringWeights,
    pub deload_window: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            deload_window: DEFAULT_DELOAD_WINDOW,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.deload_window == 0 {
            return Err(FlexifitError::Config {
                reason: "deload_window must be at least 1".to_string(),
            });
        }

        let w = &self.weights;
        if ![w.intensity, w.adherence, w.fatigue, w.difficulty].iter().all(|v| v.is_finite()) {
            return Err(FlexifitError::Config {
                reason: "scoring weights must be finite numbers".to_string(),
            });
        }

        Ok(())
    }

    /// Parse from JSON; absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| FlexifitError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Ok(Self::from_json(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.deload_window, 2);
        assert_eq!(config.weights.intensity, 0.5);
        assert_eq!(config.weights.adherence, 0.3);
        assert_eq!(config.weights.fatigue, -0.1);
        assert_eq!(config.weights.difficulty, -0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = AnalyzerConfig::from_json(r#"{"deload_window": 3, "weights": {"intensity": 0.6}}"#).unwrap();
        assert_eq!(config.deload_window, 3);
        assert_eq!(config.weights.intensity, 0.6);
        assert_eq!(config.weights.adherence, 0.3);
    }

    #[test]
    fn test_from_json_empty_object() {
        assert_eq!(AnalyzerConfig::from_json("{}").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = AnalyzerConfig::from_json(r#"{"deload_window": 0}"#).unwrap_err();
        assert!(matches!(err, FlexifitError::Config { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(AnalyzerConfig::from_json("deload_window=3").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalyzerConfig::load("/nonexistent/flexifit.json").unwrap_err();
        assert!(err.to_string().contains("reading config"), "Error: {}", err);
    }
}
