//! Feedback scoring - weighted score, progression tier and deload signal

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::profile::{ExperienceLevel, UserProfile};

/// Fields that carry a scoring weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringField {
    Intensity,
    Adherence,
    Fatigue,
    Difficulty,
}

impl ScoringField {
    pub fn key(&self) -> &'static str {
        match self {
            ScoringField::Intensity => "intensity",
            ScoringField::Adherence => "adherence",
            ScoringField::Fatigue => "fatigue",
            ScoringField::Difficulty => "difficulty",
        }
    }

    /// All weighted fields, in the order requests list them
    pub fn all() -> &'static [ScoringField] {
        &[
            ScoringField::Fatigue,
            ScoringField::Intensity,
            ScoringField::Adherence,
            ScoringField::Difficulty,
        ]
    }
}

/// Per-field multipliers applied to a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub intensity: f64,
    pub adherence: f64,
    pub fatigue: f64,
    pub difficulty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            intensity: 0.5,
            adherence: 0.3,
            fatigue: -0.1,
            difficulty: -0.1,
        }
    }
}

impl ScoringWeights {
    pub fn weight(&self, field: ScoringField) -> f64 {
        match field {
            ScoringField::Intensity => self.intensity,
            ScoringField::Adherence => self.adherence,
            ScoringField::Fatigue => self.fatigue,
            ScoringField::Difficulty => self.difficulty,
        }
    }
}

/// Raw scoring feedback: open key set, only weighted keys count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringSample(BTreeMap<String, f64>);

impl ScoringSample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample with all four weighted fields set
    pub fn from_ratings(fatigue: f64, intensity: f64, adherence: f64, difficulty: f64) -> Self {
        let mut sample = Self::new();
        sample.set(ScoringField::Fatigue, fatigue);
        sample.set(ScoringField::Intensity, intensity);
        sample.set(ScoringField::Adherence, adherence);
        sample.set(ScoringField::Difficulty, difficulty);
        sample
    }

    pub fn set(&mut self, field: ScoringField, value: f64) {
        self.0.insert(field.key().to_string(), value);
    }

    /// Set any key, weighted or not
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, field: ScoringField) -> Option<f64> {
        self.0.get(field.key()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ScoringSample {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Classification of a computed score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Progression {
    Progressing,
    Plateauing,
    Regressing,
}

impl Progression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Progression::Progressing => "progressing",
            Progression::Plateauing => "plateauing",
            Progression::Regressing => "regressing",
        }
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedbackVerdict {
    pub score: f64,
    pub progression: Progression,
    pub deload: bool,
}

/// Round to 2 decimals, halves away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scoring context bound to one user
#[derive(Debug, Clone)]
pub struct FeedbackAnalyzer {
    experience: String,
    baseline_fatigue: f64,
    config: AnalyzerConfig,
    history: Vec<ScoringSample>,
}

impl FeedbackAnalyzer {
    pub fn new(experience: impl Into<String>, baseline_fatigue: f64) -> Self {
        Self::with_config(experience, baseline_fatigue, AnalyzerConfig::default())
    }

    pub fn with_config(
        experience: impl Into<String>,
        baseline_fatigue: f64,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            experience: experience.into(),
            baseline_fatigue,
            config,
            history: Vec::new(),
        }
    }

    /// Snapshot of the profile's tier; later profile edits don't follow
    pub fn for_profile(profile: &UserProfile, baseline_fatigue: f64, config: AnalyzerConfig) -> Self {
        Self::with_config(profile.experience_level.clone(), baseline_fatigue, config)
    }

    pub fn experience(&self) -> &str {
        &self.experience
    }

    pub fn baseline_fatigue(&self) -> f64 {
        self.baseline_fatigue
    }

    pub fn history(&self) -> &[ScoringSample] {
        &self.history
    }

    /// Append to history; keys are not checked here
    pub fn record_feedback(&mut self, sample: ScoringSample) {
        self.history.push(sample);
    }

    /// Weighted sum over the weighted keys present in `sample`
    pub fn compute_score(&self, sample: &ScoringSample) -> f64 {
        let score: f64 = ScoringField::all()
            .iter()
            .filter_map(|field| sample.get(*field).map(|v| v * self.config.weights.weight(*field)))
            .sum();
        round2(score)
    }

    /// Scores of every recorded sample, in submission order
    pub fn scores(&self) -> Vec<f64> {
        self.history.iter().map(|s| self.compute_score(s)).collect()
    }

    pub fn classify_progression(&self, score: f64) -> Result<Progression> {
        let level: ExperienceLevel = self.experience.parse()?;
        let thresholds = level.thresholds();

        let progression = if score >= thresholds.progressing {
            Progression::Progressing
        } else if score >= thresholds.plateauing {
            Progression::Plateauing
        } else {
            Progression::Regressing
        };
        Ok(progression)
    }

    /// Deload check over the configured window
    pub fn should_deload(&self) -> bool {
        self.should_deload_over(self.config.deload_window)
    }

    /// True when each of the last `window` fatigue readings exceeds baseline;
    /// an empty window holds vacuously
    pub fn should_deload_over(&self, window: usize) -> bool {
        if self.history.len() < window {
            return false;
        }

        self.history[self.history.len() - window..]
            .iter()
            .all(|entry| match entry.get(ScoringField::Fatigue) {
                Some(fatigue) => fatigue > self.baseline_fatigue,
                None => false,
            })
    }

    /// Record, score, classify and check deload in one step
    pub fn assess(&mut self, sample: ScoringSample) -> Result<FeedbackVerdict> {
        let score = self.compute_score(&sample);
        self.record_feedback(sample);
        let progression = self.classify_progression(score)?;

        Ok(FeedbackVerdict {
            score,
            progression,
            deload: self.should_deload(),
        })
    }
}
