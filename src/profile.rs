//! User profile - static attributes and experience tiers

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlexifitError;

/// Training experience tier, drives progression thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Score cut-offs for one experience tier (both inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub progressing: f64,
    pub plateauing: f64,
}

impl ExperienceLevel {
    pub fn name(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    /// All tiers for iteration
    pub fn all() -> &'static [ExperienceLevel] {
        &[
            ExperienceLevel::Beginner,
            ExperienceLevel::Intermediate,
            ExperienceLevel::Advanced,
        ]
    }

    /// Progression thresholds for this tier
    pub fn thresholds(&self) -> Thresholds {
        match self {
            ExperienceLevel::Beginner => Thresholds { progressing: 3.0, plateauing: 2.0 },
            ExperienceLevel::Intermediate => Thresholds { progressing: 4.0, plateauing: 3.0 },
            ExperienceLevel::Advanced => Thresholds { progressing: 4.5, plateauing: 3.5 },
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExperienceLevel {
    type Err = FlexifitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperienceLevel::all()
            .iter()
            .find(|level| level.name() == s)
            .copied()
            .ok_or_else(|| FlexifitError::InvalidExperienceLevel { level: s.to_string() })
    }
}

/// Identity and static attributes of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub age: u32,
    pub gender: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// e.g. "chronic knee pain", "no restrictions"
    pub health_conditions: String,
    /// e.g. "fat loss", "muscle gain"
    pub primary_goal: String,
    /// Raw tier tag; only checked when a score is classified
    pub experience_level: String,
    /// e.g. {"weekly_sessions": 3, "session_length": 45}
    pub workout_habits: HashMap<String, i32>,
}

/// Partial profile update, `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub health_conditions: Option<String>,
    pub primary_goal: Option<String>,
    pub experience_level: Option<String>,
    pub workout_habits: Option<HashMap<String, i32>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

impl UserProfile {
    /// Apply each supplied field; no range or tier validation here
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(weight) = update.weight_kg {
            self.weight_kg = weight;
        }
        if let Some(conditions) = update.health_conditions {
            self.health_conditions = conditions;
        }
        if let Some(goal) = update.primary_goal {
            self.primary_goal = goal;
        }
        if let Some(level) = update.experience_level {
            self.experience_level = level;
        }
        if let Some(habits) = update.workout_habits {
            self.workout_habits = habits;
        }
    }
}
