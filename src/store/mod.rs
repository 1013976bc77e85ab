//! Store module - in-memory profile and append-only training history

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::{ProfileUpdate, UserProfile};

/// One logged workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub recorded_at: DateTime<Utc>,
    pub duration_mins: u32,
    /// Ordered, duplicates allowed
    pub exercises: Vec<String>,
    /// Nominal 1-10, not enforced
    pub intensity: f64,
    /// e.g. {"sets": 3, "reps": 10, "calories": 100}
    pub completion: HashMap<String, i32>,
}

impl TrainingSession {
    pub fn update_duration(&mut self, duration_mins: u32) {
        self.duration_mins = duration_mins;
    }

    pub fn update_exercises(&mut self, exercises: Vec<String>) {
        self.exercises = exercises;
    }

    pub fn update_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
    }

    pub fn update_completion(&mut self, completion: HashMap<String, i32>) {
        self.completion = completion;
    }
}

/// Subjective report for a session (ratings nominal 1-10)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSample {
    pub recorded_at: DateTime<Utc>,
    pub difficulty: f64,
    pub fatigue: f64,
    pub satisfaction: f64,
    pub notes: Option<String>,
}

impl FeedbackSample {
    /// Overwrite only the ratings that are supplied
    pub fn update_ratings(
        &mut self,
        difficulty: Option<f64>,
        fatigue: Option<f64>,
        satisfaction: Option<f64>,
    ) {
        if let Some(d) = difficulty {
            self.difficulty = d;
        }
        if let Some(f) = fatigue {
            self.fatigue = f;
        }
        if let Some(s) = satisfaction {
            self.satisfaction = s;
        }
    }

    pub fn update_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }
}

/// Usage snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralRecord {
    pub recorded_at: DateTime<Utc>,
    /// e.g. {"clicks": 25.0, "browsing_time": 180.0, "page_views": 10.0}
    pub usage: HashMap<String, f64>,
    /// e.g. "drag-and-drop reordering"
    pub plan_adjustments: String,
}

impl BehavioralRecord {
    /// Insert or overwrite a single usage metric
    pub fn update_usage_record(&mut self, key: impl Into<String>, value: f64) {
        self.usage.insert(key.into(), value);
    }

    pub fn update_plan_adjustments(&mut self, adjustments: impl Into<String>) {
        self.plan_adjustments = adjustments.into();
    }
}

/// A user's profile plus three independent append-only logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessUser {
    profile: UserProfile,
    training_log: Vec<TrainingSession>,
    feedback_log: Vec<FeedbackSample>,
    behavioral_log: Vec<BehavioralRecord>,
}

impl FitnessUser {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            training_log: Vec::new(),
            feedback_log: Vec::new(),
            behavioral_log: Vec::new(),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Append a training session and return the stored record
    pub fn log_training(
        &mut self,
        duration_mins: u32,
        intensity: f64,
        exercises: Vec<String>,
        completion: HashMap<String, i32>,
    ) -> &mut TrainingSession {
        let session = TrainingSession {
            recorded_at: Utc::now(),
            duration_mins,
            exercises,
            intensity,
            completion,
        };
        self.training_log.push(session);
        debug!(user_id = self.profile.user_id, total = self.training_log.len(), "training logged");

        let last = self.training_log.len() - 1;
        &mut self.training_log[last]
    }

    /// Append a feedback report and return the stored record
    pub fn submit_feedback(
        &mut self,
        difficulty: f64,
        fatigue: f64,
        satisfaction: f64,
        notes: Option<String>,
    ) -> &mut FeedbackSample {
        self.feedback_log.push(FeedbackSample {
            recorded_at: Utc::now(),
            difficulty,
            fatigue,
            satisfaction,
            notes,
        });
        debug!(user_id = self.profile.user_id, total = self.feedback_log.len(), "feedback submitted");

        let last = self.feedback_log.len() - 1;
        &mut self.feedback_log[last]
    }

    /// Append a usage snapshot and return the stored record
    pub fn record_behavior(
        &mut self,
        usage: HashMap<String, f64>,
        plan_adjustments: impl Into<String>,
    ) -> &mut BehavioralRecord {
        self.behavioral_log.push(BehavioralRecord {
            recorded_at: Utc::now(),
            usage,
            plan_adjustments: plan_adjustments.into(),
        });
        debug!(user_id = self.profile.user_id, total = self.behavioral_log.len(), "behavior recorded");

        let last = self.behavioral_log.len() - 1;
        &mut self.behavioral_log[last]
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        self.profile.apply(update);
    }

    pub fn training_log(&self) -> &[TrainingSession] {
        &self.training_log
    }

    pub fn feedback_log(&self) -> &[FeedbackSample] {
        &self.feedback_log
    }

    pub fn behavioral_log(&self) -> &[BehavioralRecord] {
        &self.behavioral_log
    }

    /// Logged session by position, for field-level annotation
    pub fn training_mut(&mut self, index: usize) -> Option<&mut TrainingSession> {
        self.training_log.get_mut(index)
    }

    pub fn feedback_mut(&mut self, index: usize) -> Option<&mut FeedbackSample> {
        self.feedback_log.get_mut(index)
    }

    pub fn behavior_mut(&mut self, index: usize) -> Option<&mut BehavioralRecord> {
        self.behavioral_log.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_user() -> FitnessUser {
        FitnessUser::new(UserProfile {
            user_id: 7,
            age: 28,
            gender: "male".to_string(),
            height_cm: 180.0,
            weight_kg: 80.0,
            health_conditions: "chronic knee pain".to_string(),
            primary_goal: "fat loss".to_string(),
            experience_level: "intermediate".to_string(),
            workout_habits: HashMap::from([("weekly_sessions".to_string(), 4)]),
        })
    }

    fn stats(sets: i32, reps: i32) -> HashMap<String, i32> {
        HashMap::from([("sets".to_string(), sets), ("reps".to_string(), reps)])
    }

    #[test]
    fn test_new_user_has_empty_logs() {
        let user = create_user();
        assert!(user.training_log().is_empty());
        assert!(user.feedback_log().is_empty());
        assert!(user.behavioral_log().is_empty());
    }

    #[test]
    fn test_log_training_appends_in_order() {
        let mut user = create_user();
        user.log_training(45, 7.0, vec!["squat".into(), "squat".into()], stats(3, 10));
        user.log_training(30, 5.5, vec!["plank".into()], stats(2, 1));

        let log = user.training_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].duration_mins, 45);
        assert_eq!(log[0].exercises, vec!["squat", "squat"]);
        assert_eq!(log[1].intensity, 5.5);
    }

    #[test]
    fn test_log_training_returns_stored_record() {
        let mut user = create_user();
        let session = user.log_training(45, 7.0, vec!["lunge".into()], stats(3, 12));
        session.update_intensity(8.0);
        session.update_duration(50);

        assert_eq!(user.training_log()[0].intensity, 8.0);
        assert_eq!(user.training_log()[0].duration_mins, 50);
    }

    #[test]
    fn test_intensity_out_of_nominal_range_is_kept() {
        let mut user = create_user();
        user.log_training(10, 12.5, vec![], HashMap::new());
        assert_eq!(user.training_log()[0].intensity, 12.5);
    }

    #[test]
    fn test_submit_feedback_grows_by_one() {
        let mut user = create_user();
        for i in 0..3 {
            let before = user.feedback_log().len();
            user.submit_feedback(5.0, 4.0 + i as f64, 6.0, None);
            assert_eq!(user.feedback_log().len(), before + 1);
        }
        let fatigues: Vec<f64> = user.feedback_log().iter().map(|f| f.fatigue).collect();
        assert_eq!(fatigues, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_feedback_update_ratings_partial() {
        let mut user = create_user();
        user.submit_feedback(5.0, 4.0, 6.0, Some("felt ok".into()));

        let fb = user.feedback_mut(0).unwrap();
        fb.update_ratings(None, Some(7.0), None);
        fb.update_notes("knee hurt on last set");

        let fb = &user.feedback_log()[0];
        assert_eq!(fb.difficulty, 5.0);
        assert_eq!(fb.fatigue, 7.0);
        assert_eq!(fb.satisfaction, 6.0);
        assert_eq!(fb.notes.as_deref(), Some("knee hurt on last set"));
    }

    #[test]
    fn test_record_behavior_and_update_usage() {
        let mut user = create_user();
        let record = user.record_behavior(
            HashMap::from([("clicks".to_string(), 25.0)]),
            "drag-and-drop reordering",
        );
        record.update_usage_record("clicks", 30.0);
        record.update_usage_record("page_views", 10.0);

        let record = &user.behavioral_log()[0];
        assert_eq!(record.usage.get("clicks"), Some(&30.0));
        assert_eq!(record.usage.get("page_views"), Some(&10.0));
        assert_eq!(record.plan_adjustments, "drag-and-drop reordering");
    }

    #[test]
    fn test_logs_are_independent() {
        let mut user = create_user();
        user.log_training(20, 4.0, vec![], HashMap::new());
        user.record_behavior(HashMap::new(), "none");

        assert_eq!(user.training_log().len(), 1);
        assert_eq!(user.feedback_log().len(), 0);
        assert_eq!(user.behavioral_log().len(), 1);
    }

    #[test]
    fn test_field_update_keeps_log_length_and_order() {
        let mut user = create_user();
        user.log_training(20, 4.0, vec!["a".into()], HashMap::new());
        user.log_training(25, 5.0, vec!["b".into()], HashMap::new());

        if let Some(session) = user.training_mut(0) {
            session.update_exercises(vec!["c".into()]);
            session.update_completion(stats(1, 1));
        }

        assert_eq!(user.training_log().len(), 2);
        assert_eq!(user.training_log()[0].exercises, vec!["c"]);
        assert_eq!(user.training_log()[1].exercises, vec!["b"]);
        assert!(user.training_mut(5).is_none());
    }

    #[test]
    fn test_update_profile_without_fields() {
        let mut user = create_user();
        let before = user.profile().clone();
        user.update_profile(ProfileUpdate::default());
        assert_eq!(user.profile(), &before);
    }

    #[test]
    fn test_update_profile_does_not_touch_logs() {
        let mut user = create_user();
        user.submit_feedback(5.0, 4.0, 6.0, None);
        user.update_profile(ProfileUpdate {
            primary_goal: Some("endurance".into()),
            ..Default::default()
        });
        assert_eq!(user.profile().primary_goal, "endurance");
        assert_eq!(user.feedback_log().len(), 1);
    }
}
