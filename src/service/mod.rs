//! Service module - request boundary in front of the per-user analyzers
//!
//! Resolves users, validates scoring payloads and turns verdicts and errors
//! into flat JSON replies. `serve` runs the newline-delimited JSON host loop.

use std::collections::HashMap;

use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::config::AnalyzerConfig;
use crate::error::{FlexifitError, Result};
use crate::profile::UserProfile;
use crate::ml::{FeedbackAnalyzer, FeedbackVerdict, ScoreTrend, ScoringField, ScoringSample, TrendReport};

/// Registry of analyzers keyed by external user id
pub struct FeedbackService {
    config: AnalyzerConfig,
    analyzers: HashMap<String, FeedbackAnalyzer>,
}

impl FeedbackService {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            analyzers: HashMap::new(),
        }
    }

    /// Service with one user already registered
    pub fn with_user(
        config: AnalyzerConfig,
        user_id: &str,
        experience: &str,
        baseline_fatigue: f64,
    ) -> Result<Self> {
        let mut service = Self::new(config);
        service.register(user_id, experience, baseline_fatigue)?;
        Ok(service)
    }

    /// Register an analyzer; the tier tag is checked only when scoring
    pub fn register(&mut self, user_id: &str, experience: &str, baseline_fatigue: f64) -> Result<()> {
        if self.analyzers.contains_key(user_id) {
            return Err(FlexifitError::UserExists { user_id: user_id.to_string() });
        }

        let analyzer = FeedbackAnalyzer::with_config(experience, baseline_fatigue, self.config.clone());
        self.analyzers.insert(user_id.to_string(), analyzer);
        info!(user_id, experience, baseline_fatigue, "user registered");
        Ok(())
    }

    /// Register a user from their profile, keyed by the profile id
    pub fn register_profile(&mut self, profile: &UserProfile, baseline_fatigue: f64) -> Result<()> {
        let user_id = profile.user_id.to_string();
        if self.analyzers.contains_key(&user_id) {
            return Err(FlexifitError::UserExists { user_id });
        }

        let analyzer = FeedbackAnalyzer::for_profile(profile, baseline_fatigue, self.config.clone());
        info!(user_id = %user_id, experience = analyzer.experience(), baseline_fatigue, "user registered from profile");
        self.analyzers.insert(user_id, analyzer);
        Ok(())
    }

    pub fn analyzer(&self, user_id: &str) -> Option<&FeedbackAnalyzer> {
        self.analyzers.get(user_id)
    }

    /// Registered ids, sorted
    pub fn user_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.analyzers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Score one feedback request for the user it names
    pub fn submit(&mut self, payload: &Value) -> Result<FeedbackVerdict> {
        let object = payload.as_object().ok_or_else(|| FlexifitError::InvalidPayload {
            reason: "expected a JSON object".to_string(),
        })?;
        if object.is_empty() {
            return Err(FlexifitError::InvalidPayload { reason: "no data provided".to_string() });
        }

        // Only string ids are looked up
        let user_id = match object.get("user_id") {
            Some(Value::String(id)) if self.analyzers.contains_key(id) => id.clone(),
            Some(Value::String(id)) => return Err(FlexifitError::UserNotFound { user_id: id.clone() }),
            Some(other) => return Err(FlexifitError::UserNotFound { user_id: other.to_string() }),
            None => return Err(FlexifitError::UserNotFound { user_id: "<missing>".to_string() }),
        };

        let sample = scoring_sample(object)?;
        let analyzer = self
            .analyzers
            .get_mut(&user_id)
            .ok_or_else(|| FlexifitError::UserNotFound { user_id: user_id.clone() })?;

        let verdict = analyzer.assess(sample)?;
        info!(
            user_id = %user_id,
            score = verdict.score,
            progression = %verdict.progression,
            deload = verdict.deload,
            "feedback scored"
        );
        Ok(verdict)
    }

    /// Score trend for a user, `None` while history is too short
    pub fn trend(&self, user_id: &str) -> Result<Option<TrendReport>> {
        let analyzer = self
            .analyzer(user_id)
            .ok_or_else(|| FlexifitError::UserNotFound { user_id: user_id.to_string() })?;

        let trend = ScoreTrend::fit(&analyzer.scores());
        if let Some(t) = &trend {
            debug!(user_id, "{}", t.format_report());
        }
        Ok(trend.map(|t| t.report()))
    }

    /// Handle one request line, `None` for blank lines
    pub fn handle_line(&mut self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let reply = match serde_json::from_str::<Value>(line) {
            Ok(payload) => match self.submit(&payload) {
                Ok(verdict) => success_reply(&verdict),
                Err(e) => error_reply(&e),
            },
            Err(e) => error_reply(&FlexifitError::InvalidPayload { reason: e.to_string() }),
        };
        Some(reply)
    }
}

/// Pull the four weighted fields out of a request; other keys are dropped
fn scoring_sample(object: &Map<String, Value>) -> Result<ScoringSample> {
    let missing: Vec<&'static str> = ScoringField::all()
        .iter()
        .map(|f| f.key())
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(FlexifitError::MissingFields { fields: missing });
    }

    let mut sample = ScoringSample::new();
    for field in ScoringField::all() {
        let value = object
            .get(field.key())
            .and_then(Value::as_f64)
            .ok_or_else(|| FlexifitError::InvalidPayload {
                reason: format!("field '{}' must be a number", field.key()),
            })?;
        sample.set(*field, value);
    }
    Ok(sample)
}

pub fn success_reply(verdict: &FeedbackVerdict) -> Value {
    json!({
        "status": "success",
        "score": verdict.score,
        "progression": verdict.progression,
        "deload": verdict.deload,
    })
}

pub fn error_reply(error: &FlexifitError) -> Value {
    warn!(status = ?error.status(), "request rejected: {}", error);
    json!({
        "status": error.status(),
        "error": error.to_string(),
    })
}

/// Answer newline-delimited JSON requests until the reader is exhausted
pub async fn serve<R, W>(service: &mut FeedbackService, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Serving feedback requests ({} users registered)", service.user_ids().len());

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(reply) = service.handle_line(&line) {
            writer.write_all(reply.to_string().as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    info!("Input closed, stopping");
    Ok(())
}
