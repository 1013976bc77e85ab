//! Error types shared by the store, the scoring engine and the service boundary

use serde::Serialize;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, FlexifitError>;

/// Status class a host reports for an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatus {
    NotFound,
    BadInput,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum FlexifitError {
    /// Experience tag is not one of beginner/intermediate/advanced
    #[error("Invalid experience level: {level}")]
    InvalidExperienceLevel { level: String },

    /// Scoring payload lacks one or more weighted fields
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("User already registered: {user_id}")]
    UserExists { user_id: String },

    /// Request could not be interpreted at all
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

impl FlexifitError {
    /// Transport status class for this error
    pub fn status(&self) -> ErrorStatus {
        match self {
            FlexifitError::UserNotFound { .. } => ErrorStatus::NotFound,
            FlexifitError::MissingFields { .. }
            | FlexifitError::InvalidPayload { .. }
            | FlexifitError::UserExists { .. } => ErrorStatus::BadInput,
            // A bad tier only surfaces once scoring has started
            FlexifitError::InvalidExperienceLevel { .. } | FlexifitError::Config { .. } => {
                ErrorStatus::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_fields() {
        let err = FlexifitError::MissingFields {
            fields: vec!["fatigue", "adherence"],
        };
        assert_eq!(err.to_string(), "Missing required fields: fatigue, adherence");
    }

    #[test]
    fn test_status_classes() {
        let not_found = FlexifitError::UserNotFound { user_id: "x".into() };
        let bad = FlexifitError::InvalidPayload { reason: "no object".into() };
        let tier = FlexifitError::InvalidExperienceLevel { level: "expert".into() };

        assert_eq!(not_found.status(), ErrorStatus::NotFound);
        assert_eq!(bad.status(), ErrorStatus::BadInput);
        assert_eq!(tier.status(), ErrorStatus::Internal);
    }
}
