//! Error handling for the career mentor pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CareerMentorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document unreadable: {0}")]
    DocumentUnreadable(String),

    #[error("Malformed extraction response: {0}")]
    ExtractionMalformed(String),

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, CareerMentorError>;

impl CareerMentorError {
    /// Errors that make every further document pointless to attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CareerMentorError::ConfigurationMissing(_) | CareerMentorError::Configuration(_)
        )
    }
}

/// Network, timeout and status failures all surface as the collaborator's error
impl From<reqwest::Error> for CareerMentorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CareerMentorError::ExternalService(format!("request timed out: {}", err))
        } else if let Some(status) = err.status() {
            CareerMentorError::ExternalService(format!("service returned {}: {}", status, err))
        } else {
            CareerMentorError::ExternalService(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(CareerMentorError::ConfigurationMissing("AZURE_OPENAI_KEY".into()).is_fatal());
        assert!(!CareerMentorError::ExternalService("quota".into()).is_fatal());
        assert!(!CareerMentorError::DocumentUnreadable("cv.pdf".into()).is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_cause() {
        let err = CareerMentorError::ConfigurationMissing("FORM_RECOGNIZER_KEY".into());
        assert_eq!(err.to_string(), "Missing configuration: FORM_RECOGNIZER_KEY");
    }
}
