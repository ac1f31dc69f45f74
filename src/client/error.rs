use crate::validation::summary;
use reqwest::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

/// Everything a call through [`ApiClient`](super::ApiClient) can fail with.
/// None of these are retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },

    #[error("Validation error: {}", summary(.0))]
    Validation(#[from] ValidationErrors),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            ClientError::Validation(_) | ClientError::InvalidUrl(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{check_not_blank, collect};

    #[test]
    fn api_errors_display_the_server_message() {
        let err = ClientError::Api {
            status: StatusCode::FORBIDDEN,
            message: "Only event organizers can view RSVPs".into(),
            details: None,
        };
        assert_eq!(err.to_string(), "Only event organizers can view RSVPs");
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(!err.is_not_found());
    }

    #[test]
    fn validation_errors_list_fields() {
        let mut errors = ValidationErrors::new();
        collect(&mut errors, "venue", check_not_blank("", "Venue is required"));
        let err = ClientError::from(errors);
        assert_eq!(err.to_string(), "Validation error: venue: Venue is required");
        assert_eq!(err.status(), None);
    }
}
