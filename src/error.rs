// src/error.rs
use std::fmt;

use thiserror::Error;
use validator::ValidationErrors;

use crate::types::application::ApplicationStatus;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// A single form field that failed client-side validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flatten derive-validation failures into field errors, ordered by field name
pub fn field_errors_from(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, problems)| {
            let field = field.to_string();
            problems
                .iter()
                .map(|problem| {
                    let message = problem
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is not valid", field));
                    FieldError::new(field.clone(), message)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    #[error("Not authorized, log in again")]
    Unauthorized(Option<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Session expired, log in again")]
    SessionExpired,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    /// Text shown to a person: the server's own message when it sent one
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Validation(errors) => join_fields(errors),
            ApiError::NotFound(message) => message.clone(),
            ApiError::Unauthorized(Some(message)) => message.clone(),
            ApiError::Unauthorized(None) | ApiError::SessionExpired | ApiError::IllegalTransition { .. } => {
                self.to_string()
            }
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Server {
            status: 400,
            message: Some("You have already applied for this job".to_string()),
        };
        assert_eq!(err.user_message(), "You have already applied for this job");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        let err = ApiError::Server {
            status: 502,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(
            ApiError::Transport("connection refused".into()).user_message(),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_unauthorized_keeps_server_text() {
        let err = ApiError::Unauthorized(Some("Your account is suspended".to_string()));
        assert_eq!(err.user_message(), "Your account is suspended");
        assert_eq!(
            ApiError::Unauthorized(None).user_message(),
            "Not authorized, log in again"
        );
    }

    #[test]
    fn test_validation_lists_every_field() {
        let err = ApiError::Validation(vec![
            FieldError::new("phone", "phone is required"),
            FieldError::new("resume", "resume required"),
        ]);
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(
            err.user_message(),
            "phone: phone is required; resume: resume required"
        );
    }
}
