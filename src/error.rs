//! Request-level error type
//!
//! Every fallible step of the request pipeline returns `AppError`. The router
//! catches it once, logs it and renders `{"error": message}`.

use hyper::StatusCode;
use thiserror::Error;

/// Message shown to clients for failures that carry no message of their own
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Ocorreu um erro inesperado.";

#[derive(Error, Debug)]
pub enum AppError {
    /// Application error with a client-facing message and an optional status
    /// (500 when absent)
    #[error("{message}")]
    App {
        message: String,
        status: Option<StatusCode>,
    },

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    RequestBody(Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    /// Error rendered with the given status and message
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::App {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Error rendered as 500 with its own message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::App {
            message: message.into(),
            status: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::App { status, .. } => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Upstream(_) | Self::Json(_) | Self::RequestBody(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to the client
    pub fn public_message(&self) -> &str {
        match self {
            Self::App { message, .. } => message,
            Self::Upstream(_) | Self::Json(_) | Self::RequestBody(_) => UNEXPECTED_ERROR_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_status_and_message() {
        let err = AppError::status(StatusCode::UNPROCESSABLE_ENTITY, "Invalid captcha");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.public_message(), "Invalid captcha");
    }

    #[test]
    fn test_internal_error_defaults_to_500() {
        let err = AppError::internal("Error connecting to database.");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Error connecting to database.");
    }

    #[test]
    fn test_unrecognized_error_is_generic() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(source);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), UNEXPECTED_ERROR_MESSAGE);
        assert!(err.to_string().starts_with("Malformed JSON"));
    }
}
