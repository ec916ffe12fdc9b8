//! Error types for fieldwork-core

use thiserror::Error;

/// Result type alias using fieldwork-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when the collaborator rejects a request with 403 and no body.
pub const DEFAULT_FORBIDDEN_MESSAGE: &str = "You are not allowed to perform this action.";

/// Errors that can occur in fieldwork-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The session is missing, expired, or was rejected with 401
    #[error("Session expired. Please log in again.")]
    Unauthorized,

    /// Login was rejected with 401
    #[error("Invalid username or password.")]
    InvalidCredentials,

    /// The collaborator rejected the request with 403
    #[error("Not allowed: {0}")]
    Forbidden(String),

    /// Client-side validation failed before any request was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Non-success response from the collaborator API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF decode/encode error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secure session storage error
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

impl From<lopdf::Error> for Error {
    fn from(error: lopdf::Error) -> Self {
        Self::Pdf(error.to_string())
    }
}

/// Coarse error buckets that decide how a user-facing surface reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 401: clear the session and route to login.
    Authentication,
    /// 403: show a "not allowed" message.
    Authorization,
    /// Client-side required-field checks.
    Validation,
    /// Everything else: surfaced as a blocking alert.
    Network,
}

impl Error {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => ErrorCategory::Authentication,
            Self::Forbidden(_) => ErrorCategory::Authorization,
            Self::Validation(_) | Self::InvalidInput(_) => ErrorCategory::Validation,
            _ => ErrorCategory::Network,
        }
    }

    /// Returns true when the caller must drop the session and show login.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Short text suitable for an alert body.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Please log in again.".to_string(),
            Self::Forbidden(message)
            | Self::Validation(message)
            | Self::InvalidInput(message) => message.clone(),
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_status_semantics() {
        assert_eq!(Error::Unauthorized.category(), ErrorCategory::Authentication);
        assert_eq!(
            Error::Forbidden("nope".to_string()).category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            Error::Validation("Customer is required".to_string()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            Error::Api {
                status: 500,
                message: "boom".to_string()
            }
            .category(),
            ErrorCategory::Network
        );
    }

    #[test]
    fn only_unauthorized_requires_login() {
        assert!(Error::Unauthorized.requires_login());
        assert!(!Error::Forbidden(DEFAULT_FORBIDDEN_MESSAGE.to_string()).requires_login());
    }

    #[test]
    fn user_message_prefers_server_text() {
        let error = Error::Api {
            status: 413,
            message: "Payload too large".to_string(),
        };
        assert_eq!(error.user_message(), "Payload too large");
    }
}
