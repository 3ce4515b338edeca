//! Error taxonomy shared by the repository, auth gate and HTTP layer

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for blog operations
pub type Result<T> = std::result::Result<T, BlogError>;

/// A single failed check on a submitted site configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
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

/// Errors that can occur while serving or mutating blog content
#[derive(Debug, Error)]
pub enum BlogError {
    /// No credentials, or the admin password did not match
    #[error("{0}")]
    Unauthorized(String),

    /// A token was presented but it is invalid or lacks the admin role
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate slug
    #[error("{0}")]
    Conflict(String),

    /// Malformed input: missing fields, bad slug characters, bad uploads
    #[error("{0}")]
    Validation(String),

    /// Site configuration rejected field by field
    #[error("Config validation failed")]
    InvalidConfig(Vec<FieldError>),

    #[error("Markdown rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl BlogError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        BlogError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        BlogError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        BlogError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        BlogError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        BlogError::Validation(msg.into())
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            BlogError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BlogError::Forbidden(_) => StatusCode::FORBIDDEN,
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::Conflict(_) => StatusCode::CONFLICT,
            BlogError::Validation(_) | BlogError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            BlogError::Render(_)
            | BlogError::Io(_)
            | BlogError::Yaml(_)
            | BlogError::Json(_)
            | BlogError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code included in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            BlogError::Unauthorized(_) => "UNAUTHORIZED",
            BlogError::Forbidden(_) => "FORBIDDEN",
            BlogError::NotFound(_) => "NOT_FOUND",
            BlogError::Conflict(_) => "CONFLICT",
            BlogError::Validation(_) | BlogError::InvalidConfig(_) => "VALIDATION_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BlogError::unauthorized("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(BlogError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(BlogError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(BlogError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(BlogError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            BlogError::InvalidConfig(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_io_is_internal() {
        let err: BlogError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert!(err.is_internal());
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
