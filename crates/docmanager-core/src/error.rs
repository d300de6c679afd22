//! Error types for the DocManager system.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocManagerError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// Unauthorized: no authenticated actor, or the actor was rejected.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// Forbidden: an authenticated actor was denied by the voters.
    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Collapses "unknown", "expired" and "already used" into one outcome.
    #[error("Invalid or expired password reset token.")]
    InvalidOrExpiredToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Mail delivery failed: {0}")]
    Delivery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DocManagerResult<T> = Result<T, DocManagerError>;

/// A single field-level error, addressed by a stable field name.
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

/// Failure payload returned to callers at the outer boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl DocManagerError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            DocManagerError::NotFound { .. } => "not_found",
            DocManagerError::AlreadyExists { .. } => "already_exists",
            DocManagerError::AuthenticationFailed { .. } => "unauthorized",
            DocManagerError::AuthorizationDenied { .. } => "forbidden",
            DocManagerError::Validation { .. } => "validation_failed",
            DocManagerError::InvalidOrExpiredToken => "invalid_or_expired_token",
            DocManagerError::Database(_) => "database_error",
            DocManagerError::Crypto(_) => "crypto_error",
            DocManagerError::Delivery(_) => "delivery_failed",
            DocManagerError::Internal(_) => "internal_error",
        }
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            DocManagerError::InvalidOrExpiredToken => vec![FieldError::new(
                "token",
                "This password reset link is invalid or has expired.",
            )],
            _ => Vec::new(),
        }
    }

    /// Build the outward-facing payload. Internal failures are reported
    /// with a generic message so storage details never leak.
    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            DocManagerError::Database(_)
            | DocManagerError::Crypto(_)
            | DocManagerError::Delivery(_)
            | DocManagerError::Internal(_) => "An internal error occurred.".to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            success: false,
            code: self.code(),
            message,
            errors: self.field_errors(),
        }
    }
}
