// ABOUTME: Unified error type and error codes shared by every Gymtrack layer
// ABOUTME: Maps backend HTTP statuses to stable codes and keeps backend messages verbatim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! # Unified Error Handling
//!
//! Every fallible operation in the client returns [`AppResult`]. Errors carry a
//! stable [`ErrorCode`], the human-readable message (for backend failures this
//! is the backend's own message, unmodified) and optional context.
//!
//! Nothing here classifies errors as retryable: the caller decides whether to
//! prompt the user again.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Standard error codes used throughout the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication (1000-1999)
    /// No signed-in session
    AuthRequired = 1000,
    /// Credentials rejected by the identity service
    AuthInvalid = 1001,
    /// Session expired and could not be refreshed
    AuthExpired = 1002,
    /// Row-level security or similar refusal
    PermissionDenied = 1004,

    // Validation (3000-3999)
    /// Input rejected before or by the backend
    InvalidInput = 3000,
    /// Required field missing
    MissingRequiredField = 3001,

    // Resources (4000-4999)
    /// Row not found
    ResourceNotFound = 4000,
    /// Unique constraint violation
    ResourceAlreadyExists = 4001,

    // External services (5000-5999)
    /// Backend answered with an error
    ExternalServiceError = 5000,
    /// Backend could not be reached
    ExternalServiceUnavailable = 5001,
    /// Backend rate limited the request
    ExternalRateLimited = 5003,

    // Configuration (6000-6999)
    /// Configuration invalid or missing
    ConfigError = 6000,

    // Session state (7000-7999)
    /// Operation not allowed in the current session phase
    InvalidState = 7000,
    /// Result arrived for a session that is no longer current
    StaleResult = 7001,

    // Internal (9000-9999)
    /// Unexpected internal failure
    InternalError = 9000,
    /// Local storage (session file) failure
    StorageError = 9002,
    /// Payload could not be (de)serialized
    SerializationError = 9003,
}

impl ErrorCode {
    /// Numeric value of the code
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Map an HTTP status returned by the backend onto an error code
    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::InvalidInput,
            401 => Self::AuthInvalid,
            403 => Self::PermissionDenied,
            404 | 406 => Self::ResourceNotFound,
            409 => Self::ResourceAlreadyExists,
            429 => Self::ExternalRateLimited,
            502..=504 => Self::ExternalServiceUnavailable,
            _ => Self::ExternalServiceError,
        }
    }

    /// Whether the code belongs to the authentication range
    #[must_use]
    pub const fn is_auth(self) -> bool {
        matches!(
            self,
            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired | Self::PermissionDenied
        )
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required",
            Self::AuthInvalid => "Authentication failed",
            Self::AuthExpired => "The session has expired",
            Self::PermissionDenied => "Permission denied",
            Self::InvalidInput => "Invalid input",
            Self::MissingRequiredField => "A required field is missing",
            Self::ResourceNotFound => "Resource not found",
            Self::ResourceAlreadyExists => "Resource already exists",
            Self::ExternalServiceError => "Backend request failed",
            Self::ExternalServiceUnavailable => "Backend is unavailable",
            Self::ExternalRateLimited => "Backend rate limit exceeded",
            Self::ConfigError => "Configuration error",
            Self::InvalidState => "Operation not allowed in the current state",
            Self::StaleResult => "Result belongs to a session that is no longer active",
            Self::InternalError => "Internal error",
            Self::StorageError => "Local storage error",
            Self::SerializationError => "Data serialization failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Backend collection involved, if any
    pub collection: Option<String>,
    /// User the operation ran for
    pub user_id: Option<Uuid>,
    /// Row identifier if applicable
    pub resource_id: Option<String>,
    /// HTTP status returned by the backend
    pub http_status: Option<u16>,
}

/// Unified error type for the client
#[derive(Debug, Error)]
#[error("{}: {message}", .code.description())]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Attach the collection the failing request targeted
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.context.collection = Some(collection.into());
        self
    }

    /// Attach a user id
    #[must_use]
    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.context.user_id = Some(user_id);
        self
    }

    /// Attach a row id
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Attach the backend HTTP status
    #[must_use]
    pub const fn with_http_status(mut self, status: u16) -> Self {
        self.context.http_status = Some(status);
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The message as shown to the user: backend text, unprefixed
    #[must_use]
    pub fn user_message(&self) -> &str {
        &self.message
    }
}

/// Convenience constructors for common errors
impl AppError {
    /// No signed-in session
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Not signed in")
    }

    /// Credentials rejected; keeps the identity service message verbatim
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Session could not be refreshed
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Session has expired")
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Operation not allowed in the current session phase
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// Result superseded by a newer session generation
    #[must_use]
    pub fn stale_result() -> Self {
        Self::new(
            ErrorCode::StaleResult,
            "Session changed while the request was in flight",
        )
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Local storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// Backend returned an error with the given HTTP status
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::from_http_status(status), message).with_http_status(status)
    }

    /// Backend could not be reached
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceUnavailable, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::from_http_status(401), ErrorCode::AuthInvalid);
        assert_eq!(ErrorCode::from_http_status(404), ErrorCode::ResourceNotFound);
        assert_eq!(
            ErrorCode::from_http_status(409),
            ErrorCode::ResourceAlreadyExists
        );
        assert_eq!(
            ErrorCode::from_http_status(503),
            ErrorCode::ExternalServiceUnavailable
        );
        assert_eq!(
            ErrorCode::from_http_status(500),
            ErrorCode::ExternalServiceError
        );
    }

    #[test]
    fn test_backend_error_keeps_message_verbatim() {
        let error = AppError::backend(400, "Invalid login credentials");
        assert_eq!(error.user_message(), "Invalid login credentials");
        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(error.context.http_status, Some(400));
    }

    #[test]
    fn test_display_includes_description() {
        let error = AppError::not_found("Workout");
        assert_eq!(error.to_string(), "Resource not found: Workout not found");
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::InvalidState).unwrap();
        assert_eq!(json, "\"INVALID_STATE\"");
        assert!(ErrorCode::AuthExpired.is_auth());
        assert!(!ErrorCode::StaleResult.is_auth());
    }
}
