//! Error types module
//!
//! All errors are unified under the `AppError` enum, which can represent
//! database, search-index, validation, and capacity errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature so the parser and models can be used without a database.

use crate::hierarchy::ingest::IngestError;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like capacity limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response characteristics.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CAPACITY_EXCEEDED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Search index error: {0}")]
    SearchIndex(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Duplicate attribute name(s): {}", .0.join(", "))]
    DuplicateAttribute(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("Enabled custom fields limit of {limit} would be exceeded")]
    CapacityExceeded { limit: i64 },

    #[error("Already in requested state: {0}")]
    AlreadyInState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
/// Reduces duplication in the ErrorMetadata impl; client_message stays per-variant.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::Database(_) => (500, "DATABASE_ERROR", true, true, LogLevel::Error),
        AppError::SearchIndex(_) => (500, "SEARCH_INDEX_ERROR", true, true, LogLevel::Error),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::BadRequest(_) => (400, "BAD_REQUEST", false, false, LogLevel::Debug),
        AppError::Ingest(e) => (400, e.code(), false, false, LogLevel::Debug),
        AppError::DuplicateAttribute(_) => {
            (400, "DUPLICATE_ATTRIBUTE_NAME", false, false, LogLevel::Debug)
        }
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::OrganizationNotFound(_) => {
            (404, "ORGANIZATION_NOT_FOUND", false, false, LogLevel::Debug)
        }
        AppError::CapacityExceeded { .. } => {
            (400, "CAPACITY_EXCEEDED", false, false, LogLevel::Warn)
        }
        AppError::AlreadyInState(_) => (400, "ALREADY_IN_STATE", false, false, LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::SearchIndex(_) => "SearchIndex",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Ingest(_) => "Ingest",
            AppError::DuplicateAttribute(_) => "DuplicateAttribute",
            AppError::NotFound(_) => "NotFound",
            AppError::OrganizationNotFound(_) => "OrganizationNotFound",
            AppError::CapacityExceeded { .. } => "CapacityExceeded",
            AppError::AlreadyInState(_) => "AlreadyInState",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including the error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::SearchIndex(_) => "Failed to access search index".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::Ingest(ref e) => e.to_string(),
            AppError::DuplicateAttribute(ref names) => format!(
                "Attribute name(s) already in use for this organization: {}",
                names.join(", ")
            ),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::OrganizationNotFound(ref msg) => msg.clone(),
            AppError::CapacityExceeded { limit } => format!(
                "Cannot enable this custom field. The maximum limit of {} enabled custom fields would be exceeded.",
                limit
            ),
            AppError::AlreadyInState(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_capacity_exceeded() {
        let err = AppError::CapacityExceeded { limit: 20 };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "CAPACITY_EXCEEDED");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("20"));
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_duplicate_attribute() {
        let err = AppError::DuplicateAttribute(vec!["region".to_string(), "city".to_string()]);
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "DUPLICATE_ATTRIBUTE_NAME");
        assert!(err.client_message().contains("region"));
        assert!(err.client_message().contains("city"));
    }

    #[test]
    fn test_error_metadata_ingest_uses_inner_code() {
        let err = AppError::Ingest(IngestError::MissingHeaderRow);
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "MISSING_HEADER_ROW");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_unauthorized() {
        let err = AppError::Unauthorized("invalid auth token".to_string());
        assert_eq!(err.http_status_code(), 401);
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(err.client_message(), "invalid auth token");
    }
}
