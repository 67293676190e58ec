// src/application/error_handling.rs
//
// Error responses for callers
//
// ARCHITECTURE:
// - Maps internal errors → stable, serialisable categories
// - Provides one error format for every command
// - Never exposes storage internals (those are logged instead)

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::error::AppError;

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Referenced node, meta entry or media item does not exist
    NotFound,

    /// Malformed input (ids, locales, blank titles)
    Validation,

    /// Request conflicts with current tree state (cycle, children, duplicate key, lock)
    Conflict,

    /// Tree found inconsistent; the mutation was rolled back
    InvariantViolation,

    /// Database/persistence error
    Database,

    /// File system error
    FileSystem,

    /// Bad configuration
    Configuration,

    /// Other/unknown error
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }

    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::Domain(domain_error) => Self::from_domain_error(domain_error),

            AppError::Database(db_error) => {
                log::error!("database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => {
                log::error!("serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => Self::new(
                ErrorType::FileSystem,
                "File system operation failed",
                Some(io_error.to_string()),
            ),

            AppError::Config(message) => {
                Self::new(ErrorType::Configuration, "Invalid configuration", Some(message))
            }

            AppError::Other(message) => {
                log::error!("other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    fn from_domain_error(error: DomainError) -> Self {
        let details = Some(error.to_string());
        match error {
            DomainError::NotFound(_) => Self::new(ErrorType::NotFound, "Resource not found", details),
            DomainError::Cycle { .. } => Self::new(
                ErrorType::Conflict,
                "A node cannot be moved into its own subtree",
                details,
            ),
            DomainError::HasChildren { .. } => Self::new(
                ErrorType::Conflict,
                "Node has children; delete with cascade",
                details,
            ),
            DomainError::DuplicateKey(_) => {
                Self::new(ErrorType::Conflict, "Key is already in use", details)
            }
            DomainError::Locked(_) => Self::new(ErrorType::Conflict, "Node is locked", details),
            DomainError::InvalidPosition(_) => {
                Self::new(ErrorType::Validation, "Invalid position", details)
            }
            DomainError::Validation(_) => {
                Self::new(ErrorType::Validation, "Validation failed", details)
            }
            DomainError::InvariantViolation(message) => {
                log::error!("invariant violation: {}", message);
                Self::new(ErrorType::InvariantViolation, "Tree integrity check failed", details)
            }
        }
    }

    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({})", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorResponse {}

/// Command result type
pub type CommandResult<T> = Result<T, ErrorResponse>;
