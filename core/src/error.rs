//! Error handling for the Medistock core engine
//!
//! Local-store errors are fatal for the triggering operation and are never
//! retried automatically. Remote-sync errors are always soft: they are
//! logged, surfaced as warnings, and never roll back completed local
//! mutations.

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Local persistence: fatal, propagated to the caller
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Remote sync: recoverable, local state is kept
    #[error("Remote record not found in '{collection}': {key}")]
    RemoteNotFound { collection: String, key: String },

    #[error("Remote sync error: {0}")]
    Remote(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Business rules checked by callers before mutation
    #[error("Validation error: {0}")]
    Validation(#[from] shared::ValidationError),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Order cannot be deleted: {0}")]
    OrderNotDeletable(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Remote(err.to_string())
    }
}

impl AppError {
    /// Whether the error leaves the operation "locally successful, remote
    /// pending" rather than failed.
    pub fn is_remote_soft(&self) -> bool {
        matches!(
            self,
            AppError::Remote(_) | AppError::RemoteNotFound { .. }
        )
    }
}

/// Result type alias for core operations
pub type AppResult<T> = Result<T, AppError>;
