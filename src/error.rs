//! Unified error hierarchy for gainrs
//!
//! The nutrition engine itself never fails; these errors come from the layers
//! around it (storage, configuration, input validation, export).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for gainrs operations
#[derive(Debug, Error)]
pub enum GainError {
    /// Profile storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rejected user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report export errors
    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Key/value storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a stored value failed
    #[error("Failed to read '{key}' from {path}: {source}")]
    ReadFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a value failed
    #[error("Failed to write '{key}' to {path}: {source}")]
    WriteFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing a value failed
    #[error("Failed to remove '{key}' at {path}: {source}")]
    RemoveFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key cannot be mapped onto the backing store
    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },
}

/// Result type alias for gainrs operations
pub type Result<T> = std::result::Result<T, GainError>;

impl GainError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GainError::Validation(_) => ErrorSeverity::Warning,
            GainError::Storage(StorageError::InvalidKey { .. }) => ErrorSeverity::Critical,
            GainError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            GainError::Validation(reason) => format!("Please check your input: {}", reason),
            GainError::Storage(StorageError::ReadFailed { path, .. }) => {
                format!("Could not read your saved profile at {}", path.display())
            }
            GainError::Storage(StorageError::WriteFailed { path, .. }) => {
                format!("Could not save your profile to {}", path.display())
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Misconfiguration that stops the program
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
