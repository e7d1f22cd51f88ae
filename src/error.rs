//! Shared Error Types
//!
//! Error types used across the conversation store. These cover the failure
//! cases that can surface from any component: data validation, JSON
//! serialization, and the shared storage medium.
//!
//! No failure in this subsystem is fatal to the host application; callers
//! degrade to "conversation data temporarily unavailable or stale" rather
//! than halting.
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur in the conversation store
#[derive(Debug, Error)]
pub enum ChatError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Shared storage medium error
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl ChatError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
