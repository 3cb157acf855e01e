//! Error types for the signal auth store
//!
//! This module provides a unified error handling system using `thiserror` for
//! all components of the crate. Store failures are carried through unmodified,
//! so a caller can always tell a rejected store operation apart from a record
//! that could not be decoded.

use thiserror::Error;

/// The main error type for the signal auth store
#[derive(Error, Debug)]
pub enum Error {
    /// Serialization/deserialization errors
    #[error("Serializer error: {0}")]
    Serializer(#[from] SerializerError),

    /// Storage operation errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid input data
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },
}

/// Serializer-specific error types
#[derive(Error, Debug)]
pub enum SerializerError {
    /// Serialization failed
    #[error("Serialization failed: {reason}")]
    SerializationFailed {
        /// Underlying cause
        reason: String,
    },

    /// Deserialization failed
    #[error("Deserialization failed: {reason}")]
    DeserializationFailed {
        /// Underlying cause
        reason: String,
    },

    /// Invalid data format
    #[error("Invalid data format: {expected}, got: {actual}")]
    InvalidFormat {
        /// Shape the decoder expected
        expected: String,
        /// Shape the decoder found
        actual: String,
    },
}

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage operation failed
    #[error("Storage operation failed: {operation}: {reason}")]
    OperationFailed {
        /// Name of the failed operation
        operation: String,
        /// Underlying cause
        reason: String,
    },

    /// A lock guarding shared store state was poisoned
    #[error("Lock poisoned: {reason}")]
    Lock {
        /// Underlying cause
        reason: String,
    },

    /// Connection error
    #[error("Connection error: {reason}")]
    ConnectionError {
        /// Underlying cause
        reason: String,
    },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SerializerError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            SerializerError::DeserializationFailed {
                reason: err.to_string(),
            }
        } else {
            SerializerError::SerializationFailed {
                reason: err.to_string(),
            }
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience type alias for Serializer Results
pub type SerializerResult<T> = std::result::Result<T, SerializerError>;

/// Convenience type alias for Storage Results
pub type StorageResult<T> = std::result::Result<T, StorageError>;
