//! Unified error system for the trust ledger
//!
//! Crates above core keep their own typed errors (`CapabilityError`,
//! `SignatureError`, `ConfigError`) and convert into [`LedgerError`] at
//! the boundary where callers no longer need to match on the details.

use crate::canonical::EncodingError;
use serde::{Deserialize, Serialize};

/// Unified error type for trust ledger operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    /// Invalid input or identifier
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Payload could not be canonicalized
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// A role, identity and action triple was not authorized
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message naming the rejected triple
        message: String,
    },

    /// A signing attempt was rejected
    #[error("Signature error: {message}")]
    Signature {
        /// Error message describing the rejected signing attempt
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl LedgerError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a signature error
    pub fn signature(message: impl Into<String>) -> Self {
        Self::Signature {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Standard Result type for trust ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(EncodingError::Json(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LedgerError::invalid("empty agent id");
        assert!(matches!(err, LedgerError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: empty agent id");
    }

    #[test]
    fn test_encoding_error_conversion() {
        let err = LedgerError::from(EncodingError::NotAnObject);
        assert!(matches!(err, LedgerError::Encoding(EncodingError::NotAnObject)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LedgerError::from(json_err);
        assert!(matches!(err, LedgerError::Encoding(EncodingError::Json(_))));
    }
}
