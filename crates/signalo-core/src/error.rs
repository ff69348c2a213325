//! Error types for the Signalo client layer.
//!
//! One shared error enum covers the whole client: transport failures,
//! structured API rejections, session invalidation, client-side validation,
//! and storage problems. Variants carry plain strings so the error stays
//! cloneable and serializable across the service boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Signalo client.
///
/// Session invalidation is its own variant rather than a flavor of fetch
/// failure: only an explicit 401 on an authenticated call (or a failed boot
/// validation) produces `SessionInvalid`. Every other failed fetch stays a
/// `Network`/`Api` error and must not force a logout.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SignaloError {
    /// Transport-level failure: no connectivity, connect error, timeout.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Non-2xx response with a structured `{message}` body.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend rejected the session token (401 on an authenticated call).
    #[error("Session is no longer valid")]
    SessionInvalid,

    /// Client-side validation failure (draft shape, wire decode mismatch).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response body could not be decoded as JSON.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Credential store or image staging I/O failure.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The owning screen went away before the call settled.
    #[error("Request cancelled")]
    Cancelled,
}

impl SignaloError {
    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an Api error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a transport-level error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is a structured API rejection
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Check if this error must invalidate the session.
    ///
    /// Returns true for `SessionInvalid` only. Fetch failures of any other
    /// kind are reported to the user but never log the user out.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid)
    }

    /// Check if this is a client-side validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the owning scope cancelled the call
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the server-provided message for `Api` errors, if any.
    ///
    /// The notification boundary prefers this over a generic message when
    /// surfacing a failed mutation.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SignaloError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SignaloError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SignaloError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<reqwest::Error> for SignaloError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// A type alias for `Result<T, SignaloError>`.
pub type Result<T> = std::result::Result<T, SignaloError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_invalid_is_distinct_from_api_errors() {
        let err = SignaloError::api(500, "boom");
        assert!(!err.is_session_invalid());
        assert!(SignaloError::SessionInvalid.is_session_invalid());
    }

    #[test]
    fn test_server_message_only_for_api_errors() {
        let err = SignaloError::api(422, "message is required");
        assert_eq!(err.server_message(), Some("message is required"));
        assert_eq!(SignaloError::network("down").server_message(), None);
        assert_eq!(SignaloError::api(500, "").server_message(), None);
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SignaloError = io.into();
        assert!(matches!(err, SignaloError::Storage { .. }));
    }
}
