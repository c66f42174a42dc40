//! Backend abstraction for content operations
//!
//! The handlers depend on this trait rather than on the HTTP client, so the
//! line server can be exercised against an in-memory backend.

use crate::operation::Operation;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use wprpc_core::{Credentials, Error};

/// Failure of a backend call
///
/// The display text is the caller-facing message without any prefix.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The call never produced a response (connect, DNS, timeout, body read)
    #[error("{0}")]
    Transport(String),

    /// The request could not be built from the given credentials
    #[error("{0}")]
    Request(String),
}

impl BackendError {
    /// HTTP status of the failed call, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        Error::Backend(err.to_string())
    }
}

/// A content backend able to run validated operations
///
/// Implementations receive fully resolved credentials and return the
/// backend's payload untouched.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn invoke(
        &self,
        operation: Operation,
        credentials: &Credentials,
    ) -> Result<Value, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_becomes_prefixed_message() {
        let err: Error = BackendError::Status {
            status: 404,
            message: "Invalid post ID.".into(),
        }
        .into();

        let data = err.to_error_data();
        assert_eq!(data.code, -32000);
        assert_eq!(data.message, "WordPress API error: Invalid post ID.");
    }

    #[test]
    fn test_status_accessor() {
        let status = BackendError::Status { status: 500, message: "x".into() };
        assert_eq!(status.status(), Some(500));
        assert_eq!(BackendError::Transport("refused".into()).status(), None);
    }
}
