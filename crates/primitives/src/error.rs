use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong, independent of the message the backend attached.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No connectivity, or the request was aborted before a response arrived.
    Network,
    Timeout,
    /// The backend rejected the payload (400, 409, 422).
    Validation,
    /// 401. The transport evicts the stored token before returning this.
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    /// Anything else, including malformed response bodies.
    Unknown,
}

impl ErrorKind {
    /// Classifies a non-success HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 409 | 422 => Self::Validation,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::Timeout,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    const fn fallback_message(self) -> &'static str {
        match self {
            Self::Network => "Unable to reach the server",
            Self::Timeout => "The request timed out",
            Self::Validation => "The request was rejected as invalid",
            Self::Unauthorized => "Your session has expired, please sign in again",
            Self::Forbidden => "You do not have permission to do that",
            Self::NotFound => "The requested item no longer exists",
            Self::ServerError => "The server failed to handle the request",
            Self::Unknown => "Something went wrong",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Failure of a remote call or of anything built on one.
///
/// The message is always human readable and never empty.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    /// Builds an error, falling back to a generic message for the kind when
    /// `message` is blank.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.fallback_message().to_owned()
        } else {
            message
        };

        Self { kind, message }
    }

    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.fallback_message())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ErrorKind::from_status(422), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::ServerError);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::Unknown);
    }

    #[test]
    fn test_blank_message_falls_back() {
        let err = ApiError::new(ErrorKind::NotFound, "  ");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.message().is_empty(), "message must never be empty");
        assert_eq!(err.to_string(), err.message());
    }
}
