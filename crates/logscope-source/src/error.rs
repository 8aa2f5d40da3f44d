use std::path::PathBuf;

use thiserror::Error;

/// HTTP-style status a source uses to report an invalid session
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Failure while listing streams
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The session is no longer valid; never retried locally
    #[error("not authenticated (status {status}): {message}")]
    Unauthenticated { status: u16, message: String },

    #[error("stream list request failed (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("stream list unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Classify a failed response by its status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == STATUS_UNAUTHORIZED {
            Self::Unauthenticated { status, message }
        } else {
            Self::Status { status, message }
        }
    }

    /// Whether this failure means the session must be re-established
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Unavailable(_) => None,
        }
    }
}

/// Failure while querying a stream's records
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("query for stream '{stream}' failed: {message}")]
pub struct QueryError {
    pub stream: String,
    pub message: String,
}

impl QueryError {
    pub fn new(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            message: message.into(),
        }
    }
}

/// Failure while loading a fixture document
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read fixture {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture document: {0}")]
    Parse(#[from] serde_json::Error),
}
