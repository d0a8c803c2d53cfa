//! Failure classification for dispatched requests.

use thiserror::Error;

/// Coarse failure taxonomy callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The credential was missing, expired, or rejected. The session has been torn down.
    Unauthorized,
    /// The backend answered with some other non-success status.
    RemoteRejected,
    /// No response was obtained (connect failure, timeout, broken body).
    TransportFailure,
    /// The backend answered successfully but the payload did not have the expected shape.
    InvalidPayload,
    /// The request could not be built (bad URL, blank identifier, unserializable body).
    InvalidRequest,
}

/// What went wrong below the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Connect,
    Body,
    Other,
}

impl TransportFailure {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Body => "body",
            Self::Other => "other",
        }
    }

    fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect
        } else if error.is_body() || error.is_decode() {
            Self::Body
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unauthorized: {path} rejected the session credential")]
    Unauthorized { path: String, body: String },

    #[error("API error {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("transport failure ({kind}): {message}")]
    Transport {
        kind: TransportFailure,
        message: String,
    },

    #[error("invalid payload from {path}: {message}")]
    InvalidPayload { path: String, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl DispatchError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            Self::Transport { .. } => ErrorKind::TransportFailure,
            Self::InvalidPayload { .. } => ErrorKind::InvalidPayload,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// HTTP status of the response, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub(crate) fn transport(error: &reqwest::Error) -> Self {
        Self::Transport {
            kind: TransportFailure::classify(error),
            message: error.to_string(),
        }
    }
}
