use crate::ntp::Mode;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Why a reply was rejected before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("reply too short ({received} bytes, expected 48)")]
    TooShort { received: usize },
    #[error("unexpected mode {0}, expected server")]
    UnexpectedMode(Mode),
}

/// Failure reported by an [`NtpTransport`](crate::traits::NtpTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("name resolution failed: {0}")]
    Resolution(#[source] io::Error),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Coarse classification of a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResolutionFailure,
    TransportFailure,
    InvalidResponse,
}

/// A query either yields a validated reply or fails as a whole with one of these.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot resolve NTP server {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("no reply from {host} within {timeout:?}")]
    Timeout { host: String, timeout: Duration },
    #[error("transport failure talking to {host}: {source}")]
    Transport {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid response from {host}: {reason}")]
    InvalidResponse { host: String, reason: InvalidReason },
}

impl QueryError {
    pub fn from_transport(host: &str, err: TransportError) -> Self {
        let host = host.to_string();
        match err {
            TransportError::Resolution(source) => QueryError::Resolution { host, source },
            TransportError::Timeout(timeout) => QueryError::Timeout { host, timeout },
            TransportError::Io(source) => QueryError::Transport { host, source },
        }
    }

    /// A timeout is a transport failure; it keeps its own variant so callers
    /// can tell "no answer" from a socket error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Resolution { .. } => ErrorKind::ResolutionFailure,
            QueryError::Timeout { .. } | QueryError::Transport { .. } => ErrorKind::TransportFailure,
            QueryError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryError::Timeout { .. })
    }

    pub fn host(&self) -> &str {
        match self {
            QueryError::Resolution { host, .. }
            | QueryError::Timeout { host, .. }
            | QueryError::Transport { host, .. }
            | QueryError::InvalidResponse { host, .. } => host,
        }
    }
}
