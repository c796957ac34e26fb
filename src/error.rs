//! Error types for the Recapitan reflection pipeline
//!
//! Every failure surfaced by the core carries a taxonomy kind, a retryable
//! flag and, where one exists, the underlying cause (`source()`). The retry
//! policy inspects these structurally; presentation is left to the host.

use std::fmt;
use thiserror::Error;

/// Main error type for Recapitan operations
#[derive(Error, Debug)]
pub enum RecapitanError {
    /// Network or connection failure before a response was received
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("HTTP {code}: {body}")]
    HttpStatus { code: u16, body: String },

    /// Body did not parse or did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// Well-formed response without usable content
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Missing or invalid required configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Aggregation window produced nothing to analyze
    #[error("No journal entries found for the past {window_days} days")]
    NoEntries { window_days: i64 },

    /// A single note had no public content left to analyze
    #[error("Nothing to analyze in {path} after redaction")]
    EmptyNote { path: String },

    /// Settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// I/O error from a note storage collaborator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Recapitan operations
pub type Result<T> = std::result::Result<T, RecapitanError>;

/// Taxonomy tag of a [`RecapitanError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    HttpStatus,
    MalformedResponse,
    EmptyResult,
    Configuration,
    NoEntries,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "TransportError",
            ErrorKind::HttpStatus => "HTTPStatusError",
            ErrorKind::MalformedResponse => "MalformedResponseError",
            ErrorKind::EmptyResult => "EmptyResultError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::NoEntries => "NoEntriesError",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}

/// Whether an HTTP status belongs to a transient class worth retrying.
///
/// Request timeout, too-early, rate limiting and all server errors are
/// transient; every other client error is a property of the request itself.
pub fn is_transient_status(code: u16) -> bool {
    matches!(code, 408 | 425 | 429) || (500..600).contains(&code)
}

impl RecapitanError {
    /// Taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecapitanError::Transport(_) => ErrorKind::Transport,
            RecapitanError::HttpStatus { .. } => ErrorKind::HttpStatus,
            RecapitanError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            RecapitanError::EmptyResult(_) => ErrorKind::EmptyResult,
            RecapitanError::Configuration(_) | RecapitanError::Settings(_) => {
                ErrorKind::Configuration
            }
            RecapitanError::NoEntries { .. } | RecapitanError::EmptyNote { .. } => {
                ErrorKind::NoEntries
            }
            RecapitanError::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether the retry policy may re-attempt the failed operation
    pub fn is_retryable(&self) -> bool {
        match self {
            RecapitanError::Transport(_) => true,
            RecapitanError::HttpStatus { code, .. } => is_transient_status(*code),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = RecapitanError::NoEntries { window_days: 7 };
        assert_eq!(
            err.to_string(),
            "No journal entries found for the past 7 days"
        );

        let err = RecapitanError::HttpStatus {
            code: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: bad key");
    }

    #[test]
    fn test_http_status_classification() {
        for code in [408, 425, 429, 500, 502, 503, 504, 599] {
            let err = RecapitanError::HttpStatus {
                code,
                body: String::new(),
            };
            assert!(err.is_retryable(), "{} should be retryable", code);
        }

        for code in [400, 401, 403, 404, 409, 422] {
            let err = RecapitanError::HttpStatus {
                code,
                body: String::new(),
            };
            assert!(!err.is_retryable(), "{} should not be retryable", code);
        }
    }

    #[test]
    fn test_terminal_kinds_not_retryable() {
        let errors = [
            RecapitanError::EmptyResult("no choices".to_string()),
            RecapitanError::Configuration("missing key".to_string()),
            RecapitanError::NoEntries { window_days: 7 },
            RecapitanError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
        ];

        for err in errors {
            assert!(!err.is_retryable(), "{:?}", err.kind());
        }
    }

    #[test]
    fn test_malformed_response_keeps_cause() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = RecapitanError::MalformedResponse(parse_err);

        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(!err.is_retryable());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::HttpStatus.to_string(), "HTTPStatusError");
        assert_eq!(ErrorKind::NoEntries.to_string(), "NoEntriesError");
    }
}
