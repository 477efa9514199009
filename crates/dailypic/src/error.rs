//! Error types for dailypic
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dailypic
#[derive(Error, Debug)]
pub enum PicError {
    #[error("{}", friendly_network_error(.0))]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Invalid response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No image URL for date: {date}")]
    NoImage { date: String },

    #[error("Response is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("Identifier {0:?} cannot be used as a file name")]
    InvalidIdentifier(String),

    #[error("Failed to download {url} after {attempts} attempt(s)")]
    DownloadFailed { url: String, attempts: u32 },

    #[error("Invalid path specified: {0:?}. Provide a file or directory.")]
    InvalidPath(PathBuf),

    #[error("File not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dailypic
pub type Result<T> = std::result::Result<T, PicError>;

impl From<config::ConfigError> for PicError {
    fn from(e: config::ConfigError) -> Self {
        PicError::Config(e.to_string())
    }
}

/// Failure categories reported by the compression service
///
/// Every category ends the compression of the current file; they only differ
/// in the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressError {
    /// Bad credentials or monthly limit reached
    #[error("Verify your API key and account limit. ({0})")]
    Account(String),

    /// The request or the uploaded image was rejected
    #[error("Check your source image and request options. ({0})")]
    Client(String),

    /// Transient failure on the service side
    #[error("Temporary issue with the Tinify API. ({0})")]
    Server(String),

    /// The service could not be reached
    #[error("A network connection error occurred. ({0})")]
    Connection(String),

    #[error("An error occurred: {0}")]
    Unknown(String),
}

impl CompressError {
    /// Classify an HTTP error status returned by the service
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 429 => CompressError::Account(message),
            400..=499 => CompressError::Client(message),
            500..=599 => CompressError::Server(message),
            _ => CompressError::Unknown(format!("unexpected status {status}: {message}")),
        }
    }

    /// Classify a transport-level failure
    pub fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            CompressError::Connection(friendly_network_error(e))
        } else {
            CompressError::Unknown(friendly_network_error(e))
        }
    }
}

/// One-line description of a transport failure, naming the host involved
fn friendly_network_error(e: &reqwest::Error) -> String {
    let host = e.url().and_then(|u| u.host_str()).unwrap_or("server");
    if e.is_builder() {
        match e.url() {
            Some(url) => format!("Invalid URL: {url}"),
            None => "Invalid URL".to_string(),
        }
    } else if e.is_connect() {
        format!("Could not connect to {host}")
    } else if e.is_timeout() {
        format!("Timed out waiting for {host}")
    } else if e.is_decode() || e.is_body() {
        format!("Invalid response from {host}")
    } else if let Some(status) = e.status() {
        format!("HTTP {status} from {host}")
    } else {
        format!("Request to {host} failed: {e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(CompressError::from_status(401, "x"), CompressError::Account(_)));
        assert!(matches!(CompressError::from_status(429, "x"), CompressError::Account(_)));
        assert!(matches!(CompressError::from_status(400, "x"), CompressError::Client(_)));
        assert!(matches!(CompressError::from_status(415, "x"), CompressError::Client(_)));
        assert!(matches!(CompressError::from_status(500, "x"), CompressError::Server(_)));
        assert!(matches!(CompressError::from_status(503, "x"), CompressError::Server(_)));
        assert!(matches!(CompressError::from_status(302, "x"), CompressError::Unknown(_)));
    }

    #[test]
    fn test_compress_messages_are_distinct() {
        let messages = [
            CompressError::Account("a".into()).to_string(),
            CompressError::Client("a".into()).to_string(),
            CompressError::Server("a".into()).to_string(),
            CompressError::Connection("a".into()).to_string(),
            CompressError::Unknown("a".into()).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[0].starts_with("Verify your API key"));
    }

    #[test]
    fn test_compress_error_converts_transparently() {
        let err: PicError = CompressError::Server("busy".into()).into();
        assert_eq!(err.to_string(), "Temporary issue with the Tinify API. (busy)");
    }

    #[test]
    fn test_invalid_identifier_mentions_value() {
        let err = PicError::InvalidIdentifier("../x".into());
        assert!(err.to_string().contains("\"../x\""));
    }

    #[test]
    fn test_not_found_mentions_path() {
        let err = PicError::NotFound(PathBuf::from("missing.png"));
        assert!(err.to_string().contains("missing.png"));
    }
}
