//! Transport error types

use thiserror::Error;

/// Errors that can occur while talking to the Chroma SDK
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Not connected to the Chroma SDK")]
    NotConnected,

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),

    /// The SDK answered, but with a non-zero result code
    #[error("Chroma SDK returned result code {code}")]
    Sdk { code: i64 },

    #[error("Invalid response: {0}")]
    Decode(String),

    /// Local output (terminal preview) failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Timeouts and refused connections are expected on the frame path.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connection(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Decode(e.to_string())
    }
}
