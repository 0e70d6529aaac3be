//! Error types for tombola-client.

use thiserror::Error;

/// Main error type for all client operations.
#[derive(Debug, Error)]
pub enum TombolaError {
    /// I/O error during socket operations (dial, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the stream before the expected byte count was read.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Protocol error (unexpected tag, invalid length, malformed payload).
    ///
    /// The stream is desynchronized; the connection must be closed,
    /// never reused.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The authority rejected a batch, or the echoed bet number did not
    /// match the one sent.
    #[error("Confirmation error: {0}")]
    Confirmation(String),

    /// Agency identifier is not representable as a 32-bit integer.
    #[error("Invalid agency identifier: {0}")]
    Identifier(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error while loading the configuration file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using TombolaError.
pub type Result<T> = std::result::Result<T, TombolaError>;
