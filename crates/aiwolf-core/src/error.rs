//! Error types for the AIWolf bridge

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, WolfError>;

/// Bridge error types
#[derive(Debug, Error)]
pub enum WolfError {
    /// Peer stopped sending in the middle of a frame
    #[error("Socket connection broken after {empty_reads} empty reads ({buffered} bytes buffered)")]
    ConnectionBroken { empty_reads: u32, buffered: usize },

    /// No data within the socket timeout
    #[error("Socket read timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Socket I/O failure
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed JSON on the wire
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Well-formed JSON with the wrong shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Raised by an agent callback
    #[error("Agent error: {0}")]
    Agent(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for WolfError {
    fn from(err: serde_json::Error) -> Self {
        WolfError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for WolfError {
    fn from(err: std::io::Error) -> Self {
        WolfError::Io(err.to_string())
    }
}

impl WolfError {
    /// Whether the error came from the socket rather than message content
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WolfError::ConnectionBroken { .. } | WolfError::Timeout(_) | WolfError::Io(_)
        )
    }
}
