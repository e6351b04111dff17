//! # Error Types
//!
//! Custom error types for Meso CWOP using `thiserror`.

use thiserror::Error;

/// Main error type for Meso CWOP
#[derive(Debug, Error)]
pub enum CwopError {
    /// Observation field missing, non-numeric or out of range
    #[error("Invalid observation record: {0}")]
    InvalidRecord(String),

    /// TCP connection to the CWOP server could not be established
    #[error("Connection error: {0}")]
    Connect(String),

    /// Send/receive failed mid-exchange
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connect or read exceeded the configured bound
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Data log could not be read or holds no data rows
    #[error("Data log error: {0}")]
    DataLog(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CwopError {
    /// Whether the error came from the network exchange with the server
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CwopError::Connect(_) | CwopError::Transport(_) | CwopError::Timeout(_)
        )
    }
}

/// Result type alias for Meso CWOP
pub type Result<T> = std::result::Result<T, CwopError>;
