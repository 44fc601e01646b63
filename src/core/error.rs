//! Viewer error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the session viewer
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Storage root does not exist
    #[error("Storage directory does not exist: {}", .0.display())]
    StorageNotFound(PathBuf),

    /// Storage root exists but is not a directory
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Export format name is not recognized
    #[error("Unsupported format: {0}. Must be one of: markdown, json, text")]
    UnsupportedFormat(String),

    /// AI analysis was requested but no model is configured
    #[error("AI analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ViewerError {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        ViewerError::Other(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        ViewerError::InvalidConfig(msg.into())
    }

    /// Whether the caller supplied a bad argument (as opposed to a server fault)
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ViewerError::UnsupportedFormat(_))
    }
}

/// Result type alias for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;
