//! Error types for the dummy bus

use thiserror::Error;

/// Result type for dummy bus setup
pub type Result<T> = std::result::Result<T, DummyError>;

/// Errors that can occur while setting up the dummy bus
#[derive(Debug, Error)]
pub enum DummyError {
    /// I/O error reading a profile
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parsing error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Profile describes an impossible bus
    #[error("Validation error: {0}")]
    Validation(String),
}
