//! Error types for the CH341 bridge

use i2cbridge_core::Error as CoreError;
use nusb::transfer::TransferError;
use thiserror::Error;

/// Result type for CH341 operations
pub type Result<T> = std::result::Result<T, Ch341Error>;

/// Errors that can occur when using the CH341 bridge
#[derive(Debug, Error)]
pub enum Ch341Error {
    /// Device not found
    #[error("CH341 device not found (VID:1a86 PID:5512)")]
    DeviceNotFound,

    /// Failed to open device
    #[error("Failed to open CH341: {0}")]
    OpenFailed(String),

    /// Failed to claim interface
    #[error("Failed to claim interface: {0}")]
    ClaimFailed(String),

    /// USB transfer failed
    #[error("USB transfer failed: {0}")]
    TransferFailed(String),

    /// Bulk write moved fewer bytes than the packet holds
    #[error("Failed to issue {command} command: wrote {written} of {expected} bytes")]
    ShortWrite {
        /// Name of the stream command being sent
        command: &'static str,
        /// Bytes actually transferred
        written: usize,
        /// Packet length
        expected: usize,
    },

    /// Invalid response from device
    #[error("Invalid response from CH341: {0}")]
    InvalidResponse(String),

    /// Timeout during operation
    #[error("Timeout during USB transfer")]
    Timeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<nusb::Error> for Ch341Error {
    fn from(e: nusb::Error) -> Self {
        Ch341Error::TransferFailed(e.to_string())
    }
}

impl From<TransferError> for Ch341Error {
    fn from(e: TransferError) -> Self {
        match e {
            // transfer_blocking cancels a transfer that runs out of time
            TransferError::Cancelled => Ch341Error::Timeout,
            other => Ch341Error::TransferFailed(other.to_string()),
        }
    }
}

impl From<Ch341Error> for CoreError {
    fn from(e: Ch341Error) -> Self {
        match e {
            Ch341Error::Core(inner) => inner,
            Ch341Error::Timeout => CoreError::Timeout,
            other => {
                log::error!("{}", other);
                CoreError::TransferFailed
            }
        }
    }
}
