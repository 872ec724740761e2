//! Error types for i2cbridge-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate and by every bus adapter.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// A byte clocked out by a primitive write was not acknowledged
    ///
    /// Adapters return this from `write_bytes`; the transaction layer turns
    /// it into [`Error::AddressNack`] or [`Error::DataNack`].
    Nack,
    /// No device acknowledged its address
    AddressNack(u8),
    /// The device at this address did not acknowledge a data byte
    DataNack(u8),
    /// Primitive issued out of order (e.g. data without a START)
    BusNotReady,

    // Argument errors
    /// Address does not fit in 7 bits
    InvalidAddress(u8),
    /// Block payload exceeds the 32-byte SMBus block limit
    BlockTooLong(usize),
    /// Requested bus speed cannot be configured
    InvalidSpeed(u32),

    // Protocol errors
    /// Device returned a block count of zero or more than 32 bytes
    InvalidBlockLength(u8),
    /// Packet Error Code did not match the computed CRC-8
    PecMismatch {
        /// PEC computed over the message
        expected: u8,
        /// PEC received from the device
        found: u8,
    },
    /// Adapter returned fewer bytes than requested
    ShortRead {
        /// Number of bytes requested
        expected: usize,
        /// Number of bytes received
        actual: usize,
    },

    // Adapter errors
    /// Underlying transfer (USB or otherwise) failed
    TransferFailed,
    /// Operation timed out
    Timeout,
    /// Operation is not supported by the adapter
    NotSupported,
}

impl Error {
    /// Returns true if this error means a byte was not acknowledged
    pub fn is_nack(&self) -> bool {
        matches!(self, Self::Nack | Self::AddressNack(_) | Self::DataNack(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "byte not acknowledged"),
            Self::AddressNack(addr) => write!(f, "no ACK from address 0x{:02X}", addr),
            Self::DataNack(addr) => {
                write!(f, "device 0x{:02X} did not acknowledge data", addr)
            }
            Self::BusNotReady => write!(f, "bus not ready (no transaction in progress)"),
            Self::InvalidAddress(addr) => {
                write!(f, "invalid 7-bit address 0x{:02X}", addr)
            }
            Self::BlockTooLong(len) => {
                write!(f, "block length {} exceeds 32 bytes", len)
            }
            Self::InvalidSpeed(khz) => write!(f, "unsupported bus speed {} kHz", khz),
            Self::InvalidBlockLength(len) => {
                write!(f, "invalid block length {} reported by device", len)
            }
            Self::PecMismatch { expected, found } => write!(
                f,
                "PEC mismatch: expected 0x{:02X}, found 0x{:02X}",
                expected, found
            ),
            Self::ShortRead { expected, actual } => {
                write!(f, "short read: expected {} bytes, got {}", expected, actual)
            }
            Self::TransferFailed => write!(f, "transfer failed"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::NotSupported => write!(f, "operation not supported by adapter"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
