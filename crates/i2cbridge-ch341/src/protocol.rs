//! CH341 protocol constants and helpers
//!
//! This module contains the USB protocol constants, the I2C stream packet
//! encoders and the configuration structures for the CH341 I2C master.

// Several vendor requests are listed for reference only
#![allow(dead_code)]

// USB device identifiers
/// CH341 USB VID
pub const CH341_USB_VENDOR: u16 = 0x1A86;
/// CH341 USB PID in I2C/SPI/parallel mode
pub const CH341_USB_PRODUCT: u16 = 0x5512;

// USB endpoints
/// Bulk OUT endpoint for command packets
pub const WRITE_EP: u8 = 0x02;
/// Bulk IN endpoint for responses
pub const READ_EP: u8 = 0x82;

/// Largest packet the CH341 accepts on either bulk endpoint
pub const CH341_PACKET_LENGTH: usize = 32;

// USB timeouts in milliseconds
pub const USB_WRITE_TIMEOUT_MS: u64 = 1000;
pub const USB_READ_TIMEOUT_MS: u64 = 100;

// Control transfer request types (bmRequestType)
/// Device-to-host vendor request
pub const CTRL_READ: u8 = 0xC0;
/// Host-to-device vendor request
pub const CTRL_WRITE: u8 = 0x40;

// Vendor requests
pub const VENDOR_READ_REG: u8 = 0x95;
pub const VENDOR_WRITE_REG: u8 = 0x9A;
pub const VENDOR_SERIAL: u8 = 0xA1;
pub const VENDOR_PRINT: u8 = 0xA3;
pub const VENDOR_MODEM: u8 = 0xA4;
pub const VENDOR_MEM_WRITE: u8 = 0xA6;
pub const VENDOR_MEM_READ: u8 = 0xAC;
pub const VENDOR_SPI: u8 = 0xA8;
pub const VENDOR_SIO: u8 = 0xA9;
/// Bulk command byte that opens an I2C stream packet
pub const VENDOR_I2C: u8 = 0xAA;
pub const VENDOR_UIO: u8 = 0xAB;
pub const VENDOR_I2C_STATUS: u8 = 0x52;
pub const VENDOR_I2C_COMMAND: u8 = 0x53;
/// Control request returning the chip version
pub const VENDOR_VERSION: u8 = 0x5F;

// I2C stream sub-commands
/// Generate a START (or repeated START)
pub const I2C_STM_STA: u8 = 0x74;
/// Generate a STOP
pub const I2C_STM_STO: u8 = 0x75;
/// Clock out the following bytes, reporting the last ACK bit
pub const I2C_STM_OUT: u8 = 0x80;
/// Clock in the number of bytes in the low 6 bits
pub const I2C_STM_IN: u8 = 0xC0;
/// Largest count for a single IN sub-command
pub const I2C_STM_MAX: usize = 32;
/// Select the bus speed in the low 2 bits
pub const I2C_STM_SET: u8 = 0x60;
/// Delay in microseconds (low 4 bits)
pub const I2C_STM_US: u8 = 0x40;
/// Delay in milliseconds (low 4 bits)
pub const I2C_STM_MS: u8 = 0x50;
/// Mask for the delay sub-command argument
pub const I2C_STM_DLY: u8 = 0x0F;
/// Terminates a stream packet
pub const I2C_STM_END: u8 = 0x00;

/// Data bytes that fit in one OUT packet next to `0xAA`, `0x80` and `0x00`
pub const MAX_OUT_DATA: usize = CH341_PACKET_LENGTH - 3;

/// Set when the addressed receiver did not acknowledge the last byte
const ACK_NACK_BIT: u8 = 0x80;

/// I2C clock rates supported by the CH341
///
/// The chip only knows four rates; requests are rounded down to the next
/// supported one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum I2cSpeed {
    /// 20 kHz
    Low20k = 0,
    /// 100 kHz (default)
    #[default]
    Standard100k = 1,
    /// 400 kHz
    Fast400k = 2,
    /// 750 kHz
    High750k = 3,
}

impl I2cSpeed {
    /// Round a frequency in kHz down to a supported rate
    ///
    /// Anything below 100 kHz runs at 20 kHz.
    pub fn from_khz(khz: u32) -> Self {
        match khz {
            0..=99 => I2cSpeed::Low20k,
            100..=399 => I2cSpeed::Standard100k,
            400..=749 => I2cSpeed::Fast400k,
            _ => I2cSpeed::High750k,
        }
    }

    /// Get the clock rate in kHz
    pub fn to_khz(self) -> u32 {
        match self {
            I2cSpeed::Low20k => 20,
            I2cSpeed::Standard100k => 100,
            I2cSpeed::Fast400k => 400,
            I2cSpeed::High750k => 750,
        }
    }

    /// Get the value for the low bits of `I2C_STM_SET`
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for I2cSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}kHz", self.to_khz())
    }
}

/// CH341 configuration
#[derive(Debug, Clone, Default)]
pub struct Ch341Config {
    /// I2C clock rate applied on open
    pub speed: I2cSpeed,
    /// Which matching device to open (0-indexed)
    pub index: usize,
}

impl Ch341Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the I2C clock rate
    pub fn with_speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the I2C clock rate from a frequency in kHz
    pub fn with_speed_khz(mut self, khz: u32) -> Self {
        self.speed = I2cSpeed::from_khz(khz);
        self
    }

    /// Select the nth matching device
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

/// `[0xAA, 0x60|speed, 0x00]`
pub fn set_speed_packet(speed: I2cSpeed) -> [u8; 3] {
    [VENDOR_I2C, I2C_STM_SET | speed.bits(), I2C_STM_END]
}

/// `[0xAA, 0x74, 0x00]`
pub fn start_packet() -> [u8; 3] {
    [VENDOR_I2C, I2C_STM_STA, I2C_STM_END]
}

/// `[0xAA, 0x75, 0x00]`
pub fn stop_packet() -> [u8; 3] {
    [VENDOR_I2C, I2C_STM_STO, I2C_STM_END]
}

/// Build an OUT packet carrying `data`
///
/// `data` must not exceed [`MAX_OUT_DATA`]; callers chunk longer writes.
pub fn out_packet(data: &[u8]) -> Vec<u8> {
    debug_assert!(data.len() <= MAX_OUT_DATA);
    let mut packet = Vec::with_capacity(data.len() + 3);
    packet.push(VENDOR_I2C);
    packet.push(I2C_STM_OUT);
    packet.extend_from_slice(data);
    packet.push(I2C_STM_END);
    packet
}

/// Build an IN packet requesting `len` bytes (1..=32)
pub fn read_packet(len: usize) -> [u8; 3] {
    debug_assert!((1..=I2C_STM_MAX).contains(&len));
    [VENDOR_I2C, I2C_STM_IN | len as u8, I2C_STM_END]
}

/// Check the status returned after an OUT packet
///
/// The device answers with a single byte whose top bit is the ACK bit of
/// the last byte clocked out; anything else counts as not acknowledged.
pub fn is_ack(response: &[u8]) -> bool {
    matches!(response, [status] if status & ACK_NACK_BIT == 0)
}
