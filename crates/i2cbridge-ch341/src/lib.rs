//! i2cbridge-ch341 - CH341 USB-to-I2C bridge support
//!
//! This crate drives the I2C master of the WCH CH341 (VID:1a86 PID:5512).
//!
//! # Protocol Overview
//!
//! The CH341 has no register-level I2C interface. Instead the host sends
//! `I2C_STREAM` packets over bulk endpoint 0x02: a packet starts with
//! `0xAA`, carries sub-commands (START, STOP, OUT with data, IN with a
//! byte count, speed selection) and ends with `0x00`. Responses (the ACK
//! status after OUT, received bytes after IN) arrive on bulk endpoint 0x82.
//!
//! # Example
//!
//! ```no_run
//! use i2cbridge_ch341::Ch341;
//! use i2cbridge_core::smbus::SmBus;
//!
//! let mut bus = SmBus::new(Ch341::open()?);
//! let value = bus.read_byte_data(0x50, 0x00)?;
//! println!("EEPROM[0] = 0x{:02X}", value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;
mod protocol;
mod stream;

pub use device::{parse_options, Ch341, Ch341DeviceInfo};
pub use error::{Ch341Error, Result};
pub use protocol::{Ch341Config, I2cSpeed};
