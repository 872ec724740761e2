//! i2cbridge-core - Core library for I2C/SMBus access over bus adapters
//!
//! This crate provides the adapter-independent part of i2cbridge: the
//! [`I2cMaster`](master::I2cMaster) trait that every bus adapter implements,
//! transaction helpers that turn START/address/data/STOP primitives into
//! complete I2C transfers, and an smbus2-style [`SmBus`](smbus::SmBus) API
//! on top of them. It is designed to be `no_std` compatible.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable boxed adapters (`Box<dyn I2cMaster + Send>`)
//!
//! # Example
//!
//! ```ignore
//! use i2cbridge_core::master::I2cMaster;
//! use i2cbridge_core::smbus::SmBus;
//!
//! fn read_temperature<M: I2cMaster>(bus: &mut SmBus<M>) -> i2cbridge_core::Result<u16> {
//!     // LM75: temperature register 0, big-endian on the wire
//!     let raw = bus.read_word_data(0x48, 0x00)?;
//!     Ok(raw.swap_bytes())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod address;
pub mod error;
pub mod master;
pub mod smbus;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use address::{Address, Direction};
pub use error::{Error, Result};
