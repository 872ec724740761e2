//! Adapter selection for i2cbridge
//!
//! This crate opens bus adapters by name and hands out a [`BusHandle`]
//! that exposes the smbus2-style API. The CLI only deals with adapter
//! selector strings such as `ch341:speed=400` and never names a
//! concrete adapter type.
//!
//! ```text
//!   CLI ──"ch341:index=1,pec=1"──▶ open_bus() ──▶ BusHandle
//!                                       │            │
//!                                       ▼            ▼
//!                            Ch341 / DummyBus   SmBus<Box<dyn I2cMaster>>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use i2cbridge_bus::open_bus;
//!
//! let mut bus = open_bus("ch341:speed=400")?;
//! let value = bus.read_byte_data(0x50, 0x00)?;
//! ```

mod handle;
mod registry;

pub use handle::BusHandle;
pub use registry::{
    adapter_names_short, available_adapters, list_attached_devices, open_bus,
    parse_adapter_params, AdapterInfo, AdapterParams, AttachedDevice,
};

// Re-export core types that the CLI needs
pub use i2cbridge_core::address::{SCAN_FIRST, SCAN_LAST};
pub use i2cbridge_core::master::Functionality;
pub use i2cbridge_core::smbus::{Block, I2C_SMBUS_BLOCK_MAX};
pub use i2cbridge_core::Error;
