//! SMBus protocol layer
//!
//! [`SmBus`] provides the transaction set of the smbus2 Python library
//! (quick command, byte, word, block and I2C block transfers, process
//! calls, optional PEC) on top of any [`I2cMaster`](crate::master::I2cMaster).
//! The combined-message `i2c_rdwr` call is not provided.

mod bus;
mod pec;

pub use bus::{Block, SmBus, I2C_SMBUS_BLOCK_MAX};
pub use pec::{crc8, Pec};
