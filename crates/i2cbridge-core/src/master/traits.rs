//! Bus master trait definitions

use crate::error::Result;

use super::Functionality;

/// I2C bus master trait
///
/// This trait represents an adapter that can drive the individual
/// conditions of an I2C bus. It is deliberately primitive-level: a START,
/// a run of bytes clocked out (checking for ACK), a run of bytes clocked
/// in, and a STOP. Whole transactions are assembled by the
/// [`transaction`](crate::transaction) helpers, and the SMBus protocol on
/// top of those by [`SmBus`](crate::smbus::SmBus).
///
/// Bridge chips that speak a command stream (such as the CH341) map each
/// method onto one or more stream packets. The first byte written after
/// `start()` is always the address byte.
///
/// ## Example: command-stream adapter
///
/// ```ignore
/// impl I2cMaster for MyBridge {
///     fn set_speed_khz(&mut self, khz: u32) -> Result<u32> {
///         self.send(&[CMD_SET_SPEED, speed_code(khz)])?;
///         Ok(actual_khz(khz))
///     }
///
///     fn start(&mut self) -> Result<()> {
///         self.send(&[CMD_START])
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.send(&[CMD_STOP])
///     }
///
///     fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
///         self.send_out(data)?;
///         if self.ack_status()? { Ok(()) } else { Err(Error::Nack) }
///     }
///
///     fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
///         self.send_in(buf.len())?;
///         self.receive(buf)
///     }
/// }
/// ```
pub trait I2cMaster {
    /// Get the functionality supported by this adapter
    fn functionality(&self) -> Functionality {
        Functionality::default()
    }

    /// Set the bus clock
    ///
    /// Adapters with a fixed set of clock rates pick the closest rate that
    /// does not exceed the request. Returns the rate actually configured,
    /// in kHz.
    fn set_speed_khz(&mut self, khz: u32) -> Result<u32>;

    /// Issue a START condition
    ///
    /// A START while a transaction is already open is a repeated START.
    fn start(&mut self) -> Result<()>;

    /// Issue a STOP condition
    fn stop(&mut self) -> Result<()>;

    /// Clock bytes out onto the bus
    ///
    /// Returns [`Error::Nack`](crate::Error::Nack) if the receiver did not
    /// acknowledge. Adapters split long writes into whatever packet size
    /// their transport needs.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Clock `buf.len()` bytes in from the bus
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()>;
}

impl<M: I2cMaster + ?Sized> I2cMaster for &mut M {
    fn functionality(&self) -> Functionality {
        (**self).functionality()
    }

    fn set_speed_khz(&mut self, khz: u32) -> Result<u32> {
        (**self).set_speed_khz(khz)
    }

    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_bytes(buf)
    }
}

// Blanket impl for boxed masters so adapters can be chosen at runtime
#[cfg(feature = "alloc")]
impl I2cMaster for alloc::boxed::Box<dyn I2cMaster + Send> {
    fn functionality(&self) -> Functionality {
        (**self).functionality()
    }

    fn set_speed_khz(&mut self, khz: u32) -> Result<u32> {
        (**self).set_speed_khz(khz)
    }

    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_bytes(buf)
    }
}

/// Type alias for a boxed, runtime-selected bus master
#[cfg(feature = "alloc")]
pub type BoxedI2cMaster = alloc::boxed::Box<dyn I2cMaster + Send>;
