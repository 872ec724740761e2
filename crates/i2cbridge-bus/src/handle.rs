//! BusHandle - an opened adapter with the SMBus API on top

use std::ops::{Deref, DerefMut};

use i2cbridge_core::master::BoxedI2cMaster;
use i2cbridge_core::smbus::SmBus;

/// An opened bus adapter
///
/// The handle owns the adapter (type-erased) and dereferences to
/// [`SmBus`], so every smbus2-style operation is available directly:
///
/// ```ignore
/// let mut bus = open_bus("dummy")?;
/// bus.write_byte_data(0x68, 0x00, 0x12)?;
/// ```
pub struct BusHandle {
    bus: SmBus<BoxedI2cMaster>,
    adapter: String,
}

impl BusHandle {
    pub(crate) fn new(master: BoxedI2cMaster, adapter: &str) -> Self {
        Self {
            bus: SmBus::new(master),
            adapter: adapter.to_string(),
        }
    }

    /// Canonical name of the adapter behind this handle
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// Release the SMBus wrapper
    pub fn into_smbus(self) -> SmBus<BoxedI2cMaster> {
        self.bus
    }
}

impl Deref for BusHandle {
    type Target = SmBus<BoxedI2cMaster>;

    fn deref(&self) -> &Self::Target {
        &self.bus
    }
}

impl DerefMut for BusHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bus
    }
}

impl std::fmt::Debug for BusHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusHandle")
            .field("adapter", &self.adapter)
            .field("pec", &self.bus.pec())
            .field("repeated_start", &self.bus.repeated_start())
            .finish()
    }
}
