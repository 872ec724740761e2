//! i2cbridge-dummy - In-memory I2C bus emulator for testing
//!
//! This crate provides a dummy bus adapter that emulates a set of
//! register-pointer devices in memory. It's useful for testing and
//! development without a CH341 attached.

mod config;
mod device;
mod error;

pub use config::{DeviceConfig, DummyConfig};
pub use device::RegisterDevice;
pub use error::{DummyError, Result};

use i2cbridge_core::address::{Address, Direction};
use i2cbridge_core::master::I2cMaster;
use i2cbridge_core::Error;

/// One primitive as seen on the emulated bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// START or repeated START
    Start,
    /// STOP
    Stop,
    /// Bytes clocked out, including the address byte
    Write(Vec<u8>),
    /// Bytes clocked in
    Read(Vec<u8>),
    /// The last byte written was not acknowledged
    Nack,
}

/// Where the emulated bus is within a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusState {
    /// No START seen
    Idle,
    /// START seen, the next byte is an address
    Addressing,
    /// Device at index acknowledged a write address
    Writing { device: usize, pointer_set: bool },
    /// Device at index acknowledged a read address
    Reading { device: usize },
    /// Address was not acknowledged; only START or STOP are valid
    Nacked,
}

/// Dummy bus adapter
///
/// Emulates an I2C bus with [`RegisterDevice`]s attached. Addresses with
/// no device NACK. Every primitive is recorded in a transcript.
pub struct DummyBus {
    devices: Vec<RegisterDevice>,
    state: BusState,
    speed_khz: u32,
    events: Vec<BusEvent>,
}

impl DummyBus {
    /// Create a bus with the given devices attached
    pub fn new(devices: Vec<RegisterDevice>) -> Self {
        Self {
            devices,
            state: BusState::Idle,
            speed_khz: 100,
            events: Vec::new(),
        }
    }

    /// Create a bus from a profile
    pub fn from_config(config: &DummyConfig) -> Result<Self> {
        Ok(Self::new(config.build_devices()?))
    }

    /// Create a bus with the default profile (EEPROM at 0x50, 8 registers at 0x68)
    pub fn new_default() -> Self {
        let devices = DummyConfig::default()
            .devices
            .iter()
            .map(DeviceConfig::build)
            .collect();
        Self::new(devices)
    }

    /// Look up the device at a 7-bit address
    pub fn device(&self, address: u8) -> Option<&RegisterDevice> {
        self.devices.iter().find(|d| d.address() == address)
    }

    /// Mutably look up the device at a 7-bit address
    pub fn device_mut(&mut self, address: u8) -> Option<&mut RegisterDevice> {
        self.devices.iter_mut().find(|d| d.address() == address)
    }

    /// Attached devices
    pub fn devices(&self) -> &[RegisterDevice] {
        &self.devices
    }

    /// Configured bus clock in kHz
    pub fn speed_khz(&self) -> u32 {
        self.speed_khz
    }

    /// Transcript of every primitive since creation or the last clear
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Forget the transcript
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn nack(&mut self) -> i2cbridge_core::Result<()> {
        self.events.push(BusEvent::Nack);
        Err(Error::Nack)
    }

    /// Handle the address byte following a START
    fn select(&mut self, byte: u8) -> i2cbridge_core::Result<()> {
        let (addr, dir) = Address::from_byte(byte);
        match self.devices.iter().position(|d| d.address() == addr.value()) {
            Some(device) => {
                self.state = match dir {
                    Direction::Write => BusState::Writing {
                        device,
                        pointer_set: false,
                    },
                    Direction::Read => BusState::Reading { device },
                };
                Ok(())
            }
            None => {
                log::trace!("No device at {}", addr);
                self.state = BusState::Nacked;
                self.nack()
            }
        }
    }
}

impl Default for DummyBus {
    fn default() -> Self {
        Self::new_default()
    }
}

impl I2cMaster for DummyBus {
    fn set_speed_khz(&mut self, khz: u32) -> i2cbridge_core::Result<u32> {
        if khz == 0 {
            return Err(Error::InvalidSpeed(khz));
        }
        self.speed_khz = khz;
        Ok(khz)
    }

    fn start(&mut self) -> i2cbridge_core::Result<()> {
        self.events.push(BusEvent::Start);
        self.state = BusState::Addressing;
        Ok(())
    }

    fn stop(&mut self) -> i2cbridge_core::Result<()> {
        self.events.push(BusEvent::Stop);
        let was = std::mem::replace(&mut self.state, BusState::Idle);
        if was == BusState::Idle {
            return Err(Error::BusNotReady);
        }
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> i2cbridge_core::Result<()> {
        self.events.push(BusEvent::Write(data.to_vec()));

        let mut bytes = data.iter().copied();
        if self.state == BusState::Addressing {
            match bytes.next() {
                Some(byte) => self.select(byte)?,
                None => return Ok(()),
            }
        }

        for byte in bytes {
            match self.state {
                BusState::Writing {
                    device,
                    pointer_set: false,
                } => {
                    self.devices[device].set_pointer(byte);
                    self.state = BusState::Writing {
                        device,
                        pointer_set: true,
                    };
                }
                BusState::Writing {
                    device,
                    pointer_set: true,
                } => {
                    if !self.devices[device].write(byte) {
                        return self.nack();
                    }
                }
                BusState::Nacked => return self.nack(),
                _ => return Err(Error::BusNotReady),
            }
        }
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> i2cbridge_core::Result<()> {
        let BusState::Reading { device } = self.state else {
            return Err(Error::BusNotReady);
        };
        let device = &mut self.devices[device];
        for byte in buf.iter_mut() {
            *byte = device.read();
        }
        self.events.push(BusEvent::Read(buf.to_vec()));
        Ok(())
    }
}
