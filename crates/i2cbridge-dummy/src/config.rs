//! Bus profiles loaded from RON
//!
//! A profile lists the devices attached to the emulated bus:
//!
//! ```ron
//! (
//!     devices: [
//!         (address: 0x50, size: 256, fill: 0xFF),
//!         (address: 0x68, size: 8, data: [0x00, 0x30, 0x12]),
//!         (address: 0x20, size: 2, read_only: true),
//!     ],
//! )
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::device::RegisterDevice;
use crate::error::{DummyError, Result};

/// One device on the emulated bus
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// 7-bit address
    pub address: u8,
    /// Number of registers
    pub size: usize,
    /// Value of registers not covered by `data`
    #[serde(default)]
    pub fill: u8,
    /// Initial contents, starting at register 0
    #[serde(default)]
    pub data: Vec<u8>,
    /// Refuse data writes
    #[serde(default)]
    pub read_only: bool,
}

impl DeviceConfig {
    pub(crate) fn build(&self) -> RegisterDevice {
        let mut device =
            RegisterDevice::new(self.address, self.size, self.fill).read_only(self.read_only);
        device.registers_mut()[..self.data.len()].copy_from_slice(&self.data);
        device
    }
}

/// Configuration for the dummy bus
#[derive(Debug, Clone, Deserialize)]
pub struct DummyConfig {
    /// Attached devices
    pub devices: Vec<DeviceConfig>,
}

impl Default for DummyConfig {
    /// A 256-byte EEPROM at 0x50 and an 8-register device at 0x68
    fn default() -> Self {
        Self {
            devices: vec![
                DeviceConfig {
                    address: 0x50,
                    size: 256,
                    fill: 0xFF,
                    data: Vec::new(),
                    read_only: false,
                },
                DeviceConfig {
                    address: 0x68,
                    size: 8,
                    fill: 0x00,
                    data: Vec::new(),
                    read_only: false,
                },
            ],
        }
    }
}

impl DummyConfig {
    /// Load a profile from a RON file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        log::debug!(
            "Loaded dummy bus profile {} with {} device(s)",
            path.display(),
            config.devices.len()
        );
        Ok(config)
    }

    /// Parse a profile from a RON string
    pub fn from_ron(content: &str) -> Result<Self> {
        let config: DummyConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check addresses, sizes and initial data
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for dev in &self.devices {
            if dev.address > 0x7F {
                return Err(DummyError::Validation(format!(
                    "address 0x{:02X} does not fit in 7 bits",
                    dev.address
                )));
            }
            if !seen.insert(dev.address) {
                return Err(DummyError::Validation(format!(
                    "address 0x{:02X} used twice",
                    dev.address
                )));
            }
            if dev.size == 0 || dev.size > 256 {
                return Err(DummyError::Validation(format!(
                    "device 0x{:02X}: size must be 1..=256, got {}",
                    dev.address, dev.size
                )));
            }
            if dev.data.len() > dev.size {
                return Err(DummyError::Validation(format!(
                    "device 0x{:02X}: {} data bytes exceed size {}",
                    dev.address,
                    dev.data.len(),
                    dev.size
                )));
            }
        }
        Ok(())
    }

    /// Instantiate the configured devices
    pub fn build_devices(&self) -> Result<Vec<RegisterDevice>> {
        self.validate()?;
        Ok(self.devices.iter().map(DeviceConfig::build).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile() {
        let config = DummyConfig::from_ron(
            r#"(
                devices: [
                    (address: 0x50, size: 256, fill: 0xFF),
                    (address: 0x68, size: 8, data: [0x00, 0x30, 0x12]),
                    (address: 0x20, size: 2, read_only: true),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(config.devices.len(), 3);
        let devices = config.build_devices().unwrap();
        assert_eq!(devices[0].registers()[0], 0xFF);
        assert_eq!(&devices[1].registers()[..4], &[0x00, 0x30, 0x12, 0x00]);
        assert!(devices[2].is_read_only());
    }

    #[test]
    fn test_default_profile() {
        let devices = DummyConfig::default().build_devices().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].address(), 0x50);
        assert_eq!(devices[0].registers().len(), 256);
        assert_eq!(devices[1].address(), 0x68);
        assert_eq!(devices[1].registers().len(), 8);
    }

    #[test]
    fn test_rejects_duplicate_address() {
        let err = DummyConfig::from_ron(
            "(devices: [(address: 0x50, size: 1), (address: 0x50, size: 1)])",
        )
        .unwrap_err();
        assert!(matches!(err, DummyError::Validation(_)));
    }

    #[test]
    fn test_rejects_bad_device() {
        for profile in [
            "(devices: [(address: 0x80, size: 1)])",
            "(devices: [(address: 0x10, size: 0)])",
            "(devices: [(address: 0x10, size: 1, data: [1, 2])])",
        ] {
            assert!(matches!(
                DummyConfig::from_ron(profile),
                Err(DummyError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            DummyConfig::from_ron("(devices: oops)"),
            Err(DummyError::Parse(_))
        ));
    }
}
