//! CH341 device implementation
//!
//! This module provides the main `Ch341` struct that handles USB
//! communication with the CH341 and implements the `I2cMaster` trait.

use std::time::Duration;

use i2cbridge_core::master::I2cMaster;
use i2cbridge_core::{Error as CoreError, Result as CoreResult};
use nusb::transfer::{Buffer, Bulk, ControlIn, ControlType, In, Out, Recipient};
use nusb::{Endpoint, MaybeFuture};

use crate::error::{Ch341Error, Result};
use crate::protocol::*;
use crate::stream::{read_chunked, write_chunked, Transport};

/// CH341 USB-to-I2C bridge
///
/// This struct represents a connection to a CH341 and implements the
/// `I2cMaster` trait. Every primitive is one or more I2C stream packets on
/// the bulk OUT endpoint; OUT and IN packets are answered on the bulk IN
/// endpoint.
///
/// All methods are synchronous and blocking.
pub struct Ch341 {
    /// Claimed interface, used for vendor control requests
    interface: nusb::Interface,
    /// Bulk OUT endpoint for command packets
    out_ep: Endpoint<Bulk, Out>,
    /// Bulk IN endpoint for responses
    in_ep: Endpoint<Bulk, In>,
    /// Current configuration
    config: Ch341Config,
    /// Chip version, if the device reported one
    version: Option<u16>,
}

impl Ch341 {
    /// Open a CH341 device with default configuration
    ///
    /// Searches for a CH341 (VID:1a86 PID:5512) and opens it. Returns an
    /// error if no device is found or if the device cannot be opened.
    pub fn open() -> Result<Self> {
        Self::open_with_config(Ch341Config::default())
    }

    /// Open a CH341 device with custom configuration
    ///
    /// `config.index` selects which matching device is opened.
    pub fn open_with_config(config: Ch341Config) -> Result<Self> {
        Self::open_nth_with_config(config.index, config)
    }

    /// Open the nth CH341 device (0-indexed) with default configuration
    pub fn open_nth(index: usize) -> Result<Self> {
        Self::open_nth_with_config(index, Ch341Config::default())
    }

    /// Open the nth CH341 device with custom configuration
    pub fn open_nth_with_config(index: usize, config: Ch341Config) -> Result<Self> {
        let config = config.with_index(index);
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| Ch341Error::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == CH341_USB_VENDOR && d.product_id() == CH341_USB_PRODUCT)
            .collect();

        let device_info = devices.get(index).ok_or(Ch341Error::DeviceNotFound)?;

        log::info!(
            "Opening CH341 device at bus {} address {}",
            device_info.bus_id(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| Ch341Error::OpenFailed(e.to_string()))?;

        log::debug!(
            "Device: VID={:04X} PID={:04X} serial={}",
            device_info.vendor_id(),
            device_info.product_id(),
            device_info.serial_number().unwrap_or("-")
        );

        let interface = device
            .claim_interface(0)
            .wait()
            .map_err(|e| Ch341Error::ClaimFailed(e.to_string()))?;

        let out_ep = interface
            .endpoint::<Bulk, Out>(WRITE_EP)
            .map_err(|e| Ch341Error::ClaimFailed(e.to_string()))?;
        let in_ep = interface
            .endpoint::<Bulk, In>(READ_EP)
            .map_err(|e| Ch341Error::ClaimFailed(e.to_string()))?;

        let mut ch341 = Self {
            interface,
            out_ep,
            in_ep,
            config,
            version: None,
        };

        // Not every clone answers the version request; it is informational
        match ch341.read_version() {
            Ok(version) => {
                log::info!("CH341 chip version 0x{:04X}", version);
                ch341.version = Some(version);
            }
            Err(e) => log::warn!("Could not read CH341 version: {}", e),
        }

        let speed = ch341.config.speed;
        ch341.set_speed(speed)?;

        log::info!("CH341 configured for I2C at {}", speed);
        Ok(ch341)
    }

    /// List all connected CH341 devices
    pub fn list_devices() -> Result<Vec<Ch341DeviceInfo>> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| Ch341Error::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == CH341_USB_VENDOR && d.product_id() == CH341_USB_PRODUCT)
            .map(|d| Ch341DeviceInfo {
                bus: d.bus_id().to_string(),
                address: d.device_address(),
                serial: d.serial_number().map(str::to_string),
            })
            .collect();

        Ok(devices)
    }

    /// Chip version reported when the device was opened
    pub fn version(&self) -> Option<u16> {
        self.version
    }

    /// Current configuration
    pub fn config(&self) -> &Ch341Config {
        &self.config
    }

    /// Change the I2C clock rate
    pub fn set_speed(&mut self, speed: I2cSpeed) -> Result<()> {
        self.send_packet("SET SPEED", &set_speed_packet(speed))?;
        self.config.speed = speed;
        log::debug!("I2C speed set to {}", speed);
        Ok(())
    }

    /// Ask the chip for its version with a vendor control request
    fn read_version(&mut self) -> Result<u16> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request: VENDOR_VERSION,
                    value: 0,
                    index: 0,
                    length: 2,
                },
                Duration::from_millis(USB_WRITE_TIMEOUT_MS),
            )
            .wait()?;

        match data.as_slice() {
            [lo, hi] => Ok(u16::from_le_bytes([*lo, *hi])),
            other => Err(Ch341Error::InvalidResponse(format!(
                "version request returned {} bytes",
                other.len()
            ))),
        }
    }

    /// Cancel and reap anything still queued on the endpoints
    fn drain_all_pending(&mut self) {
        self.out_ep.cancel_all();
        while self.out_ep.pending() > 0 {
            let _ = self.out_ep.wait_next_complete(Duration::from_secs(1));
        }
        self.in_ep.cancel_all();
        while self.in_ep.pending() > 0 {
            let _ = self.in_ep.wait_next_complete(Duration::from_secs(1));
        }
    }
}

impl Transport for Ch341 {
    /// Send one stream packet, failing if the device took fewer bytes
    fn send_packet(&mut self, command: &'static str, packet: &[u8]) -> Result<()> {
        let mut buf = Buffer::new(packet.len());
        buf.extend_from_slice(packet);

        let completion = self
            .out_ep
            .transfer_blocking(buf, Duration::from_millis(USB_WRITE_TIMEOUT_MS));
        let written = completion.actual_len;
        completion.status?;

        if written != packet.len() {
            return Err(Ch341Error::ShortWrite {
                command,
                written,
                expected: packet.len(),
            });
        }

        log::trace!("USB write {} ({} bytes): {:02X?}", command, written, packet);
        Ok(())
    }

    /// Read one response from the bulk IN endpoint
    fn usb_read(&mut self, len: usize) -> Result<Vec<u8>> {
        let max_packet_size = self.in_ep.max_packet_size();
        // Request length must be a multiple of the max packet size
        let request_len = len.max(1).div_ceil(max_packet_size) * max_packet_size;
        let mut in_buf = Buffer::new(request_len);
        in_buf.set_requested_len(request_len);

        let completion = self
            .in_ep
            .transfer_blocking(in_buf, Duration::from_millis(USB_READ_TIMEOUT_MS));
        let data = completion.into_result()?;

        log::trace!("USB read {} bytes: {:02X?}", data.len(), &data[..]);
        Ok(data.to_vec())
    }
}

impl Drop for Ch341 {
    fn drop(&mut self) {
        self.drain_all_pending();
    }
}

impl I2cMaster for Ch341 {
    fn set_speed_khz(&mut self, khz: u32) -> CoreResult<u32> {
        let speed = I2cSpeed::from_khz(khz);
        self.set_speed(speed)?;
        Ok(speed.to_khz())
    }

    fn start(&mut self) -> CoreResult<()> {
        Ok(self.send_packet("START", &start_packet())?)
    }

    fn stop(&mut self) -> CoreResult<()> {
        Ok(self.send_packet("STOP", &stop_packet())?)
    }

    fn write_bytes(&mut self, data: &[u8]) -> CoreResult<()> {
        if write_chunked(self, data)? {
            Ok(())
        } else {
            Err(CoreError::Nack)
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> CoreResult<()> {
        Ok(read_chunked(self, buf)?)
    }
}

/// Information about a connected CH341 device
#[derive(Debug, Clone)]
pub struct Ch341DeviceInfo {
    /// USB bus identifier
    pub bus: String,
    /// USB device address
    pub address: u8,
    /// Serial number string, if the device has one
    pub serial: Option<String>,
}

impl std::fmt::Display for Ch341DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CH341 at bus {} address {}", self.bus, self.address)?;
        if let Some(serial) = &self.serial {
            write!(f, " (serial {})", serial)?;
        }
        Ok(())
    }
}

/// Parse adapter options for the CH341
///
/// Supported options:
/// - `speed=<khz>`: I2C clock in kHz, rounded down to 20/100/400/750
///   (default: 100)
/// - `index=<n>`: which CH341 to open when several are attached
///   (default: 0)
///
/// # Example
///
/// ```ignore
/// let options = [("speed", "400"), ("index", "1")];
/// let config = parse_options(&options)?;
/// ```
pub fn parse_options(options: &[(&str, &str)]) -> Result<Ch341Config> {
    let mut config = Ch341Config::default();

    for (key, value) in options {
        match *key {
            "speed" => {
                let khz: u32 = value.parse().map_err(|_| {
                    Ch341Error::ConfigError(format!("Invalid speed value: {}", value))
                })?;
                config.speed = I2cSpeed::from_khz(khz);
                log::debug!(
                    "Setting I2C speed to {}kHz (actual: {})",
                    khz,
                    config.speed
                );
            }
            "index" => {
                config.index = value.parse().map_err(|_| {
                    Ch341Error::ConfigError(format!("Invalid index value: {}", value))
                })?;
            }
            _ => {
                log::warn!("Unknown CH341 option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}
