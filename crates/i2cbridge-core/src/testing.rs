//! Scripted bus master used by the unit tests

use std::collections::VecDeque;
use std::vec::Vec;

use crate::error::{Error, Result};
use crate::master::I2cMaster;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Start,
    Stop,
    Write(Vec<u8>),
    Read(usize),
}

/// Records every primitive and answers reads from a queue
#[derive(Default)]
pub(crate) struct ScriptedMaster {
    pub events: Vec<Event>,
    /// 7-bit addresses that acknowledge
    pub devices: Vec<u8>,
    /// Bytes handed out by `read_bytes`, in order
    pub read_data: VecDeque<u8>,
    /// NACK every data byte
    pub nack_data: bool,
    /// Fail every STOP with a transfer error
    pub fail_stop: bool,
    expect_address: bool,
}

impl ScriptedMaster {
    pub fn with_devices(devices: &[u8]) -> Self {
        Self {
            devices: devices.to_vec(),
            ..Default::default()
        }
    }

    /// All bytes written after address bytes, flattened
    pub fn written(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut after_start = false;
        for event in &self.events {
            match event {
                Event::Start => after_start = true,
                Event::Write(bytes) if after_start => {
                    out.extend_from_slice(&bytes[1..]);
                    after_start = false;
                }
                Event::Write(bytes) => out.extend_from_slice(bytes),
                _ => {}
            }
        }
        out
    }
}

impl I2cMaster for ScriptedMaster {
    fn set_speed_khz(&mut self, khz: u32) -> Result<u32> {
        Ok(khz)
    }

    fn start(&mut self) -> Result<()> {
        self.events.push(Event::Start);
        self.expect_address = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.events.push(Event::Stop);
        self.expect_address = false;
        if self.fail_stop {
            return Err(Error::TransferFailed);
        }
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.events.push(Event::Write(data.to_vec()));
        if self.expect_address {
            self.expect_address = false;
            if !self.devices.contains(&(data[0] >> 1)) {
                return Err(Error::Nack);
            }
            return Ok(());
        }
        if self.nack_data {
            return Err(Error::Nack);
        }
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let expected = buf.len();
        self.events.push(Event::Read(expected));
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_data.pop_front().ok_or(Error::ShortRead {
                expected,
                actual: i,
            })?;
        }
        Ok(())
    }
}
