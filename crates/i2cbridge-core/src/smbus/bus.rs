//! smbus2-style bus handle

use crate::address::{Address, Direction};
use crate::error::{Error, Result};
use crate::master::{Functionality, I2cMaster};
use crate::transaction;

use super::pec::Pec;

/// Maximum payload of an SMBus block transfer
pub const I2C_SMBUS_BLOCK_MAX: usize = 32;

/// Data returned by block reads
pub type Block = heapless::Vec<u8, I2C_SMBUS_BLOCK_MAX>;

/// Longest message body: command + count + 32 data bytes + PEC
const FRAME_MAX: usize = I2C_SMBUS_BLOCK_MAX + 3;
type Frame = heapless::Vec<u8, FRAME_MAX>;

/// SMBus access over an I2C bus master
///
/// Method names and argument order follow smbus2's `SMBus` class, with the
/// 7-bit device address passed on every call. Register reads default to
/// closing the write phase with a STOP before the read phase; enable
/// [`set_repeated_start`](Self::set_repeated_start) for devices that
/// require a repeated START instead.
pub struct SmBus<M> {
    master: M,
    pec: bool,
    repeated_start: bool,
}

impl<M: I2cMaster> SmBus<M> {
    /// Wrap a bus master with PEC and repeated START disabled
    pub fn new(master: M) -> Self {
        Self {
            master,
            pec: false,
            repeated_start: false,
        }
    }

    /// Whether Packet Error Checking is enabled
    pub fn pec(&self) -> bool {
        self.pec
    }

    /// Enable or disable Packet Error Checking
    ///
    /// PEC is computed in software, so any adapter supports it unless it
    /// explicitly clears [`Functionality::SMBUS_PEC`].
    pub fn set_pec(&mut self, enable: bool) -> Result<()> {
        if enable && !self.funcs().contains(Functionality::SMBUS_PEC) {
            return Err(Error::NotSupported);
        }
        self.pec = enable;
        Ok(())
    }

    /// Whether register reads use a repeated START
    pub fn repeated_start(&self) -> bool {
        self.repeated_start
    }

    /// Join the write and read phase of register reads with a repeated START
    pub fn set_repeated_start(&mut self, enable: bool) {
        self.repeated_start = enable;
    }

    /// Functionality of the underlying adapter
    pub fn funcs(&self) -> Functionality {
        self.master.functionality()
    }

    /// Set the bus clock, returning the rate actually configured (kHz)
    pub fn set_speed_khz(&mut self, khz: u32) -> Result<u32> {
        self.master.set_speed_khz(khz)
    }

    /// Borrow the underlying bus master
    pub fn master(&self) -> &M {
        &self.master
    }

    /// Mutably borrow the underlying bus master
    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    /// Release the underlying bus master
    pub fn into_inner(self) -> M {
        self.master
    }

    /// Check whether a device acknowledges its address
    ///
    /// Sends START, the address with the write bit and STOP. Returns
    /// `Ok(false)` if nothing acknowledged.
    pub fn detect(&mut self, i2c_addr: u8) -> Result<bool> {
        let addr = Address::new(i2c_addr)?;
        transaction::probe(&mut self.master, addr)
    }

    /// Probe every address in `first..=last` and collect the responders
    pub fn scan(&mut self, first: u8, last: u8) -> Result<heapless::Vec<u8, 128>> {
        let mut found = heapless::Vec::new();
        for i2c_addr in first..=last {
            if self.detect(i2c_addr)? {
                // At most 128 7-bit addresses exist, so this cannot overflow
                let _ = found.push(i2c_addr);
            }
        }
        log::debug!("Scan 0x{:02X}-0x{:02X}: {} device(s)", first, last, found.len());
        Ok(found)
    }

    /// Quick command: address with the write bit only
    pub fn write_quick(&mut self, i2c_addr: u8) -> Result<()> {
        let addr = Address::new(i2c_addr)?;
        transaction::write(&mut self.master, addr, &[])
    }

    /// Receive byte: read one byte without selecting a register
    pub fn read_byte(&mut self, i2c_addr: u8) -> Result<u8> {
        let addr = Address::new(i2c_addr)?;
        let frame = self.read_fixed(addr, &[], 1, self.pec)?;
        Ok(frame[0])
    }

    /// Send byte: write one byte without selecting a register
    pub fn write_byte(&mut self, i2c_addr: u8, value: u8) -> Result<()> {
        let addr = Address::new(i2c_addr)?;
        self.write_frame(addr, &[value], self.pec)
    }

    /// Read a single byte from a designated register
    pub fn read_byte_data(&mut self, i2c_addr: u8, register: u8) -> Result<u8> {
        let addr = Address::new(i2c_addr)?;
        let frame = self.read_fixed(addr, &[register], 1, self.pec)?;
        Ok(frame[0])
    }

    /// Write a single byte to a designated register
    pub fn write_byte_data(&mut self, i2c_addr: u8, register: u8, value: u8) -> Result<()> {
        let addr = Address::new(i2c_addr)?;
        self.write_frame(addr, &[register, value], self.pec)
    }

    /// Read a 16-bit word (LSB first on the wire) from a register
    pub fn read_word_data(&mut self, i2c_addr: u8, register: u8) -> Result<u16> {
        let addr = Address::new(i2c_addr)?;
        let frame = self.read_fixed(addr, &[register], 2, self.pec)?;
        Ok(u16::from_le_bytes([frame[0], frame[1]]))
    }

    /// Write a 16-bit word (LSB first on the wire) to a register
    pub fn write_word_data(&mut self, i2c_addr: u8, register: u8, value: u16) -> Result<()> {
        let addr = Address::new(i2c_addr)?;
        let [lo, hi] = value.to_le_bytes();
        self.write_frame(addr, &[register, lo, hi], self.pec)
    }

    /// Send 16 bits to a register and read 16 bits back
    pub fn process_call(&mut self, i2c_addr: u8, register: u8, value: u16) -> Result<u16> {
        let addr = Address::new(i2c_addr)?;
        let [lo, hi] = value.to_le_bytes();
        let frame = self.read_fixed(addr, &[register, lo, hi], 2, self.pec)?;
        Ok(u16::from_le_bytes([frame[0], frame[1]]))
    }

    /// Read a block of up to 32 bytes whose length the device reports
    pub fn read_block_data(&mut self, i2c_addr: u8, register: u8) -> Result<Block> {
        let addr = Address::new(i2c_addr)?;
        self.read_counted(addr, &[register])
    }

    /// Write a block of up to 32 bytes, preceded by its length
    pub fn write_block_data(&mut self, i2c_addr: u8, register: u8, data: &[u8]) -> Result<()> {
        let addr = Address::new(i2c_addr)?;
        let frame = counted_frame(register, data)?;
        self.write_frame(addr, &frame, self.pec)
    }

    /// Write a counted block and read a counted block back
    pub fn block_process_call(&mut self, i2c_addr: u8, register: u8, data: &[u8]) -> Result<Block> {
        let addr = Address::new(i2c_addr)?;
        let frame = counted_frame(register, data)?;
        self.read_counted(addr, &frame)
    }

    /// Read `length` bytes (at most 32) starting at a register
    ///
    /// Unlike [`read_block_data`](Self::read_block_data) there is no count
    /// byte and never a PEC.
    pub fn read_i2c_block_data(&mut self, i2c_addr: u8, register: u8, length: usize) -> Result<Block> {
        let addr = Address::new(i2c_addr)?;
        if length > I2C_SMBUS_BLOCK_MAX {
            return Err(Error::BlockTooLong(length));
        }
        if length == 0 {
            return Err(Error::InvalidBlockLength(0));
        }
        let frame = self.read_fixed(addr, &[register], length, false)?;
        Block::from_slice(&frame).map_err(|_| Error::BlockTooLong(frame.len()))
    }

    /// Write up to 32 bytes starting at a register, without a count byte
    pub fn write_i2c_block_data(&mut self, i2c_addr: u8, register: u8, data: &[u8]) -> Result<()> {
        let addr = Address::new(i2c_addr)?;
        if data.len() > I2C_SMBUS_BLOCK_MAX {
            return Err(Error::BlockTooLong(data.len()));
        }
        let mut frame = Frame::new();
        frame
            .push(register)
            .map_err(|_| Error::BlockTooLong(data.len()))?;
        frame
            .extend_from_slice(data)
            .map_err(|_| Error::BlockTooLong(data.len()))?;
        self.write_frame(addr, &frame, false)
    }

    /// Write `payload` in one transaction, appending a PEC if requested
    fn write_frame(&mut self, addr: Address, payload: &[u8], use_pec: bool) -> Result<()> {
        let mut frame = Frame::new();
        frame
            .extend_from_slice(payload)
            .map_err(|_| Error::BlockTooLong(payload.len()))?;
        if use_pec {
            let pec = Pec::new()
                .update(&[addr.write_byte()])
                .update(payload)
                .value();
            frame
                .push(pec)
                .map_err(|_| Error::BlockTooLong(payload.len()))?;
        }
        transaction::write(&mut self.master, addr, &frame)
    }

    /// Read `len` bytes (plus PEC if requested) after writing `command`
    ///
    /// An empty `command` reads without a write phase.
    fn read_fixed(
        &mut self,
        addr: Address,
        command: &[u8],
        len: usize,
        use_pec: bool,
    ) -> Result<Frame> {
        let mut frame = Frame::new();
        frame
            .resize(len + usize::from(use_pec), 0)
            .map_err(|_| Error::BlockTooLong(len))?;

        if command.is_empty() {
            transaction::read(&mut self.master, addr, &mut frame)?;
        } else {
            transaction::write_then_read_with(
                &mut self.master,
                addr,
                command,
                self.repeated_start,
                |m| transaction::receive(m, &mut frame),
            )?;
        }

        if use_pec {
            check_pec(addr, command, &mut frame)?;
        }
        Ok(frame)
    }

    /// Write `command`, then read a count byte and that many data bytes
    fn read_counted(&mut self, addr: Address, command: &[u8]) -> Result<Block> {
        let use_pec = self.pec;
        let mut frame = Frame::new();

        transaction::write_then_read_with(
            &mut self.master,
            addr,
            command,
            self.repeated_start,
            |m| {
                let mut count = [0u8; 1];
                transaction::receive(m, &mut count)?;
                let len = usize::from(count[0]);
                if len == 0 || len > I2C_SMBUS_BLOCK_MAX {
                    return Err(Error::InvalidBlockLength(count[0]));
                }
                frame
                    .resize(1 + len + usize::from(use_pec), 0)
                    .map_err(|_| Error::InvalidBlockLength(count[0]))?;
                frame[0] = count[0];
                transaction::receive(m, &mut frame[1..])
            },
        )?;

        if use_pec {
            check_pec(addr, command, &mut frame)?;
        }
        Block::from_slice(&frame[1..]).map_err(|_| Error::BlockTooLong(frame.len() - 1))
    }
}

/// Build `[register, count, data..]` for counted block writes
fn counted_frame(register: u8, data: &[u8]) -> Result<Frame> {
    if data.len() > I2C_SMBUS_BLOCK_MAX {
        return Err(Error::BlockTooLong(data.len()));
    }
    let mut frame = Frame::new();
    // Capacity is FRAME_MAX, so two header bytes and 32 data bytes fit
    frame
        .extend_from_slice(&[register, data.len() as u8])
        .and_then(|()| frame.extend_from_slice(data))
        .map_err(|()| Error::BlockTooLong(data.len()))?;
    Ok(frame)
}

/// Strip the trailing PEC byte from `frame` and verify it
///
/// The PEC of a read covers the write phase (if any), the read address
/// byte and every byte read before the PEC itself.
fn check_pec(addr: Address, command: &[u8], frame: &mut Frame) -> Result<()> {
    let found = frame.pop().ok_or(Error::ShortRead {
        expected: 1,
        actual: 0,
    })?;

    let mut pec = Pec::new();
    if !command.is_empty() {
        pec = pec.update(&[addr.byte(Direction::Write)]).update(command);
    }
    let expected = pec
        .update(&[addr.byte(Direction::Read)])
        .update(frame)
        .value();

    if expected != found {
        log::debug!(
            "PEC mismatch from {}: expected 0x{:02X}, found 0x{:02X}",
            addr,
            expected,
            found
        );
        return Err(Error::PecMismatch { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, ScriptedMaster};
    use std::vec;

    fn bus(devices: &[u8]) -> SmBus<ScriptedMaster> {
        SmBus::new(ScriptedMaster::with_devices(devices))
    }

    #[test]
    fn test_write_byte_data() {
        let mut bus = bus(&[0x50]);
        bus.write_byte_data(0x50, 0x10, 0x55).unwrap();
        assert_eq!(
            bus.master().events,
            vec![
                Event::Start,
                Event::Write(vec![0xA0]),
                Event::Write(vec![0x10, 0x55]),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_write_byte_data_with_pec() {
        let mut bus = bus(&[0x50]);
        bus.set_pec(true).unwrap();
        bus.write_byte_data(0x50, 0x10, 0x55).unwrap();
        assert_eq!(bus.master().written(), vec![0x10, 0x55, 0xB3]);
    }

    #[test]
    fn test_read_byte_data() {
        let mut bus = bus(&[0x50]);
        bus.master_mut().read_data.extend([0x42]);
        assert_eq!(bus.read_byte_data(0x50, 0x10).unwrap(), 0x42);
    }

    #[test]
    fn test_read_byte_data_with_pec() {
        let mut bus = bus(&[0x50]);
        bus.set_pec(true).unwrap();
        bus.master_mut().read_data.extend([0x42, 0x99]);
        assert_eq!(bus.read_byte_data(0x50, 0x10).unwrap(), 0x42);
    }

    #[test]
    fn test_read_byte_with_pec() {
        let mut bus = bus(&[0x50]);
        bus.set_pec(true).unwrap();
        bus.master_mut().read_data.extend([0x42, 0xC4]);
        assert_eq!(bus.read_byte(0x50).unwrap(), 0x42);
    }

    #[test]
    fn test_pec_mismatch() {
        let mut bus = bus(&[0x50]);
        bus.set_pec(true).unwrap();
        bus.master_mut().read_data.extend([0x42, 0x00]);
        assert_eq!(
            bus.read_byte_data(0x50, 0x10),
            Err(Error::PecMismatch {
                expected: 0x99,
                found: 0x00
            })
        );
    }

    #[test]
    fn test_word_is_little_endian() {
        let mut bus = bus(&[0x0B]);
        bus.master_mut().read_data.extend([0x34, 0x12]);
        assert_eq!(bus.read_word_data(0x0B, 0x08).unwrap(), 0x1234);

        bus.write_word_data(0x0B, 0x08, 0xBEEF).unwrap();
        assert!(bus.master().written().ends_with(&[0x08, 0xEF, 0xBE]));
    }

    #[test]
    fn test_read_word_data_with_pec() {
        let mut bus = bus(&[0x0B]);
        bus.set_pec(true).unwrap();
        bus.master_mut().read_data.extend([0x34, 0x12, 0xAE]);
        assert_eq!(bus.read_word_data(0x0B, 0x08).unwrap(), 0x1234);
    }

    #[test]
    fn test_process_call() {
        let mut bus = bus(&[0x0B]);
        bus.master_mut().read_data.extend([0x02, 0x01]);
        assert_eq!(bus.process_call(0x0B, 0x20, 0xAAAA).unwrap(), 0x0102);
        assert_eq!(bus.master().written(), vec![0x20, 0xAA, 0xAA]);
    }

    #[test]
    fn test_read_block_data() {
        let mut bus = bus(&[0x0B]);
        bus.master_mut().read_data.extend([0x03, 1, 2, 3]);
        let block = bus.read_block_data(0x0B, 0x08).unwrap();
        assert_eq!(&block[..], &[1, 2, 3]);
        // Count byte and payload are separate reads inside one transaction
        assert!(bus.master().events.ends_with(&[
            Event::Start,
            Event::Write(vec![0x17]),
            Event::Read(1),
            Event::Read(3),
            Event::Stop,
        ]));
    }

    #[test]
    fn test_read_block_data_with_pec() {
        let mut bus = bus(&[0x0B]);
        bus.set_pec(true).unwrap();
        bus.master_mut().read_data.extend([0x03, 1, 2, 3, 0x39]);
        let block = bus.read_block_data(0x0B, 0x08).unwrap();
        assert_eq!(&block[..], &[1, 2, 3]);
    }

    #[test]
    fn test_read_block_invalid_count() {
        let mut bus = bus(&[0x0B]);
        bus.master_mut().read_data.extend([33]);
        assert_eq!(
            bus.read_block_data(0x0B, 0x08),
            Err(Error::InvalidBlockLength(33))
        );
        assert_eq!(bus.master().events.last(), Some(&Event::Stop));

        bus.master_mut().read_data.extend([0]);
        assert_eq!(
            bus.read_block_data(0x0B, 0x08),
            Err(Error::InvalidBlockLength(0))
        );
    }

    #[test]
    fn test_write_block_data() {
        let mut bus = bus(&[0x0B]);
        bus.write_block_data(0x0B, 0x40, &[9, 8]).unwrap();
        assert_eq!(bus.master().written(), vec![0x40, 2, 9, 8]);
    }

    #[test]
    fn test_block_too_long_sends_nothing() {
        let mut bus = bus(&[0x0B]);
        let data = [0u8; 33];
        assert_eq!(
            bus.write_block_data(0x0B, 0, &data),
            Err(Error::BlockTooLong(33))
        );
        assert_eq!(
            bus.write_i2c_block_data(0x0B, 0, &data),
            Err(Error::BlockTooLong(33))
        );
        assert_eq!(
            bus.read_i2c_block_data(0x0B, 0, 33),
            Err(Error::BlockTooLong(33))
        );
        assert!(bus.master().events.is_empty());
    }

    #[test]
    fn test_zero_length_i2c_block_read_sends_nothing() {
        let mut bus = bus(&[0x0B]);
        assert_eq!(
            bus.read_i2c_block_data(0x0B, 0x10, 0),
            Err(Error::InvalidBlockLength(0))
        );
        assert!(bus.master().events.is_empty());
    }

    #[test]
    fn test_block_process_call() {
        let mut bus = bus(&[0x0B]);
        bus.master_mut().read_data.extend([0x02, 0xAA, 0xBB]);
        let block = bus.block_process_call(0x0B, 0x30, &[1, 2, 3]).unwrap();
        assert_eq!(&block[..], &[0xAA, 0xBB]);
        assert_eq!(bus.master().written(), vec![0x30, 3, 1, 2, 3]);
    }

    #[test]
    fn test_i2c_block_data() {
        let mut bus = bus(&[0x50]);
        bus.set_pec(true).unwrap();
        bus.write_i2c_block_data(0x50, 0x00, &[1, 2, 3, 4]).unwrap();
        // No count byte and no PEC on I2C block transfers
        assert_eq!(bus.master().written(), vec![0x00, 1, 2, 3, 4]);

        bus.master_mut().read_data.extend([5, 6, 7]);
        let block = bus.read_i2c_block_data(0x50, 0x02, 3).unwrap();
        assert_eq!(&block[..], &[5, 6, 7]);
    }

    #[test]
    fn test_quick_and_detect() {
        let mut bus = bus(&[0x3C]);
        bus.write_quick(0x3C).unwrap();
        assert_eq!(bus.write_quick(0x3D), Err(Error::AddressNack(0x3D)));
        assert!(bus.detect(0x3C).unwrap());
        assert!(!bus.detect(0x3D).unwrap());
    }

    #[test]
    fn test_scan() {
        let mut bus = bus(&[0x20, 0x50, 0x68]);
        let found = bus.scan(0x03, 0x77).unwrap();
        assert_eq!(&found[..], &[0x20, 0x50, 0x68]);
    }

    #[test]
    fn test_invalid_address() {
        let mut bus = bus(&[]);
        assert_eq!(bus.read_byte(0x80), Err(Error::InvalidAddress(0x80)));
        assert!(bus.master().events.is_empty());
    }

    #[test]
    fn test_repeated_start_mode() {
        let mut bus = bus(&[0x50]);
        bus.set_repeated_start(true);
        bus.master_mut().read_data.extend([0x01]);
        bus.read_byte_data(0x50, 0x00).unwrap();
        let stops = bus
            .master()
            .events
            .iter()
            .filter(|e| **e == Event::Stop)
            .count();
        assert_eq!(stops, 1);
    }
}
