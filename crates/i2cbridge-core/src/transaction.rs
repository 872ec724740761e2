//! Transaction helpers
//!
//! These functions assemble the primitive conditions of an [`I2cMaster`]
//! into complete bus transactions. Every transaction that issued a START
//! also issues a STOP, even when the address or a data byte was not
//! acknowledged, so a missing device never leaves the bus held.

use crate::address::{Address, Direction};
use crate::error::{Error, Result};
use crate::master::I2cMaster;

/// Run `body` between a START and a STOP condition
///
/// The STOP is attempted whatever `body` returns. If both fail, the error
/// from `body` is reported.
pub fn transaction<M, T, F>(master: &mut M, body: F) -> Result<T>
where
    M: I2cMaster + ?Sized,
    F: FnOnce(&mut M) -> Result<T>,
{
    master.start()?;
    let result = body(master);
    let stopped = master.stop();

    match result {
        Ok(value) => stopped.map(|()| value),
        Err(e) => {
            if let Err(stop_err) = stopped {
                log::debug!("STOP after failed transfer also failed: {}", stop_err);
            }
            Err(e)
        }
    }
}

/// Send the address byte for `dir`
///
/// A NACK becomes [`Error::AddressNack`].
pub fn send_address<M: I2cMaster + ?Sized>(
    master: &mut M,
    addr: Address,
    dir: Direction,
) -> Result<()> {
    master
        .write_bytes(&[addr.byte(dir)])
        .map_err(|e| match e {
            Error::Nack => Error::AddressNack(addr.value()),
            other => other,
        })
}

/// Send data bytes to an already addressed device
///
/// A NACK becomes [`Error::DataNack`].
pub fn send_data<M: I2cMaster + ?Sized>(master: &mut M, addr: Address, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    master.write_bytes(data).map_err(|e| match e {
        Error::Nack => Error::DataNack(addr.value()),
        other => other,
    })
}

/// Read bytes from an already addressed device
pub fn receive<M: I2cMaster + ?Sized>(master: &mut M, buf: &mut [u8]) -> Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    master.read_bytes(buf)
}

/// Check whether a device acknowledges its address
///
/// Sends START, the address with the write bit, and STOP. A NACK yields
/// `Ok(false)`; adapter failures are returned as errors.
pub fn probe<M: I2cMaster + ?Sized>(master: &mut M, addr: Address) -> Result<bool> {
    match transaction(master, |m| send_address(m, addr, Direction::Write)) {
        Ok(()) => Ok(true),
        Err(Error::AddressNack(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Write `data` to a device in a single transaction
pub fn write<M: I2cMaster + ?Sized>(master: &mut M, addr: Address, data: &[u8]) -> Result<()> {
    transaction(master, |m| {
        send_address(m, addr, Direction::Write)?;
        send_data(m, addr, data)
    })
}

/// Read `buf.len()` bytes from a device in a single transaction
pub fn read<M: I2cMaster + ?Sized>(master: &mut M, addr: Address, buf: &mut [u8]) -> Result<()> {
    transaction(master, |m| {
        send_address(m, addr, Direction::Read)?;
        receive(m, buf)
    })
}

/// Write `wr`, then address the device for reading and run `read_phase`
///
/// With `repeated_start` the two phases share one transaction joined by a
/// repeated START. Without it the write phase is closed with a STOP and
/// the read phase opens a new transaction, which is what the CH341
/// reference driver does and what most register-pointer devices accept.
pub fn write_then_read_with<M, T, F>(
    master: &mut M,
    addr: Address,
    wr: &[u8],
    repeated_start: bool,
    read_phase: F,
) -> Result<T>
where
    M: I2cMaster + ?Sized,
    F: FnOnce(&mut M) -> Result<T>,
{
    if repeated_start {
        transaction(master, |m| {
            send_address(m, addr, Direction::Write)?;
            send_data(m, addr, wr)?;
            m.start()?;
            send_address(m, addr, Direction::Read)?;
            read_phase(m)
        })
    } else {
        write(master, addr, wr)?;
        transaction(master, |m| {
            send_address(m, addr, Direction::Read)?;
            read_phase(m)
        })
    }
}

/// Write `wr` and then read `rd.len()` bytes from the same device
pub fn write_read<M: I2cMaster + ?Sized>(
    master: &mut M,
    addr: Address,
    wr: &[u8],
    rd: &mut [u8],
    repeated_start: bool,
) -> Result<()> {
    write_then_read_with(master, addr, wr, repeated_start, |m| receive(m, rd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, ScriptedMaster};
    use std::vec;

    fn addr(a: u8) -> Address {
        Address::new(a).unwrap()
    }

    #[test]
    fn test_probe_present_and_absent() {
        let mut master = ScriptedMaster::with_devices(&[0x50]);
        assert!(probe(&mut master, addr(0x50)).unwrap());
        assert!(!probe(&mut master, addr(0x51)).unwrap());

        assert_eq!(
            master.events,
            vec![
                Event::Start,
                Event::Write(vec![0xA0]),
                Event::Stop,
                Event::Start,
                Event::Write(vec![0xA2]),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_stop_after_address_nack() {
        let mut master = ScriptedMaster::with_devices(&[]);
        let err = write(&mut master, addr(0x20), &[1, 2]).unwrap_err();
        assert_eq!(err, Error::AddressNack(0x20));
        assert_eq!(master.events.last(), Some(&Event::Stop));
        // Data must not be sent after the address was refused
        assert_eq!(master.events.len(), 3);
    }

    #[test]
    fn test_stop_after_data_nack() {
        let mut master = ScriptedMaster::with_devices(&[0x20]);
        master.nack_data = true;
        let err = write(&mut master, addr(0x20), &[1]).unwrap_err();
        assert_eq!(err, Error::DataNack(0x20));
        assert_eq!(master.events.last(), Some(&Event::Stop));
    }

    #[test]
    fn test_stop_failure_reported_when_body_succeeds() {
        let mut master = ScriptedMaster::with_devices(&[0x20]);
        master.fail_stop = true;
        assert_eq!(write(&mut master, addr(0x20), &[1]), Err(Error::TransferFailed));
    }

    #[test]
    fn test_body_error_wins_over_stop_failure() {
        let mut master = ScriptedMaster::with_devices(&[]);
        master.fail_stop = true;
        assert_eq!(
            write(&mut master, addr(0x20), &[1]),
            Err(Error::AddressNack(0x20))
        );
    }

    #[test]
    fn test_write_read_with_stop_between() {
        let mut master = ScriptedMaster::with_devices(&[0x50]);
        master.read_data.extend([0xAB, 0xCD]);
        let mut buf = [0u8; 2];
        write_read(&mut master, addr(0x50), &[0x10], &mut buf, false).unwrap();
        assert_eq!(buf, [0xAB, 0xCD]);
        assert_eq!(
            master.events,
            vec![
                Event::Start,
                Event::Write(vec![0xA0]),
                Event::Write(vec![0x10]),
                Event::Stop,
                Event::Start,
                Event::Write(vec![0xA1]),
                Event::Read(2),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_write_read_repeated_start() {
        let mut master = ScriptedMaster::with_devices(&[0x50]);
        master.read_data.extend([0x42]);
        let mut buf = [0u8; 1];
        write_read(&mut master, addr(0x50), &[0x10], &mut buf, true).unwrap();
        assert_eq!(buf, [0x42]);
        assert_eq!(
            master.events,
            vec![
                Event::Start,
                Event::Write(vec![0xA0]),
                Event::Write(vec![0x10]),
                Event::Start,
                Event::Write(vec![0xA1]),
                Event::Read(1),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_empty_payloads_skip_primitives() {
        let mut master = ScriptedMaster::with_devices(&[0x50]);
        write(&mut master, addr(0x50), &[]).unwrap();
        read(&mut master, addr(0x50), &mut []).unwrap();
        assert!(!master.events.iter().any(|e| matches!(e, Event::Read(_))));
        assert_eq!(master.events.len(), 6);
    }
}
